//! Package resolution entry points.
//!
//! - [`Prober::probe_package`] reports presence, version and components of a
//!   package (mode A).
//! - [`Prober::probe_unit`] resolves the full graph of one unit of a package
//!   that is already known to be present (mode B).

use anyhow::Result;
use log::{debug, info};

use super::property::PropertySet;
use super::walker::{CyclePolicy, Walker};
use crate::discovery::{Discovery, PackageQuery, VersionUse};
use crate::document::{Document, Element};
use crate::error::ProbeError;
use crate::version::Version;

/// Outcome of a package lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageResult {
    pub found: bool,
    pub name: String,
    pub version: Option<String>,
    pub components: Option<Vec<String>>,
}

impl PackageResult {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self {
            found: false,
            name: name.into(),
            version: None,
            components: None,
        }
    }

    /// An empty version or component list is recorded as absent.
    pub fn found(name: impl Into<String>, version: Option<String>, components: Vec<String>) -> Self {
        Self {
            found: true,
            name: name.into(),
            version: version.filter(|v| !v.is_empty()),
            components: (!components.is_empty()).then_some(components),
        }
    }

    /// `{}` when not found, otherwise `name` plus whichever of `version` and
    /// `components` are present.
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        if !self.found {
            return document;
        }

        document.set_scalar("name", self.name.as_str());
        if let Some(version) = &self.version {
            document.set_scalar("version", version.as_str());
        }
        if let Some(components) = &self.components {
            document.set_array("components", components.iter().cloned().map(Element::Text));
        }
        document
    }
}

pub struct Prober<'a, D: Discovery + ?Sized> {
    discovery: &'a D,
    properties: PropertySet,
    policy: CyclePolicy,
}

impl<'a, D: Discovery + ?Sized> Prober<'a, D> {
    pub fn new(discovery: &'a D) -> Self {
        Self {
            discovery,
            properties: PropertySet::default(),
            policy: CyclePolicy::default(),
        }
    }

    pub fn with_properties(self, properties: PropertySet) -> Self {
        Self { properties, ..self }
    }

    pub fn with_cycle_policy(self, policy: CyclePolicy) -> Self {
        Self { policy, ..self }
    }

    /// Look the package up without its minimum version, so that an installed
    /// but too old package is still reported with the version it has.
    #[tracing::instrument(skip(self))]
    pub fn probe_package(&self, query: &PackageQuery) -> Result<PackageResult> {
        let Some(found) = self.discovery.find_package(query, VersionUse::Ignore)? else {
            info!("Package {} not found", query.name);
            return Ok(PackageResult::not_found(&query.name));
        };

        if let (Some(version), Some(minimum)) = (&found.version, &query.minimum_version) {
            if Version::satisfies_minimum(version, minimum) == Some(false) {
                info!(
                    "Package {} {} is older than the requested {}",
                    query.name, version, minimum
                );
            }
        }

        debug!("Package {} found, version {:?}", query.name, found.version);
        Ok(PackageResult::found(&query.name, found.version, found.components))
    }

    /// Find the package again, this time with its minimum version, and resolve
    /// `unit`. The package must be found: its presence was established by an
    /// earlier [`probe_package`](Self::probe_package) call.
    #[tracing::instrument(skip(self))]
    pub fn probe_unit(&self, query: &PackageQuery, unit: &str) -> Result<Document> {
        let found = self
            .discovery
            .find_package(query, VersionUse::Require)?
            .ok_or_else(|| ProbeError::DiscoveryInconsistency(query.name.clone()))?;

        let registry = found.registry.as_ref();
        let handle = registry.lookup(unit).ok_or_else(|| ProbeError::UnitNotFound {
            package: query.name.clone(),
            unit: unit.to_string(),
        })?;

        Walker::new(registry, &self.properties)
            .with_cycle_policy(self.policy)
            .resolve(&handle)
    }
}
