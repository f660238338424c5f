//! JSON snapshot of a discovery result.
//!
//! A snapshot lists found packages and the raw properties of every registered
//! unit:
//!
//! ```json
//! {
//!   "packages": { "Foo": { "version": "2.1", "components": ["core"] } },
//!   "units": {
//!     "Foo::core": { "INTERFACE_LINK_LIBRARIES": ["Foo::util"] },
//!     "Foo::util": {}
//!   },
//!   "aliases": { "Foo::Util": "Foo::util" }
//! }
//! ```
//!
//! `aliases` maps ALIAS target names to the unit they stand for.
//!
//! The CMake backend produces exactly this shape, and the same file can be fed
//! back with `--registry` for offline runs.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::{Discovery, FoundPackage, PackageQuery, UnitHandle, UnitRegistry, VersionUse};
use crate::error::DiscoveryError;
use crate::runtime::Runtime;
use crate::version::Version;

/// A property stored either as a single string or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
enum RawProperty {
    One(String),
    Many(Vec<String>),
}

impl RawProperty {
    fn values(&self) -> Vec<String> {
        match self {
            RawProperty::One(value) => vec![value.clone()],
            RawProperty::Many(values) => values.clone(),
        }
    }
}

type UnitProperties = BTreeMap<String, RawProperty>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackageEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Components the package provides. `None` accepts any requested component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Snapshot {
    #[serde(default)]
    pub packages: BTreeMap<String, PackageEntry>,
    #[serde(default)]
    units: BTreeMap<String, UnitProperties>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, DiscoveryError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Registry backed by the `units` and `aliases` tables of a snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRegistry {
    units: BTreeMap<String, UnitProperties>,
    aliases: BTreeMap<String, String>,
}

impl From<Snapshot> for SnapshotRegistry {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            units: snapshot.units,
            aliases: snapshot.aliases,
        }
    }
}

impl UnitRegistry for SnapshotRegistry {
    /// An alias resolves to the handle of the unit it stands for.
    fn lookup(&self, name: &str) -> Option<UnitHandle> {
        let name = self.aliases.get(name).map_or(name, String::as_str);
        self.units.contains_key(name).then(|| UnitHandle::new(name))
    }

    fn property(&self, unit: &UnitHandle, property: &str) -> Result<Vec<String>> {
        let properties = self
            .units
            .get(unit.name())
            .with_context(|| format!("Unit {} is not registered", unit.name()))?;

        Ok(match properties.get(property) {
            Some(raw) => raw.values(),
            // Every unit knows its own name
            None if property == "NAME" => vec![unit.name().to_string()],
            None => Vec::new(),
        })
    }
}

/// Discovery served from a [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotDiscovery {
    snapshot: Snapshot,
}

impl SnapshotDiscovery {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot file.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let json = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read registry snapshot {:?}", path))?;
        let snapshot = Snapshot::from_json(&json)
            .with_context(|| format!("Failed to parse registry snapshot {:?}", path))?;
        debug!(
            "Loaded snapshot with {} package(s), {} unit(s) and {} alias(es)",
            snapshot.packages.len(),
            snapshot.units.len(),
            snapshot.aliases.len()
        );
        Ok(Self::new(snapshot))
    }

    fn satisfies(entry: &PackageEntry, query: &PackageQuery, version: VersionUse) -> bool {
        if let Some(available) = &entry.components {
            if let Some(missing) = query.components.iter().find(|c| !available.contains(c)) {
                debug!("Package {} does not provide component {}", query.name, missing);
                return false;
            }
        }

        if version == VersionUse::Ignore {
            return true;
        }

        match (&entry.version, &query.minimum_version) {
            (Some(found), Some(minimum)) => match Version::satisfies_minimum(found, minimum) {
                Some(satisfied) => satisfied,
                None => {
                    debug!("Cannot compare version {} against {}, accepting", found, minimum);
                    true
                }
            },
            // A package without a version is not rejected.
            _ => true,
        }
    }
}

impl Discovery for SnapshotDiscovery {
    #[tracing::instrument(skip(self))]
    fn find_package(&self, query: &PackageQuery, version: VersionUse) -> Result<Option<FoundPackage>> {
        let Some(entry) = self.snapshot.packages.get(&query.name) else {
            debug!("Package {} is not in the snapshot", query.name);
            return Ok(None);
        };

        if !Self::satisfies(entry, query, version) {
            return Ok(None);
        }

        Ok(Some(FoundPackage {
            version: entry.version.clone(),
            components: query.components.clone(),
            registry: Box::new(SnapshotRegistry::from(self.snapshot.clone())),
        }))
    }
}
