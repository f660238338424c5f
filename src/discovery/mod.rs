//! Package discovery.
//!
//! The discovery mechanism locates an installed package and registers the
//! units (imported targets) it provides. This module describes it as two
//! traits so that the probing logic only ever talks to an injected,
//! read-only registry:
//!
//! - [`Discovery`] - find a package by name, minimum version and components
//! - [`UnitRegistry`] - look up registered units and read their properties
//!
//! Two backends are provided: [`CMakeDiscovery`] runs `find_package()` through
//! CMake, [`SnapshotDiscovery`] serves a previously recorded JSON snapshot.

mod cmake;
mod snapshot;

use anyhow::Result;

pub use cmake::{CMAKE_MIN_VERSION, CMakeDiscovery, CMakeOptions};
pub use snapshot::{PackageEntry, Snapshot, SnapshotDiscovery, SnapshotRegistry};

/// What to look for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageQuery {
    pub name: String,
    pub minimum_version: Option<String>,
    pub components: Vec<String>,
}

impl PackageQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn minimum_version(self, version: impl Into<String>) -> Self {
        Self {
            minimum_version: Some(version.into()),
            ..self
        }
    }

    pub fn components(self, components: impl Into<Vec<String>>) -> Self {
        Self {
            components: components.into(),
            ..self
        }
    }
}

/// Whether the minimum version of a [`PackageQuery`] is handed to the discovery call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionUse {
    /// Find any installed version, so a too-old package is still reported with its version.
    Ignore,
    /// Only accept a package satisfying the minimum version.
    Require,
}

/// Handle to a unit registered by the discovery mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitHandle {
    name: String,
}

impl UnitHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A successful discovery call.
pub struct FoundPackage {
    pub version: Option<String>,
    pub components: Vec<String>,
    pub registry: Box<dyn UnitRegistry>,
}

impl std::fmt::Debug for FoundPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoundPackage")
            .field("version", &self.version)
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}

/// Read-only view of the units registered by a discovery call.
#[cfg_attr(test, mockall::automock)]
pub trait UnitRegistry {
    /// Returns a handle if `name` denotes a currently registered unit.
    fn lookup(&self, name: &str) -> Option<UnitHandle>;

    /// Raw values of `property` on `unit`, in native order. An unset property
    /// yields an empty list.
    fn property(&self, unit: &UnitHandle, property: &str) -> Result<Vec<String>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait Discovery {
    /// Returns `Ok(None)` when the package is not installed (or does not satisfy
    /// the query).
    fn find_package(&self, query: &PackageQuery, version: VersionUse) -> Result<Option<FoundPackage>>;
}
