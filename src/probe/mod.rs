//! Package and unit probing.
//!
//! This module turns discovery results into documents: the [`Prober`] facade
//! selects between a package-only lookup and a full unit graph, the
//! [`Walker`] resolves units recursively over an injected registry.

mod facade;
mod property;
mod value;
mod walker;

pub use facade::{PackageResult, Prober};
pub use property::{CONFIGURATIONS, MULTI_VALUED, PropertySet};
pub use value::{PLACEHOLDER_SENTINEL, PropertyValue, is_placeholder, rejoin_placeholders};
pub use walker::{CyclePolicy, Walker};
