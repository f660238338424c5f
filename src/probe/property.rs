//! The fixed set of properties recorded for every unit.

/// Build configurations with their own artifact properties (`LOCATION_<cfg>`).
pub const CONFIGURATIONS: [&str; 4] = ["Release", "RelWithDebInfo", "MinSizeRel", "Debug"];

/// Properties carrying one value per configuration.
const ARTIFACT_PROPERTIES: [&str; 2] = ["LOCATION", "IMPORTED_IMPLIB"];

/// Properties carrying lists, possibly referencing other units.
pub const MULTI_VALUED: [&str; 6] = [
    "INTERFACE_COMPILE_DEFINITIONS",
    "INTERFACE_COMPILE_OPTIONS",
    "INTERFACE_INCLUDE_DIRECTORIES",
    "INTERFACE_LINK_DIRECTORIES",
    "INTERFACE_LINK_LIBRARIES",
    "INTERFACE_LINK_OPTIONS",
];

/// Property names queried per unit, split by shape.
///
/// Single-valued properties are written as strings, multi-valued ones as
/// arrays. Documents list single-valued properties first, in this order:
/// `NAME`, then `LOCATION` and its per-configuration variants, then
/// `IMPORTED_IMPLIB` and its variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySet {
    single_valued: Vec<String>,
    multi_valued: Vec<String>,
}

impl PropertySet {
    pub fn new(single_valued: Vec<String>, multi_valued: Vec<String>) -> Self {
        Self {
            single_valued,
            multi_valued,
        }
    }

    pub fn single_valued(&self) -> &[String] {
        &self.single_valued
    }

    pub fn multi_valued(&self) -> &[String] {
        &self.multi_valued
    }

    /// Every property name, single-valued first.
    pub fn names(&self) -> Vec<String> {
        self.single_valued
            .iter()
            .chain(&self.multi_valued)
            .cloned()
            .collect()
    }
}

impl Default for PropertySet {
    fn default() -> Self {
        let mut single_valued = vec!["NAME".to_string()];
        for property in ARTIFACT_PROPERTIES {
            single_valued.push(property.to_string());
            single_valued.extend(
                CONFIGURATIONS
                    .iter()
                    .map(|config| format!("{}_{}", property, config)),
            );
        }

        Self {
            single_valued,
            multi_valued: MULTI_VALUED.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_single_valued() {
        let set = PropertySet::default();
        assert_eq!(
            set.single_valued(),
            [
                "NAME",
                "LOCATION",
                "LOCATION_Release",
                "LOCATION_RelWithDebInfo",
                "LOCATION_MinSizeRel",
                "LOCATION_Debug",
                "IMPORTED_IMPLIB",
                "IMPORTED_IMPLIB_Release",
                "IMPORTED_IMPLIB_RelWithDebInfo",
                "IMPORTED_IMPLIB_MinSizeRel",
                "IMPORTED_IMPLIB_Debug",
            ]
        );
    }

    #[test]
    fn test_default_multi_valued() {
        let set = PropertySet::default();
        assert_eq!(set.multi_valued().len(), 6);
        assert!(set.multi_valued().iter().any(|p| p == "INTERFACE_LINK_LIBRARIES"));
    }

    #[test]
    fn test_names_single_first() {
        let set = PropertySet::new(vec!["A".into()], vec!["B".into(), "C".into()]);
        assert_eq!(set.names(), vec!["A", "B", "C"]);
    }
}
