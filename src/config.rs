//! Process parameters.
//!
//! Parameters arrive as CMake-style definitions (`-D NAME=VALUE`, optionally
//! `NAME:TYPE=VALUE`) and are validated into a [`ProbeConfig`] before any
//! discovery work starts.

use log::warn;
use std::path::PathBuf;

use crate::discovery::PackageQuery;
use crate::error::ConfigError;

pub const PACKAGE: &str = "PACKAGE";
pub const OUTPUT_FILE: &str = "OUTPUT_FILE";
pub const VERSION: &str = "VERSION";
pub const COMPONENTS: &str = "COMPONENTS";
pub const TARGET: &str = "TARGET";
pub const CMAKE_BUILD_TYPE: &str = "CMAKE_BUILD_TYPE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub query: PackageQuery,
    /// Overwritten unconditionally.
    pub output_file: PathBuf,
    /// Selects the unit graph mode when set.
    pub target: Option<String>,
    pub build_type: Option<String>,
    /// Unrecognized definition names, in the order they were given.
    pub ignored: Vec<String>,
}

impl ProbeConfig {
    /// Build the configuration from `NAME=VALUE` definitions. Later definitions
    /// override earlier ones; empty values count as unset.
    pub fn from_definitions<S: AsRef<str>>(definitions: &[S]) -> Result<Self, ConfigError> {
        // First position of each name, with its last value
        let mut values: Vec<(String, String)> = Vec::new();
        for definition in definitions {
            let (name, value) = parse_definition(definition.as_ref())?;
            match values.iter_mut().find(|(known, _)| *known == name) {
                Some(entry) => entry.1 = value,
                None => values.push((name, value)),
            }
        }

        let mut take = |name: &str| {
            let index = values.iter().position(|(known, _)| known == name)?;
            Some(values.remove(index).1).filter(|value| !value.is_empty())
        };

        let package = take(PACKAGE).ok_or(ConfigError::Missing(PACKAGE))?;
        let output_file = take(OUTPUT_FILE).ok_or(ConfigError::Missing(OUTPUT_FILE))?;
        let minimum_version = take(VERSION);
        let components = take(COMPONENTS)
            .map(|list| split_list(&list))
            .unwrap_or_default();
        let target = take(TARGET);
        let build_type = take(CMAKE_BUILD_TYPE);

        let ignored: Vec<String> = values.into_iter().map(|(name, _)| name).collect();
        for name in &ignored {
            warn!("Ignoring unknown definition {}", name);
        }

        Ok(Self {
            query: PackageQuery {
                name: package,
                minimum_version,
                components,
            },
            output_file: PathBuf::from(output_file),
            target,
            build_type,
            ignored,
        })
    }
}

fn parse_definition(definition: &str) -> Result<(String, String), ConfigError> {
    let malformed = || ConfigError::Malformed(definition.to_string());
    let (name, value) = definition.split_once('=').ok_or_else(malformed)?;
    let name = name.split_once(':').map_or(name, |(name, _type)| name).trim();
    if name.is_empty() {
        return Err(malformed());
    }
    Ok((name.to_string(), value.to_string()))
}

/// Split a `;`-separated list, dropping empty entries.
fn split_list(list: &str) -> Vec<String> {
    list.split(';')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_mode() {
        let config =
            ProbeConfig::from_definitions(&["PACKAGE=Foo", "OUTPUT_FILE=/tmp/out.json"]).unwrap();

        assert_eq!(config.query, PackageQuery::new("Foo"));
        assert_eq!(config.output_file, PathBuf::from("/tmp/out.json"));
        assert_eq!(config.target, None);
        assert_eq!(config.build_type, None);
        assert!(config.ignored.is_empty());
    }

    #[test]
    fn test_unit_mode_with_everything() {
        let config = ProbeConfig::from_definitions(&[
            "PACKAGE=Qt6",
            "OUTPUT_FILE=out.json",
            "VERSION=6.2",
            "COMPONENTS=Core;Gui;;Widgets",
            "TARGET=Qt6::Core",
            "CMAKE_BUILD_TYPE=Release",
        ])
        .unwrap();

        assert_eq!(config.query.name, "Qt6");
        assert_eq!(config.query.minimum_version.as_deref(), Some("6.2"));
        assert_eq!(config.query.components, vec!["Core", "Gui", "Widgets"]);
        assert_eq!(config.target.as_deref(), Some("Qt6::Core"));
        assert_eq!(config.build_type.as_deref(), Some("Release"));
    }

    #[test]
    fn test_missing_package() {
        let err = ProbeConfig::from_definitions(&["OUTPUT_FILE=out.json"]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(PACKAGE));
    }

    #[test]
    fn test_missing_output_file() {
        let err = ProbeConfig::from_definitions(&["PACKAGE=Foo"]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(OUTPUT_FILE));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let err = ProbeConfig::from_definitions(&["PACKAGE=", "OUTPUT_FILE=out.json"]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(PACKAGE));

        let config =
            ProbeConfig::from_definitions(&["PACKAGE=Foo", "OUTPUT_FILE=o", "TARGET="]).unwrap();
        assert_eq!(config.target, None);
    }

    #[test]
    fn test_malformed_definition() {
        let err = ProbeConfig::from_definitions(&["PACKAGE"]).unwrap_err();
        assert_eq!(err, ConfigError::Malformed("PACKAGE".into()));

        let err = ProbeConfig::from_definitions(&["=Foo"]).unwrap_err();
        assert_eq!(err, ConfigError::Malformed("=Foo".into()));
    }

    #[test]
    fn test_typed_definition_and_override() {
        let config = ProbeConfig::from_definitions(&[
            "PACKAGE:STRING=Foo",
            "OUTPUT_FILE:FILEPATH=a.json",
            "OUTPUT_FILE=b.json",
        ])
        .unwrap();

        assert_eq!(config.query.name, "Foo");
        assert_eq!(config.output_file, PathBuf::from("b.json"));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let config =
            ProbeConfig::from_definitions(&["PACKAGE=Foo", "OUTPUT_FILE=/tmp/a=b.json"]).unwrap();
        assert_eq!(config.output_file, PathBuf::from("/tmp/a=b.json"));
    }

    #[test]
    fn test_unknown_definitions_are_ignored() {
        let config = ProbeConfig::from_definitions(&[
            "ZETA=1",
            "PACKAGE=Foo",
            "ALPHA=2",
            "OUTPUT_FILE=o",
            "MIDDLE=3",
            "ZETA=4",
        ])
        .unwrap();
        assert_eq!(config.query.name, "Foo");
        assert_eq!(config.ignored, vec!["ZETA", "ALPHA", "MIDDLE"]);
    }
}
