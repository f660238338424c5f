//! Discovery through CMake's `find_package()`.
//!
//! A small CMake project (see `probe.cmake`) is written into a temporary working
//! directory and configured with `cmake .`. The project calls `find_package()`
//! and records every imported target with its raw properties into a
//! [`Snapshot`], which is then served by [`SnapshotDiscovery`].

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::{Discovery, FoundPackage, PackageQuery, Snapshot, SnapshotDiscovery, VersionUse};
use crate::error::DiscoveryError;
use crate::runtime::{ProcessCommand, Runtime};
use crate::version::Version;

/// Oldest CMake providing the `IMPORTED_TARGETS` directory property and `string(JSON)`.
pub const CMAKE_MIN_VERSION: &str = "3.21";

const PROBE_SCRIPT: &str = include_str!("probe.cmake");
const SNAPSHOT_FILE: &str = "snapshot.json";

#[derive(Debug, Clone)]
pub struct CMakeOptions {
    /// CMake program, resolved through `PATH` when not absolute.
    pub program: PathBuf,
    pub build_type: Option<String>,
    /// Target properties the probe project records for every unit.
    pub properties: Vec<String>,
    /// Names that may be ALIAS targets, which never show up among the
    /// imported targets themselves.
    pub targets: Vec<String>,
    /// Forward CMake's own output.
    pub verbose: bool,
}

impl Default for CMakeOptions {
    fn default() -> Self {
        Self {
            program: PathBuf::from("cmake"),
            build_type: None,
            properties: Vec::new(),
            targets: Vec::new(),
            verbose: false,
        }
    }
}

pub struct CMakeDiscovery<'a, R: Runtime> {
    runtime: &'a R,
    options: CMakeOptions,
    working_directory: TempDir,
}

impl<'a, R: Runtime> CMakeDiscovery<'a, R> {
    pub fn new(runtime: &'a R, options: CMakeOptions) -> Result<Self> {
        let working_directory = tempfile::Builder::new()
            .prefix("cmake-probe")
            .tempdir()
            .context("Failed to create a working directory for cmake")?;

        Ok(Self {
            runtime,
            options,
            working_directory,
        })
    }

    pub fn working_directory(&self) -> &Path {
        self.working_directory.path()
    }

    fn not_found(&self) -> DiscoveryError {
        DiscoveryError::CMakeNotFound(self.options.program.display().to_string())
    }

    /// Make sure the CMake program runs and is recent enough.
    #[tracing::instrument(skip(self))]
    pub fn check_version(&self) -> Result<Version> {
        let command = ProcessCommand::new(&self.options.program).arg("--version");
        let output = self.runtime.execute(&command).map_err(|err| {
            debug!("Failed to run cmake: {:#}", err);
            self.not_found()
        })?;
        if !output.success {
            return Err(self.not_found().into());
        }

        let unsupported = || DiscoveryError::UnsupportedCMakeVersion {
            found: output.stdout.trim().to_string(),
            required: CMAKE_MIN_VERSION,
        };
        let found = parse_cmake_version(&output.stdout).ok_or_else(unsupported)?;
        if found < Version::parse(CMAKE_MIN_VERSION)? {
            return Err(unsupported().into());
        }

        debug!("Using cmake {}", found);
        Ok(found)
    }

    fn probe_command(&self, query: &PackageQuery, version: VersionUse, output_file: &Path) -> ProcessCommand {
        let mut command = ProcessCommand::new(&self.options.program)
            .current_dir(self.working_directory())
            .inherit_output(self.options.verbose)
            .arg(".")
            .arg(format!("-DPACKAGE={}", query.name))
            .arg(format!("-DOUTPUT_FILE={}", output_file.display()))
            .arg(format!("-DPROBE_PROPERTIES={}", self.options.properties.join(";")));

        if !self.options.targets.is_empty() {
            command = command.arg(format!("-DPROBE_TARGETS={}", self.options.targets.join(";")));
        }
        if version == VersionUse::Require {
            if let Some(minimum) = &query.minimum_version {
                command = command.arg(format!("-DVERSION={}", minimum));
            }
        }
        if !query.components.is_empty() {
            command = command.arg(format!("-DCOMPONENTS={}", query.components.join(";")));
        }
        if let Some(build_type) = &self.options.build_type {
            command = command.arg(format!("-DCMAKE_BUILD_TYPE={}", build_type));
        }
        command
    }
}

/// Extract the version from `cmake --version` output ("cmake version 3.28.1").
fn parse_cmake_version(stdout: &str) -> Option<Version> {
    stdout
        .lines()
        .next()?
        .trim()
        .strip_prefix("cmake version ")?
        .parse()
        .ok()
}

impl<R: Runtime> Discovery for CMakeDiscovery<'_, R> {
    #[tracing::instrument(skip(self))]
    fn find_package(&self, query: &PackageQuery, version: VersionUse) -> Result<Option<FoundPackage>> {
        self.check_version()?;

        let project_file = self.working_directory().join("CMakeLists.txt");
        self.runtime
            .write(&project_file, PROBE_SCRIPT.as_bytes())
            .context("Failed to write the probe project")?;

        let output_file = self.working_directory().join(SNAPSHOT_FILE);
        let command = self.probe_command(query, version, &output_file);
        debug!("Running {:?} {:?}", command.program, command.args);

        let output = self.runtime.execute(&command).map_err(|err| {
            debug!("Failed to run cmake: {:#}", err);
            self.not_found()
        })?;
        if !output.success {
            return Err(DiscoveryError::CMakeFailed {
                package: query.name.clone(),
                status: output
                    .code
                    .map_or_else(|| "killed by a signal".to_string(), |code| format!("exit code {}", code)),
                stderr: output.stderr.trim().to_string(),
            }
            .into());
        }

        let json = self
            .runtime
            .read_to_string(&output_file)
            .context("Failed to read the snapshot written by cmake")?;
        let snapshot = Snapshot::from_json(&json)?;

        // find_package() already applied the version constraint.
        SnapshotDiscovery::new(snapshot).find_package(query, VersionUse::Ignore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, ProcessOutput};

    fn version_output(version: &str) -> ProcessOutput {
        ProcessOutput {
            success: true,
            code: Some(0),
            stdout: format!("cmake version {}\n\nCMake suite maintained and supported by Kitware (kitware.com/cmake).\n", version),
            stderr: String::new(),
        }
    }

    fn options() -> CMakeOptions {
        CMakeOptions {
            properties: vec!["NAME".into(), "INTERFACE_LINK_LIBRARIES".into()],
            ..Default::default()
        }
    }

    fn is_version_check(command: &ProcessCommand) -> bool {
        command.args == ["--version"]
    }

    #[test]
    fn test_parse_cmake_version() {
        assert_eq!(
            parse_cmake_version("cmake version 3.28.1\n\nCMake suite..."),
            Some(Version::parse("3.28.1").unwrap())
        );
        assert_eq!(
            parse_cmake_version("cmake version 3.30.0-rc2\n"),
            Some(Version::parse("3.30.0").unwrap())
        );
        assert_eq!(parse_cmake_version("something else"), None);
        assert_eq!(parse_cmake_version(""), None);
    }

    #[test]
    fn test_check_version_ok() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_execute()
            .withf(is_version_check)
            .returning(|_| Ok(version_output("3.28.1")));

        let discovery = CMakeDiscovery::new(&runtime, options()).unwrap();
        assert_eq!(discovery.check_version().unwrap().to_string(), "3.28.1");
    }

    #[test]
    fn test_check_version_too_old() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_execute()
            .withf(is_version_check)
            .returning(|_| Ok(version_output("3.16.3")));

        let discovery = CMakeDiscovery::new(&runtime, options()).unwrap();
        let err = discovery.check_version().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiscoveryError>(),
            Some(DiscoveryError::UnsupportedCMakeVersion { .. })
        ));
    }

    #[test]
    fn test_check_version_cmake_missing() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_execute()
            .returning(|_| Err(anyhow::anyhow!("No such file or directory")));

        let discovery = CMakeDiscovery::new(&runtime, options()).unwrap();
        let err = discovery.check_version().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiscoveryError>(),
            Some(DiscoveryError::CMakeNotFound(_))
        ));
    }

    #[test]
    fn test_probe_command_mode_a_omits_version() {
        let runtime = MockRuntime::new();
        let discovery = CMakeDiscovery::new(&runtime, options()).unwrap();
        let query = PackageQuery::new("Foo")
            .minimum_version("2.0")
            .components(vec!["core".to_string(), "util".to_string()]);

        let command = discovery.probe_command(&query, VersionUse::Ignore, Path::new("/w/snapshot.json"));
        assert_eq!(
            command.args,
            vec![
                ".",
                "-DPACKAGE=Foo",
                "-DOUTPUT_FILE=/w/snapshot.json",
                "-DPROBE_PROPERTIES=NAME;INTERFACE_LINK_LIBRARIES",
                "-DCOMPONENTS=core;util",
            ]
        );
        assert_eq!(command.current_dir.as_deref(), Some(discovery.working_directory()));
        assert!(!command.inherit_output);
    }

    #[test]
    fn test_probe_command_mode_b_passes_version_and_build_type() {
        let runtime = MockRuntime::new();
        let options = CMakeOptions {
            build_type: Some("Release".into()),
            verbose: true,
            ..options()
        };
        let discovery = CMakeDiscovery::new(&runtime, options).unwrap();
        let query = PackageQuery::new("Foo").minimum_version("2.0");

        let command = discovery.probe_command(&query, VersionUse::Require, Path::new("/w/s.json"));
        assert!(command.args.contains(&"-DVERSION=2.0".to_string()));
        assert!(!command.args.iter().any(|a| a.starts_with("-DPROBE_TARGETS")));
        assert!(command.args.contains(&"-DCMAKE_BUILD_TYPE=Release".to_string()));
        assert!(!command.args.iter().any(|a| a.starts_with("-DCOMPONENTS")));
        assert!(command.inherit_output);
    }

    #[test]
    fn test_probe_command_passes_alias_candidates() {
        let runtime = MockRuntime::new();
        let options = CMakeOptions {
            targets: vec!["Foo::core".into()],
            ..options()
        };
        let discovery = CMakeDiscovery::new(&runtime, options).unwrap();

        let command = discovery.probe_command(&PackageQuery::new("Foo"), VersionUse::Require, Path::new("/w/s.json"));
        assert_eq!(
            command.args,
            vec![
                ".",
                "-DPACKAGE=Foo",
                "-DOUTPUT_FILE=/w/s.json",
                "-DPROBE_PROPERTIES=NAME;INTERFACE_LINK_LIBRARIES",
                "-DPROBE_TARGETS=Foo::core",
            ]
        );
    }

    #[test]
    fn test_embedded_script_keeps_expressions_and_aliases() {
        assert!(PROBE_SCRIPT.contains("_probe_split_list(_probe_items _probe_value)"));
        assert!(PROBE_SCRIPT.contains("ALIASED_TARGET"));
        assert!(PROBE_SCRIPT.contains("PROBE_TARGETS"));
    }

    #[test]
    fn test_find_package_reads_snapshot() {
        let mut runtime = MockRuntime::new();

        runtime
            .expect_execute()
            .withf(is_version_check)
            .returning(|_| Ok(version_output("3.28.1")));

        runtime
            .expect_write()
            .withf(|path, contents| {
                path.ends_with("CMakeLists.txt") && contents.starts_with(b"# Runs find_package()")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        runtime
            .expect_execute()
            .withf(|c| c.args.first().map(String::as_str) == Some("."))
            .times(1)
            .returning(|_| {
                Ok(ProcessOutput {
                    success: true,
                    code: Some(0),
                    ..Default::default()
                })
            });

        runtime
            .expect_read_to_string()
            .withf(|path| path.ends_with("snapshot.json"))
            .returning(|_| {
                Ok(r#"{"packages":{"Foo":{"version":"2.1"}},"units":{"Foo::core":{}}}"#.to_string())
            });

        let discovery = CMakeDiscovery::new(&runtime, options()).unwrap();
        let found = discovery
            .find_package(&PackageQuery::new("Foo"), VersionUse::Ignore)
            .unwrap()
            .unwrap();

        assert_eq!(found.version.as_deref(), Some("2.1"));
        assert!(found.registry.lookup("Foo::core").is_some());
    }

    #[test]
    fn test_find_package_not_found() {
        let mut runtime = MockRuntime::new();

        runtime
            .expect_execute()
            .withf(is_version_check)
            .returning(|_| Ok(version_output("3.28.1")));
        runtime.expect_write().returning(|_, _| Ok(()));
        runtime
            .expect_execute()
            .withf(|c| !is_version_check(c))
            .returning(|_| {
                Ok(ProcessOutput {
                    success: true,
                    code: Some(0),
                    ..Default::default()
                })
            });
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"packages":{},"units":{}}"#.to_string()));

        let discovery = CMakeDiscovery::new(&runtime, options()).unwrap();
        let found = discovery
            .find_package(&PackageQuery::new("Foo"), VersionUse::Ignore)
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_find_package_cmake_failure_carries_stderr() {
        let mut runtime = MockRuntime::new();

        runtime
            .expect_execute()
            .withf(is_version_check)
            .returning(|_| Ok(version_output("3.28.1")));
        runtime.expect_write().returning(|_, _| Ok(()));
        runtime
            .expect_execute()
            .withf(|c| !is_version_check(c))
            .returning(|_| {
                Ok(ProcessOutput {
                    success: false,
                    code: Some(1),
                    stdout: String::new(),
                    stderr: "CMake Error: No CMAKE_C_COMPILER could be found.\n".into(),
                })
            });

        let discovery = CMakeDiscovery::new(&runtime, options()).unwrap();
        let err = discovery
            .find_package(&PackageQuery::new("Foo"), VersionUse::Ignore)
            .unwrap_err();

        match err.downcast_ref::<DiscoveryError>() {
            Some(DiscoveryError::CMakeFailed {
                package,
                status,
                stderr,
            }) => {
                assert_eq!(package, "Foo");
                assert_eq!(status, "exit code 1");
                assert_eq!(stderr, "CMake Error: No CMAKE_C_COMPILER could be found.");
            }
            other => panic!("Unexpected error: {:?}", other),
        }
    }
}
