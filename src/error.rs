//! Typed errors and their process exit codes.

use thiserror::Error;

/// Invalid or missing process parameters. Detected before any discovery work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("required parameter {0} is not set")]
    Missing(&'static str),

    #[error("malformed definition {0:?}, expected NAME=VALUE")]
    Malformed(String),
}

/// Failures of the discovery mechanism itself.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cmake program {0:?} could not be executed")]
    CMakeNotFound(String),

    #[error("cmake {found} is too old, at least {required} is required")]
    UnsupportedCMakeVersion { found: String, required: &'static str },

    #[error("cmake failed while probing for {package} ({status}): {stderr}")]
    CMakeFailed {
        package: String,
        status: String,
        stderr: String,
    },

    #[error("invalid registry snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Failures while resolving a package or unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The package was expected to exist but the discovery call did not find it.
    #[error("package {0} was not found although it was found before")]
    DiscoveryInconsistency(String),

    #[error("unit {unit} is not registered by package {package}")]
    UnitNotFound { package: String, unit: String },
}

/// Map an error chain to the process exit code.
///
/// - 78: configuration error (EX_CONFIG)
/// - 1: everything else
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.chain().any(|cause| cause.is::<ConfigError>()) {
        78
    } else {
        1
    }
}
