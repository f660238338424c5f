//! Probe installed CMake packages and describe them as JSON.
//!
//! A build orchestrator runs this tool twice per dependency:
//!
//! 1. with `PACKAGE` only, to learn whether the package is installed and which
//!    version it has (`{}` when it is not installed);
//! 2. with `TARGET` as well, to obtain the transitive property graph of one of
//!    the package's imported targets.
//!
//! Discovery goes through CMake's own `find_package()` (see [`discovery`]);
//! the recursive resolution lives in [`probe`].

pub mod application;
pub mod config;
pub mod discovery;
pub mod document;
pub mod error;
pub mod probe;
pub mod runtime;
pub mod version;
