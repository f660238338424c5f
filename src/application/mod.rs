//! Application layer - Use cases that coordinate discovery and probing.
//!
//! This layer sits between the CLI and the probing logic: it picks the
//! discovery backend, runs the requested mode and writes the result.

mod probe;

pub use probe::{Backend, ProbeAction, ProbeOptions};
