//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over the file system and
//! process execution, so that the discovery backends and the entry point can
//! be tested without touching the host.
//!
//! # Structure
//!
//! - `fs` - File system operations (read, write, directory)
//! - `process` - Running external programs (cmake)

mod fs;
mod process;

use anyhow::Result;
use std::path::Path;

pub use process::{ProcessCommand, ProcessOutput};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime {
    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    // Processes
    /// Run a program to completion. Fails only when the program cannot be started;
    /// a non-zero exit is reported through [`ProcessOutput::success`].
    fn execute(&self, command: &ProcessCommand) -> Result<ProcessOutput>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn execute(&self, command: &ProcessCommand) -> Result<ProcessOutput> {
        self.execute_impl(command)
    }
}
