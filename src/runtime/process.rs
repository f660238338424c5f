//! Running external programs.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::RealRuntime;

/// A program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    /// Forward the child's stdout/stderr instead of capturing them.
    pub inherit_output: bool,
}

impl ProcessCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            inherit_output: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn inherit_output(mut self, inherit: bool) -> Self {
        self.inherit_output = inherit;
        self
    }
}

/// Result of a finished program. Captured streams are empty when the output was inherited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn execute_impl(&self, command: &ProcessCommand) -> Result<ProcessOutput> {
        let mut process = Command::new(&command.program);
        process.args(&command.args);
        if let Some(dir) = &command.current_dir {
            process.current_dir(dir);
        }
        if command.inherit_output {
            process.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        let output = process
            .output()
            .with_context(|| format!("Failed to run {:?}", command.program))?;

        Ok(ProcessOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
