//! Subprocess runner seam

use std::process::Command;

use bspm_core::CommandSpec;
use tracing::trace;

use crate::error::ExecError;

/// Result of one finished subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    /// Exit code, `None` when terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl StepOutput {
    /// Successful output with the given stdout
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs one rendered command to completion
///
/// `Err` is reserved for commands that could not be started at all; a
/// non-zero exit is reported through [`StepOutput::status`].
pub trait StepRunner: Send + Sync {
    fn run(&self, command: &CommandSpec) -> Result<StepOutput, ExecError>;
}

/// Runs commands as real child processes with captured output
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl StepRunner for ProcessRunner {
    fn run(&self, command: &CommandSpec) -> Result<StepOutput, ExecError> {
        trace!(target: "bspm::exec", cwd = %command.cwd.display(), "spawn {}", command);
        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .output()
            .map_err(|source| ExecError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        Ok(StepOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
