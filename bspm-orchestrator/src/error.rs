//! Error types for step execution

use thiserror::Error;

/// Step execution error type
#[derive(Error, Debug)]
pub enum ExecError {
    /// The toolchain exited unsuccessfully; remaining steps were not run
    #[error("step failed [{step}] ({}): {}", describe_status(.status), first_line(.stderr))]
    StepFailed {
        step: String,
        /// Exit code, `None` when terminated by a signal
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// The toolchain binary could not be started
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Skipped because another step failed first
    #[error("step cancelled after an earlier failure")]
    Cancelled,

    /// Worker pool could not be created
    #[error("worker pool error: {0}")]
    Pool(String),
}

impl ExecError {
    /// Whether this error is a consequence of another step's failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ExecError::Cancelled)
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn first_line(text: &str) -> &str {
    text.lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("no diagnostic output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failed_display() {
        let err = ExecError::StepFailed {
            step: "compile main.cpp".to_string(),
            status: Some(1),
            stdout: String::new(),
            stderr: "\nmain.cpp:1:1: error: boom\nmore\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "step failed [compile main.cpp] (exit code 1): main.cpp:1:1: error: boom"
        );
    }

    #[test]
    fn test_signal_and_empty_stderr() {
        let err = ExecError::StepFailed {
            step: "link a.out".to_string(),
            status: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "step failed [link a.out] (terminated by signal): no diagnostic output"
        );
        assert!(!err.is_cancellation());
        assert!(ExecError::Cancelled.is_cancellation());
    }
}
