//! bspm Orchestrator - build plan execution
//!
//! Maps each planned step to a toolchain invocation and runs it through a
//! [`StepRunner`]. Exit codes are checked: a failing step aborts every step
//! that has not started yet, and its diagnostics travel back in the error.
//!
//! # Example
//! ```ignore
//! let executor = Executor::new(Arc::new(ProcessRunner::new())).with_jobs(4);
//! let report = executor.execute(&plan, &toolchain)?;
//! for entry in &report.output {
//!     println!("{:?}", entry);
//! }
//! ```

pub mod error;
pub mod executor;
pub mod output;
pub mod runner;

pub use error::ExecError;
pub use executor::{ExecutionReport, Executor, StepRecord};
pub use output::{new_output_buffer, MemoryOutputBuffer, OutputBuffer, OutputEntry, OutputHandle};
pub use runner::{ProcessRunner, StepOutput, StepRunner};
