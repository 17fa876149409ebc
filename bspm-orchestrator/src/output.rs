//! Output handling for step execution
//!
//! Captures each command line and the toolchain's output so callers can
//! show it after the build, whether it succeeded or not.

use std::sync::{Arc, Mutex};

/// A single output entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEntry {
    /// Rendered command line of a step
    Command(String),
    /// Captured standard output of a step
    Stdout(String),
    /// Captured standard error of a step
    Stderr(String),
}

/// Output buffer shared between workers
pub trait OutputBuffer: Send + Sync {
    /// Push an output entry
    fn push(&self, entry: OutputEntry);

    /// Push several entries without interleaving with other writers
    fn push_all(&self, entries: Vec<OutputEntry>);

    /// Drain all entries (returns and clears)
    fn drain(&self) -> Vec<OutputEntry>;

    /// Check if empty
    fn is_empty(&self) -> bool;
}

/// In-memory output buffer implementation
#[derive(Debug, Default)]
pub struct MemoryOutputBuffer {
    entries: Mutex<Vec<OutputEntry>>,
}

impl MemoryOutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputBuffer for MemoryOutputBuffer {
    fn push(&self, entry: OutputEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    fn push_all(&self, batch: Vec<OutputEntry>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.extend(batch);
        }
    }

    fn drain(&self) -> Vec<OutputEntry> {
        if let Ok(mut entries) = self.entries.lock() {
            std::mem::take(&mut *entries)
        } else {
            Vec::new()
        }
    }

    fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.is_empty())
            .unwrap_or(true)
    }
}

/// Shared output buffer handle
pub type OutputHandle = Arc<dyn OutputBuffer>;

/// Create a new output buffer
pub fn new_output_buffer() -> OutputHandle {
    Arc::new(MemoryOutputBuffer::new())
}
