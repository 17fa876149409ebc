//! VirtualFileSystem trait definition

use crate::error::VfsResult;
use std::path::{Path, PathBuf};

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the entry (directory path joined with the entry name)
    pub path: PathBuf,
    /// Whether the entry is a regular file (symlinks are followed)
    pub is_file: bool,
}

impl DirEntry {
    /// Extension of the entry, if any
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }
}

/// Virtual File System trait
///
/// Provides a unified interface for file operations, decoupling the build
/// engine from specific file system implementations.
///
/// # Implementations
/// - `MemoryFileSystem`: In-memory file system
/// - `NativeFileSystem`: Native OS file system
pub trait VirtualFileSystem: Send + Sync {
    /// Read file contents
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Write file contents
    ///
    /// Creates the file if it doesn't exist, truncates it if it does.
    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    /// Check if path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path exists and is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path exists and is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// List the direct children of a directory
    ///
    /// Entries come back in the backend's native iteration order; callers
    /// that need a stable order must not assume any particular one.
    ///
    /// # Returns
    /// The entries, or `VfsError::NotFound` if `path` is not a directory
    fn read_dir(&self, path: &Path) -> VfsResult<Vec<DirEntry>>;

    /// Create a directory and all missing parents
    fn create_dir_all(&self, path: &Path) -> VfsResult<()>;

    /// Remove a single file
    fn remove_file(&self, path: &Path) -> VfsResult<()>;

    /// Remove a directory and everything below it
    fn remove_dir_all(&self, path: &Path) -> VfsResult<()>;
}
