//! bspm Virtual File System
//!
//! A virtual file system abstraction with two backends: the native OS file
//! system used by real builds, and an in-memory tree used by tests.
//!
//! # Usage
//! ```rust
//! use bspm_vfs::{MemoryFileSystem, VirtualFileSystem};
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::new();
//! fs.write_file(Path::new("/proj/main.cpp"), b"int main() {}").unwrap();
//! assert!(fs.is_dir(Path::new("/proj")));
//! assert_eq!(fs.read_dir(Path::new("/proj")).unwrap().len(), 1);
//! ```

mod error;
mod memory;
mod native;
mod r#trait;

pub use error::{VfsError, VfsResult};
pub use memory::MemoryFileSystem;
pub use native::NativeFileSystem;
pub use r#trait::{DirEntry, VirtualFileSystem};

/// Create a new memory-based file system.
pub fn memory_fs() -> MemoryFileSystem {
    MemoryFileSystem::new()
}

/// Create a new native file system.
pub fn native_fs() -> NativeFileSystem {
    NativeFileSystem::new()
}
