//! Native file system implementation

use crate::error::{VfsError, VfsResult};
use crate::r#trait::DirEntry;
use crate::VirtualFileSystem;
use std::path::Path;

/// A native OS file system implementation.
///
/// This wraps `std::fs` operations and provides the `VirtualFileSystem`
/// interface for local file access. Paths are used exactly as given; the
/// process working directory is never consulted or changed here.
///
/// # Example
/// ```
/// use bspm_vfs::{NativeFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = NativeFileSystem::new();
/// assert!(!fs.is_file(Path::new("/definitely/not/here.cppm")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NativeFileSystem;

impl NativeFileSystem {
    /// Create a new native file system.
    pub fn new() -> Self {
        Self
    }
}

impl VirtualFileSystem for NativeFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| VfsError::from_io(e, path))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        std::fs::write(path, content).map_err(|e| VfsError::from_io(e, path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        if !path.is_dir() {
            return Err(VfsError::NotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let iter = std::fs::read_dir(path).map_err(|e| VfsError::from_io(e, path))?;
        let mut entries = Vec::new();
        for entry in iter {
            let entry = entry.map_err(|e| VfsError::from_io(e, path))?;
            let entry_path = entry.path();
            // 跟随符号链接判断
            let is_file = entry_path.is_file();
            entries.push(DirEntry {
                path: entry_path,
                is_file,
            });
        }
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> VfsResult<()> {
        std::fs::create_dir_all(path).map_err(|e| VfsError::from_io(e, path))
    }

    fn remove_file(&self, path: &Path) -> VfsResult<()> {
        std::fs::remove_file(path).map_err(|e| VfsError::from_io(e, path))
    }

    fn remove_dir_all(&self, path: &Path) -> VfsResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| VfsError::from_io(e, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bspm_vfs_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_native_read_write() {
        let fs = NativeFileSystem::new();
        let file = temp_path("rw.cppm");
        let _ = std::fs::remove_file(&file);

        fs.write_file(&file, b"export module rw;").unwrap();
        assert_eq!(fs.read_file(&file).unwrap(), b"export module rw;");
        assert!(fs.is_file(&file));
        assert!(fs.exists(&file));

        fs.remove_file(&file).unwrap();
        assert!(!fs.exists(&file));
    }

    #[test]
    fn test_native_read_missing_is_not_found() {
        let fs = NativeFileSystem::new();
        let missing = temp_path("missing_xyz.cpp");
        let _ = std::fs::remove_file(&missing);

        let err = fs.read_file(&missing).unwrap_err();
        assert!(matches!(err, VfsError::NotFound { .. }));
    }

    #[test]
    fn test_native_read_dir_and_remove_dir_all() {
        let fs = NativeFileSystem::new();
        let dir = temp_path("listing");
        let _ = std::fs::remove_dir_all(&dir);

        fs.create_dir_all(&dir.join("sub")).unwrap();
        fs.write_file(&dir.join("a.cppm"), b"").unwrap();
        fs.write_file(&dir.join("b.cpp"), b"").unwrap();

        let mut entries = fs.read_dir(&dir).unwrap();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].extension(), Some("cppm"));
        assert!(entries[0].is_file);
        assert!(entries[1].is_file);
        assert!(!entries[2].is_file);

        fs.remove_dir_all(&dir).unwrap();
        assert!(!fs.is_dir(&dir));
    }

    #[test]
    fn test_native_read_dir_on_file_is_not_found() {
        let fs = NativeFileSystem::new();
        let file = temp_path("not_a_dir.cpp");
        fs.write_file(&file, b"").unwrap();

        let err = fs.read_dir(&file).unwrap_err();
        assert!(matches!(err, VfsError::NotFound { .. }));

        std::fs::remove_file(&file).unwrap();
    }
}
