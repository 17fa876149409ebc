//! In-memory file system implementation

use crate::error::{VfsError, VfsResult};
use crate::r#trait::DirEntry;
use crate::VirtualFileSystem;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<String, Vec<u8>>,
    /// Directories created explicitly; directories holding files are implied
    dirs: BTreeSet<String>,
}

/// An in-memory file system implementation.
///
/// Files are stored in a `BTreeMap` keyed by their normalized path, so a
/// directory listing always comes back in lexicographic order. Directories
/// exist implicitly as soon as a file is stored below them.
///
/// # Example
/// ```
/// use bspm_vfs::{MemoryFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::with_files([("/src/a.cppm", b"export module a;".to_vec())]);
/// assert!(fs.is_dir(Path::new("/src")));
/// assert_eq!(fs.read_file(Path::new("/src/a.cppm")).unwrap(), b"export module a;");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    tree: Arc<RwLock<Tree>>,
}

impl MemoryFileSystem {
    /// Create a new empty memory file system.
    pub fn new() -> Self {
        Self {
            tree: Arc::new(RwLock::new(Tree::default())),
        }
    }

    /// Create a new memory file system pre-populated with files.
    ///
    /// # Arguments
    /// * `files` - Iterator of (path, content) tuples
    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let fs = Self::new();
        if let Ok(mut tree) = fs.tree.write() {
            for (path, content) in files {
                let key = normalize_path(Path::new(path.as_ref()));
                tree.files.insert(key, content);
            }
        }
        fs
    }

    fn read(&self) -> VfsResult<RwLockReadGuard<'_, Tree>> {
        self.tree.read().map_err(|_| VfsError::Custom {
            message: String::from("Lock poisoned"),
        })
    }

    fn write(&self) -> VfsResult<RwLockWriteGuard<'_, Tree>> {
        self.tree.write().map_err(|_| VfsError::Custom {
            message: String::from("Lock poisoned"),
        })
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a path string for internal storage.
/// Uses forward slashes and no trailing separator (except for the root).
fn normalize_path(path: &Path) -> String {
    let mut normalized = path.to_string_lossy().replace('\\', "/");
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Key prefix shared by everything stored below `dir`
fn child_prefix(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{}/", dir)
    }
}

fn tree_is_dir(tree: &Tree, normalized: &str) -> bool {
    if tree.dirs.contains(normalized) {
        return true;
    }
    let prefix = child_prefix(normalized);
    tree.files.keys().any(|k| k.starts_with(&prefix))
        || tree.dirs.iter().any(|d| d.starts_with(&prefix))
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = normalize_path(path);
        let tree = self.read()?;

        tree.files
            .get(&normalized)
            .cloned()
            .ok_or(VfsError::NotFound { path: normalized })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let normalized = normalize_path(path);
        let mut tree = self.write()?;
        if tree_is_dir(&tree, &normalized) {
            return Err(VfsError::InvalidPath {
                path: normalized,
                reason: "is a directory".to_string(),
            });
        }
        tree.files.insert(normalized, content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let normalized = normalize_path(path);
        match self.read() {
            Ok(tree) => tree.files.contains_key(&normalized),
            Err(_) => false,
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let normalized = normalize_path(path);
        match self.read() {
            Ok(tree) => tree_is_dir(&tree, &normalized),
            Err(_) => false,
        }
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        let normalized = normalize_path(path);
        let tree = self.read()?;
        if !tree_is_dir(&tree, &normalized) {
            return Err(VfsError::NotFound { path: normalized });
        }

        let prefix = child_prefix(&normalized);
        // name -> is_file
        let mut children: BTreeMap<&str, bool> = BTreeMap::new();

        for key in tree.files.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.find('/') {
                Some(idx) => {
                    children.entry(&rest[..idx]).or_insert(false);
                }
                None if !rest.is_empty() => {
                    children.insert(rest, true);
                }
                None => {}
            }
        }
        for dir in &tree.dirs {
            let Some(rest) = dir.strip_prefix(&prefix) else {
                continue;
            };
            let name = rest.split('/').next().unwrap_or("");
            if !name.is_empty() {
                children.entry(name).or_insert(false);
            }
        }

        Ok(children
            .into_iter()
            .map(|(name, is_file)| DirEntry {
                path: PathBuf::from(format!("{}{}", prefix, name)),
                is_file,
            })
            .collect())
    }

    fn create_dir_all(&self, path: &Path) -> VfsResult<()> {
        let normalized = normalize_path(path);
        let mut tree = self.write()?;
        if tree.files.contains_key(&normalized) {
            return Err(VfsError::AlreadyExists { path: normalized });
        }
        tree.dirs.insert(normalized);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> VfsResult<()> {
        let normalized = normalize_path(path);
        let mut tree = self.write()?;
        match tree.files.remove(&normalized) {
            Some(_) => Ok(()),
            None => Err(VfsError::NotFound { path: normalized }),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> VfsResult<()> {
        let normalized = normalize_path(path);
        let mut tree = self.write()?;
        if !tree_is_dir(&tree, &normalized) {
            return Err(VfsError::NotFound { path: normalized });
        }
        let prefix = child_prefix(&normalized);
        tree.files.retain(|k, _| !k.starts_with(&prefix));
        tree.dirs
            .retain(|d| d != &normalized && !d.starts_with(&prefix));
        Ok(())
    }
}
