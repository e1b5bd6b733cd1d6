//! Filesystem capabilities consumed by the engine.
//!
//! The engine never touches `std::fs` directly: everything goes through
//! [`FileSystem`], so tests can swap in an in-memory tree.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[cfg(test)]
pub(crate) mod memory;

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),
    #[error("Entry name is not valid UTF-8: {0}")]
    InvalidName(PathBuf),
}

impl FsError {
    pub(crate) fn from_io(path: &Path, e: std::io::Error) -> Self {
        match e.kind() {
            ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            _ => FsError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    /// Sockets, FIFOs, devices.
    Other,
}

pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    /// Kind of the entry at `path`, following symlinks.
    fn kind(&self, path: &Path) -> Result<PathKind, FsError>;

    /// Names of the immediate children of `path`, in no particular order.
    fn list_directory(&self, path: &Path) -> Result<Vec<String>, FsError>;

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    fn read_to_string(&self, path: &Path) -> Result<String, FsError>;

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError>;
}

/// Absolute form of `path` with its parent directory resolved but its final
/// component kept as given, so a symlink keeps its own name and location.
///
/// Paths without a usable final component (`.`, `..`, `/`) are resolved
/// completely.
pub fn resolve_parent(fs: &dyn FileSystem, path: &Path) -> Result<PathBuf, FsError> {
    let Some(name) = path.file_name() else {
        return fs.canonicalize(path);
    };
    if !fs.exists(path) {
        return Err(FsError::NotFound(path.to_path_buf()));
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(fs.canonicalize(parent)?.join(name))
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn kind(&self, path: &Path) -> Result<PathKind, FsError> {
        let metadata = std::fs::metadata(path).map_err(|e| FsError::from_io(path, e))?;
        let file_type = metadata.file_type();
        Ok(if file_type.is_file() {
            PathKind::File
        } else if file_type.is_dir() {
            PathKind::Directory
        } else {
            PathKind::Other
        })
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<String>, FsError> {
        let read_dir = std::fs::read_dir(path).map_err(|e| FsError::from_io(path, e))?;

        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| FsError::from_io(path, e))?;
            let name = entry
                .file_name()
                .into_string()
                .map_err(|_| FsError::InvalidName(entry.path()))?;
            names.push(name);
        }

        Ok(names)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        std::fs::read(path).map_err(|e| FsError::from_io(path, e))
    }

    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        std::fs::read_to_string(path).map_err(|e| FsError::from_io(path, e))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError> {
        path.canonicalize().map_err(|e| FsError::from_io(path, e))
    }
}
