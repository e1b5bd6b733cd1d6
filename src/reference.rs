//! Classification of the integrity argument passed to `check`.

use crate::fs::{FileSystem, FsError, PathKind};
use crate::manifest::MANIFEST_FILENAME;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error(
        "EINVNAME: Manifest file must be named '{expected}': {0}",
        expected = MANIFEST_FILENAME
    )]
    InvalidName(PathBuf),
    #[error("ENOSUP: Integrity path is neither a file nor a directory: {0}")]
    Unsupported(PathBuf),
    #[error("EFS: {0}")]
    Fs(#[from] FsError),
}

impl ReferenceError {
    pub fn code(&self) -> &'static str {
        match self {
            ReferenceError::InvalidName(_) => "EINVNAME",
            ReferenceError::Unsupported(_) => "ENOSUP",
            ReferenceError::Fs(_) => "EFS",
        }
    }
}

/// What an integrity argument turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityRef {
    /// Path to a manifest file.
    ManifestFile(PathBuf),
    /// Directory expected to hold (or sit below) a manifest file.
    ManifestDir(PathBuf),
    /// Manifest JSON given inline.
    Json(String),
    /// A bare digest string.
    Digest(String),
}

/// Classify `raw`: existing paths first, then JSON objects, then anything else
/// as a digest.
pub fn classify(fs: &dyn FileSystem, raw: &str) -> Result<IntegrityRef, ReferenceError> {
    let path = Path::new(raw);

    if fs.exists(path) {
        return match fs.kind(path)? {
            PathKind::File => {
                if path.file_name() == Some(std::ffi::OsStr::new(MANIFEST_FILENAME)) {
                    Ok(IntegrityRef::ManifestFile(path.to_path_buf()))
                } else {
                    Err(ReferenceError::InvalidName(path.to_path_buf()))
                }
            }
            PathKind::Directory => Ok(IntegrityRef::ManifestDir(path.to_path_buf())),
            PathKind::Other => Err(ReferenceError::Unsupported(path.to_path_buf())),
        };
    }

    // Only objects count as JSON; a digest made only of digits would
    // otherwise parse as a number.
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(_)) => Ok(IntegrityRef::Json(raw.to_string())),
        _ => Ok(IntegrityRef::Digest(raw.to_string())),
    }
}
