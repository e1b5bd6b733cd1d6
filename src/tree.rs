//! Recursive tree hashing.
//!
//! A file hashes to the digest of its bytes. A directory hashes to the digest
//! of `name ‖ digest` for each child, children sorted by name, so the result
//! does not depend on the order the filesystem lists entries in. In verbose
//! mode the children's entries are kept alongside the aggregate digest.

use crate::digest::CryptoOptions;
use crate::fs::{FileSystem, FsError, PathKind, resolve_parent};
use crate::manifest::{HashEntry, MANIFEST_FILENAME, Manifest, VerboseNode};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("EFS: {0}")]
    Fs(#[from] FsError),
    #[error("ENOSUP: Path is neither a file nor a directory: {0}")]
    Unsupported(PathBuf),
}

impl TreeError {
    pub fn code(&self) -> &'static str {
        match self {
            TreeError::Fs(_) => "EFS",
            TreeError::Unsupported(_) => "ENOSUP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashOptions {
    pub crypto: CryptoOptions,
    /// Entry names, or paths relative to the hashed root, to leave out.
    pub exclude: BTreeSet<String>,
    /// Keep per-child digests for directories.
    pub verbose: bool,
}

impl Default for HashOptions {
    fn default() -> Self {
        HashOptions {
            crypto: CryptoOptions::default(),
            exclude: BTreeSet::new(),
            verbose: true,
        }
    }
}

impl HashOptions {
    /// Same exclusions, different algorithm/encoding and verbosity.
    pub fn with_candidate(&self, crypto: CryptoOptions, verbose: bool) -> Self {
        HashOptions {
            crypto,
            exclude: self.exclude.clone(),
            verbose,
        }
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|pattern| {
            let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
            if pattern.is_empty() {
                return false;
            }
            relative == Path::new(pattern)
                || relative.components().any(|c| match c {
                    Component::Normal(segment) => segment == pattern,
                    _ => false,
                })
        })
    }
}

/// Hash a file or directory into a single entry.
pub fn build_entry(
    fs: &dyn FileSystem,
    path: &Path,
    options: &HashOptions,
) -> Result<HashEntry, TreeError> {
    build_at(fs, path, Path::new(""), options)
}

/// Hash `path` into a manifest keyed by its own name.
pub fn create(
    fs: &dyn FileSystem,
    path: &Path,
    options: &HashOptions,
) -> Result<Manifest, TreeError> {
    let name = entry_name(fs, path)?;
    let entry = build_entry(fs, path, options)?;

    info!(
        "Hashed {} with {} (verbose: {})",
        path.display(),
        options.crypto,
        options.verbose
    );

    let mut hashes = BTreeMap::new();
    hashes.insert(name, entry);
    Ok(Manifest::new(hashes))
}

/// The key a manifest uses for `path`: its final component, with `.` or
/// `dir/..` resolved to the directory they name. A symlink is keyed by its
/// own name, not its target's.
pub fn entry_name(fs: &dyn FileSystem, path: &Path) -> Result<String, FsError> {
    let resolved = resolve_parent(fs, path)?;
    match resolved.file_name() {
        Some(name) => name
            .to_str()
            .map(str::to_string)
            .ok_or_else(|| FsError::InvalidName(resolved.clone())),
        None => Ok(resolved.to_string_lossy().into_owned()),
    }
}

fn build_at(
    fs: &dyn FileSystem,
    path: &Path,
    relative: &Path,
    options: &HashOptions,
) -> Result<HashEntry, TreeError> {
    match fs.kind(path)? {
        PathKind::File => {
            let bytes = fs.read_file(path)?;
            let digest = options.crypto.digest(&bytes);
            debug!("Checksum of {} is {}", path.display(), digest);
            Ok(HashEntry::Digest(digest))
        }
        PathKind::Directory => hash_directory(fs, path, relative, options),
        PathKind::Other => Err(TreeError::Unsupported(path.to_path_buf())),
    }
}

fn hash_directory(
    fs: &dyn FileSystem,
    path: &Path,
    relative: &Path,
    options: &HashOptions,
) -> Result<HashEntry, TreeError> {
    let mut names = fs.list_directory(path)?;
    names.retain(|name| name != MANIFEST_FILENAME && !options.is_excluded(&relative.join(name)));
    names.sort();

    let mut hasher = options.crypto.hasher();
    let mut contents = BTreeMap::new();

    for name in names {
        let child = build_at(fs, &path.join(&name), &relative.join(&name), options)?;
        hasher.update(name.as_bytes());
        hasher.update(child.digest().as_bytes());
        if options.verbose {
            contents.insert(name, child);
        }
    }

    let hash = hasher.finish();
    debug!("Checksum of {} is {}", path.display(), hash);

    if options.verbose {
        Ok(HashEntry::Node(VerboseNode { contents, hash }))
    } else {
        Ok(HashEntry::Digest(hash))
    }
}
