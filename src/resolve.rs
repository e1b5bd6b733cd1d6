//! Finding manifests on disk and the entry inside them that describes a path.

use crate::fs::{FileSystem, FsError, PathKind};
use crate::manifest::{HashEntry, MANIFEST_FILENAME, Manifest};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Look for a manifest in `start` and then in each ancestor directory.
///
/// Returns the path of the first manifest found, or `None` once the
/// filesystem root has been searched.
pub fn locate_manifest(fs: &dyn FileSystem, start: &Path) -> Result<Option<PathBuf>, FsError> {
    let mut dir = fs.canonicalize(start)?;
    if fs.kind(&dir)? != PathKind::Directory {
        dir.pop();
    }

    loop {
        let candidate = dir.join(MANIFEST_FILENAME);
        if fs.exists(&candidate) && fs.kind(&candidate)? == PathKind::File {
            debug!("Found manifest {}", candidate.display());
            return Ok(Some(candidate));
        }
        if !dir.pop() {
            return Ok(None);
        }
    }
}

/// Entry for `input` in a manifest stored in directory `root`.
///
/// Both paths must already be canonical. A manifest stored in a directory
/// either describes that directory itself (keyed by the directory's name) or
/// the entries inside it (keyed by their names); the first reading is tried
/// first.
pub fn resolve_entry<'a>(
    manifest: &'a Manifest,
    root: &Path,
    input: &Path,
) -> Option<&'a HashEntry> {
    let relative = input.strip_prefix(root).ok()?;
    let segments = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;

    if let Some(root_name) = root.file_name().and_then(|n| n.to_str()) {
        let mut prefixed = Vec::with_capacity(segments.len() + 1);
        prefixed.push(root_name);
        prefixed.extend_from_slice(&segments);
        if let Some(entry) = walk(&manifest.hashes, &prefixed) {
            return Some(entry);
        }
    }

    walk(&manifest.hashes, &segments)
}

/// Follow `segments` through `hashes`, descending into verbose nodes only.
fn walk<'a>(hashes: &'a BTreeMap<String, HashEntry>, segments: &[&str]) -> Option<&'a HashEntry> {
    let (first, rest) = segments.split_first()?;
    let mut entry = hashes.get(*first)?;
    for segment in rest {
        entry = entry.child(segment)?;
    }
    Some(entry)
}
