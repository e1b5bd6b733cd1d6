//! Verification of a path against an integrity reference.

use crate::detect::detect;
use crate::fs::{FileSystem, FsError, PathKind, resolve_parent};
use crate::manifest::{HashEntry, Manifest, ManifestError};
use crate::reference::{IntegrityRef, ReferenceError, classify};
use crate::resolve::{locate_manifest, resolve_entry};
use crate::tree::{HashOptions, TreeError, build_entry, entry_name};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("EFS: {0}")]
    Fs(#[from] FsError),
}

impl CheckError {
    pub fn code(&self) -> &'static str {
        match self {
            CheckError::Reference(e) => e.code(),
            CheckError::Manifest(e) => e.code(),
            CheckError::Tree(e) => e.code(),
            CheckError::Fs(_) => "EFS",
        }
    }
}

/// Verify `input` against `integrity`.
///
/// `integrity` may be a manifest file, a directory holding one (or below
/// one), manifest JSON, or a bare digest. With `detect`, the algorithm and
/// encoding are searched for instead of taken from `options`; exclusions in
/// `options` still apply.
///
/// # Returns
///
/// `Ok(false)` when verification cannot even be attempted: empty arguments,
/// an input that is not an existing file or directory, no manifest to be
/// found, or no entry for the input in it. `Ok(false)` as well when the
/// digests differ.
///
/// # Errors
///
/// * `EINVNAME` - `integrity` names an existing file other than a manifest
/// * `ENOSUP` - `integrity` exists but is neither a file nor a directory, or
///   the input tree contains such an entry
/// * `EVALER` - the manifest does not match the schema
/// * `EINVER` - the manifest was written for another version
pub fn check(
    fs: &dyn FileSystem,
    input: &str,
    integrity: &str,
    options: Option<&HashOptions>,
    detect_options: bool,
) -> Result<bool, CheckError> {
    if input.trim().is_empty() {
        warn!("No input path given");
        return Ok(false);
    }
    if integrity.trim().is_empty() {
        warn!("No integrity reference given");
        return Ok(false);
    }

    let input_path = Path::new(input);
    if !fs.exists(input_path) {
        warn!("Input path does not exist: {input}");
        return Ok(false);
    }
    match fs.kind(input_path) {
        Ok(PathKind::File | PathKind::Directory) => {}
        Ok(PathKind::Other) => {
            warn!("Input path is neither a file nor a directory: {input}");
            return Ok(false);
        }
        Err(e) => {
            warn!("Cannot inspect input path {input}: {e}");
            return Ok(false);
        }
    }

    // A symlinked input keeps its own name so it resolves where it was recorded.
    let input_path = resolve_parent(fs, input_path)?;

    let manifest;
    let reference = match classify(fs, integrity)? {
        IntegrityRef::ManifestFile(path) => {
            manifest = Manifest::load(fs, &path)?;
            let path = fs.canonicalize(&path)?;
            let root = path.parent().unwrap_or(Path::new("/"));
            resolve_entry(&manifest, root, &input_path)
        }
        IntegrityRef::ManifestDir(dir) => {
            let Some(path) = locate_manifest(fs, &dir)? else {
                warn!("No manifest found in {} or its ancestors", dir.display());
                return Ok(false);
            };
            manifest = Manifest::load(fs, &path)?;
            let root = path.parent().unwrap_or(Path::new("/"));
            resolve_entry(&manifest, root, &input_path)
        }
        IntegrityRef::Json(text) => {
            manifest = Manifest::parse(&text)?;
            manifest.hashes.get(&entry_name(fs, &input_path)?)
        }
        IntegrityRef::Digest(digest) => {
            let name = entry_name(fs, &input_path)?;
            manifest = Manifest::single(&name, &digest);
            manifest.hashes.get(&name)
        }
    };

    let Some(reference) = reference else {
        info!("No entry for {} in the manifest", input_path.display());
        return Ok(false);
    };

    let default_options = HashOptions::default();
    let options = options.unwrap_or(&default_options);

    if detect_options {
        let outcome = detect(fs, &input_path, reference, options);
        return Ok(outcome.matched());
    }

    let fresh = build_entry(fs, &input_path, options)?;
    let matched = entries_match(reference, &fresh);
    info!(
        "{} {} the reference",
        input_path.display(),
        if matched { "matches" } else { "does not match" }
    );
    Ok(matched)
}

/// Compare a recorded entry with a freshly built one.
///
/// A plain digest recorded for a directory does not match a verbose fresh
/// build: the reference was not created verbosely. Everywhere else only the
/// digest strings reachable in both trees are compared, so hand-written
/// manifests that mix verbose and plain entries, or list only some children,
/// still verify.
pub fn entries_match(reference: &HashEntry, fresh: &HashEntry) -> bool {
    if matches!((reference, fresh), (HashEntry::Digest(_), HashEntry::Node(_))) {
        debug!("Verbosity mismatch between reference and fresh build");
        return false;
    }
    subtree_matches(reference, fresh)
}

fn subtree_matches(reference: &HashEntry, fresh: &HashEntry) -> bool {
    let digest = fresh.digest();
    if digest.is_empty() || reference.digest() != digest {
        return false;
    }

    match (reference, fresh) {
        (HashEntry::Node(reference), HashEntry::Node(fresh)) => {
            // The aggregate already covers every child; recorded ones must
            // still be present and match.
            reference.contents.iter().all(|(name, child)| {
                fresh
                    .contents
                    .get(name)
                    .is_some_and(|fresh_child| subtree_matches(child, fresh_child))
            })
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests;
