//! The manifest document: `{ "version": "1", "hashes": { <name>: <entry> } }`.
//!
//! An entry is either a digest string (a file, or a directory hashed
//! non-verbosely) or a `{ "contents": {...}, "hash": "..." }` node carrying
//! the digests of every child. Manifests written by hand may mix both shapes
//! across sibling subtrees.

use crate::fs::{FileSystem, FsError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Canonical name of a manifest file on disk.
pub const MANIFEST_FILENAME: &str = ".integrity.json";

/// The only manifest version this engine reads and writes.
pub const CURRENT_VERSION: &str = "1";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("EVALER: Manifest is not valid JSON: {0}")]
    Syntax(serde_json::Error),
    #[error("EVALER: Invalid manifest: {0}")]
    Invalid(String),
    #[error(
        "EINVER: Incompatible versions check: supported version is '{supported}', found '{0}'",
        supported = CURRENT_VERSION
    )]
    IncompatibleVersion(String),
    #[error("Manifest serialization error: {0}")]
    Serialize(serde_json::Error),
    #[error("EFS: {0}")]
    Fs(#[from] FsError),
}

impl ManifestError {
    pub fn code(&self) -> &'static str {
        match self {
            ManifestError::Syntax(_) | ManifestError::Invalid(_) => "EVALER",
            ManifestError::IncompatibleVersion(_) => "EINVER",
            ManifestError::Serialize(_) | ManifestError::Fs(_) => "EFS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HashEntry {
    /// A file digest, or the aggregate digest of a directory hashed
    /// non-verbosely. The two are indistinguishable on disk.
    Digest(String),
    /// A directory hashed verbosely.
    Node(VerboseNode),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerboseNode {
    pub contents: BTreeMap<String, HashEntry>,
    pub hash: String,
}

impl HashEntry {
    /// The digest string at this node.
    pub fn digest(&self) -> &str {
        match self {
            HashEntry::Digest(digest) => digest,
            HashEntry::Node(node) => &node.hash,
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, HashEntry::Node(_))
    }

    /// Child entry of a verbose node. Plain digests have no children.
    pub fn child(&self, name: &str) -> Option<&HashEntry> {
        match self {
            HashEntry::Digest(_) => None,
            HashEntry::Node(node) => node.contents.get(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    version: String,
    pub hashes: BTreeMap<String, HashEntry>,
}

impl Manifest {
    pub fn new(hashes: BTreeMap<String, HashEntry>) -> Self {
        Manifest {
            version: CURRENT_VERSION.to_string(),
            hashes,
        }
    }

    /// A one-entry manifest, used when the reference is a bare digest.
    pub fn single(name: &str, digest: &str) -> Self {
        let mut hashes = BTreeMap::new();
        hashes.insert(name.to_string(), HashEntry::Digest(digest.to_string()));
        Manifest::new(hashes)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Parse and validate manifest JSON.
    ///
    /// The version is checked before the entries so that a manifest written
    /// by a different format version reports `EINVER` rather than whatever
    /// shape error its entries would trigger.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(text).map_err(ManifestError::Syntax)?;

        let Value::Object(mut root) = value else {
            return Err(ManifestError::Invalid(
                "top level must be a JSON object".to_string(),
            ));
        };

        let version = match root.remove("version") {
            Some(Value::String(version)) => version,
            Some(_) => {
                return Err(ManifestError::Invalid(
                    "'version' must be a string".to_string(),
                ));
            }
            None => {
                return Err(ManifestError::Invalid(
                    "missing required field 'version'".to_string(),
                ));
            }
        };

        if version != CURRENT_VERSION {
            return Err(ManifestError::IncompatibleVersion(version));
        }

        let hashes = match root.remove("hashes") {
            Some(Value::Object(map)) => parse_contents(map, "")?,
            Some(_) => {
                return Err(ManifestError::Invalid(
                    "'hashes' must be an object".to_string(),
                ));
            }
            None => {
                return Err(ManifestError::Invalid(
                    "missing required field 'hashes'".to_string(),
                ));
            }
        };

        if let Some(unknown) = root.keys().next() {
            return Err(ManifestError::Invalid(format!(
                "unknown top-level field '{unknown}'"
            )));
        }

        Ok(Manifest { version, hashes })
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, ManifestError> {
        let content = fs.read_to_string(path)?;
        Self::parse(&content)
    }

    /// Save the manifest atomically.
    ///
    /// Writes to a temporary file, fsyncs it, then atomically renames it into place.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        use std::io::Write;

        let mut content = self.to_json()?;
        content.push('\n');

        let parent = path.parent().unwrap_or(Path::new("."));

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| FsError::from_io(parent, e))?;

        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| FsError::from_io(path, e))?;

        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| FsError::from_io(path, e))?;

        temp_file
            .persist(path)
            .map_err(|e| FsError::from_io(path, e.error))?;

        Ok(())
    }
}

fn parse_contents(
    map: Map<String, Value>,
    parent: &str,
) -> Result<BTreeMap<String, HashEntry>, ManifestError> {
    let mut entries = BTreeMap::new();
    for (name, value) in map {
        let at = if parent.is_empty() {
            name.clone()
        } else {
            format!("{parent}/{name}")
        };
        let entry = parse_entry(value, &at)?;
        entries.insert(name, entry);
    }
    Ok(entries)
}

fn parse_entry(value: Value, at: &str) -> Result<HashEntry, ManifestError> {
    match value {
        Value::String(digest) => Ok(HashEntry::Digest(digest)),
        Value::Object(mut map) => {
            let hash = match map.remove("hash") {
                Some(Value::String(hash)) => hash,
                _ => {
                    return Err(ManifestError::Invalid(format!(
                        "entry '{at}' needs a string 'hash'"
                    )));
                }
            };
            let contents = match map.remove("contents") {
                Some(Value::Object(contents)) => parse_contents(contents, at)?,
                _ => {
                    return Err(ManifestError::Invalid(format!(
                        "entry '{at}' needs an object 'contents'"
                    )));
                }
            };
            if let Some(unknown) = map.keys().next() {
                return Err(ManifestError::Invalid(format!(
                    "entry '{at}' has unknown field '{unknown}'"
                )));
            }
            Ok(HashEntry::Node(VerboseNode { contents, hash }))
        }
        _ => Err(ManifestError::Invalid(format!(
            "entry '{at}' must be a digest string or a {{hash, contents}} object"
        ))),
    }
}
