//! Per-directory defaults read from `.treeseal.toml`.
//!
//! ```toml
//! algorithm = "sha256"
//! encoding = "base64"
//! exclude = ["target", ".git"]
//! verbose = false
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the file.

use crate::digest::{Algorithm, CryptoOptions, Encoding};
use crate::fs::{FileSystem, FsError};
use crate::tree::HashOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILENAME: &str = ".treeseal.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("EFS: {0}")]
    Fs(#[from] FsError),
    #[error("EVALER: Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub algorithm: Option<Algorithm>,
    pub encoding: Option<Encoding>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub verbose: Option<bool>,
}

/// Hashing choices given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub algorithm: Option<Algorithm>,
    pub encoding: Option<Encoding>,
    pub exclude: Vec<String>,
    pub compact: bool,
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read `dir/.treeseal.toml`. A missing file is an empty configuration.
    pub fn load(fs: &dyn FileSystem, dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILENAME);
        if !fs.exists(&path) {
            return Ok(Config::default());
        }

        let text = fs.read_to_string(&path)?;
        let config = Config::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Combine with command-line flags. Exclusions from both sides apply.
    pub fn hash_options(&self, overrides: &Overrides) -> HashOptions {
        let defaults = CryptoOptions::default();
        let crypto = CryptoOptions::new(
            overrides
                .algorithm
                .or(self.algorithm)
                .unwrap_or(defaults.algorithm),
            overrides
                .encoding
                .or(self.encoding)
                .unwrap_or(defaults.encoding),
        );

        let verbose = !overrides.compact && self.verbose.unwrap_or(true);

        HashOptions {
            crypto,
            exclude: self
                .exclude
                .iter()
                .chain(&overrides.exclude)
                .cloned()
                .collect(),
            verbose,
        }
    }
}
