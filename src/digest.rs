//! Digest algorithms, text encodings and the detection catalog.
//!
//! Every supported algorithm sits behind `Box<dyn DynDigest>` so the tree
//! builder can feed bytes without caring which one was selected. The catalog
//! order below is fixed: it is the default selection (first entry) and the
//! order in which detection tries candidates.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use digest::DynDigest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Lowercase hexadecimal.
    Hex,
    /// Standard alphabet with padding.
    Base64,
    /// One char per digest byte, U+0000..=U+00FF.
    Latin1,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownNameError {
    kind: &'static str,
    value: String,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
        }
    }

    /// Raw digest length in bytes.
    pub fn output_size(&self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha1 => 20,
            Algorithm::Sha224 => 28,
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 => 64,
        }
    }

    pub fn hasher(&self) -> Box<dyn DynDigest> {
        match self {
            Algorithm::Md5 => Box::new(md5::Md5::default()),
            Algorithm::Sha1 => Box::new(sha1::Sha1::default()),
            Algorithm::Sha224 => Box::new(sha2::Sha224::default()),
            Algorithm::Sha256 => Box::new(sha2::Sha256::default()),
            Algorithm::Sha384 => Box::new(sha2::Sha384::default()),
            Algorithm::Sha512 => Box::new(sha2::Sha512::default()),
        }
    }
}

impl Encoding {
    pub const ALL: [Encoding; 3] = [Encoding::Hex, Encoding::Base64, Encoding::Latin1];

    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
            Encoding::Latin1 => "latin1",
        }
    }

    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Encoding::Hex => hex::encode(bytes),
            Encoding::Base64 => STANDARD.encode(bytes),
            Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }

    /// Length in chars of an encoded digest of `size` raw bytes.
    pub fn encoded_len(&self, size: usize) -> usize {
        match self {
            Encoding::Hex => size * 2,
            Encoding::Base64 => size.div_ceil(3) * 4,
            Encoding::Latin1 => size,
        }
    }

    fn admits(&self, c: char) -> bool {
        match self {
            Encoding::Hex => c.is_ascii_digit() || ('a'..='f').contains(&c),
            Encoding::Base64 => c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='),
            Encoding::Latin1 => u32::from(c) <= 0xff,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownNameError {
                kind: "algorithm",
                value: s.to_string(),
            })
    }
}

impl FromStr for Encoding {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Encoding::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownNameError {
                kind: "encoding",
                value: s.to_string(),
            })
    }
}

/// An (algorithm, encoding) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CryptoOptions {
    pub algorithm: Algorithm,
    pub encoding: Encoding,
}

impl CryptoOptions {
    pub const fn new(algorithm: Algorithm, encoding: Encoding) -> Self {
        CryptoOptions {
            algorithm,
            encoding,
        }
    }

    /// Whether a digest string produced by this pair could look like `digest`.
    pub fn can_represent(&self, digest: &str) -> bool {
        let expected = self.encoding.encoded_len(self.algorithm.output_size());
        let mut count = 0;
        for c in digest.chars() {
            if !self.encoding.admits(c) {
                return false;
            }
            count += 1;
        }
        count == expected
    }

    pub fn hasher(&self) -> DigestBuilder {
        DigestBuilder {
            inner: self.algorithm.hasher(),
            encoding: self.encoding,
        }
    }

    /// One-shot digest of a byte buffer.
    pub fn digest(&self, bytes: &[u8]) -> String {
        let mut hasher = self.hasher();
        hasher.update(bytes);
        hasher.finish()
    }
}

impl Default for CryptoOptions {
    fn default() -> Self {
        CATALOG[0]
    }
}

impl fmt::Display for CryptoOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.algorithm, self.encoding)
    }
}

/// Incremental digest that yields an encoded string.
pub struct DigestBuilder {
    inner: Box<dyn DynDigest>,
    encoding: Encoding,
}

impl DigestBuilder {
    pub fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    pub fn finish(self) -> String {
        let raw = self.inner.finalize();
        self.encoding.encode(&raw)
    }
}

/// Every supported pair, algorithm-major.
pub const CATALOG: [CryptoOptions; 18] = {
    let mut catalog = [CryptoOptions::new(Algorithm::Md5, Encoding::Hex); 18];
    let mut a = 0;
    while a < Algorithm::ALL.len() {
        let mut e = 0;
        while e < Encoding::ALL.len() {
            catalog[a * Encoding::ALL.len() + e] =
                CryptoOptions::new(Algorithm::ALL[a], Encoding::ALL[e]);
            e += 1;
        }
        a += 1;
    }
    catalog
};

/// Catalog entries that could have produced `digest`, in catalog order.
pub fn candidates_for(digest: &str) -> impl Iterator<Item = CryptoOptions> + '_ {
    CATALOG.into_iter().filter(move |c| c.can_represent(digest))
}
