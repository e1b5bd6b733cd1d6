//! Content-integrity manifests for files and directory trees.
//!
//! [`tree::create`] hashes a path into a [`manifest::Manifest`];
//! [`check::check`] verifies a path against a manifest file, a directory
//! holding one, manifest JSON or a bare digest, optionally detecting which
//! algorithm and encoding produced it.

pub mod check;
pub mod config;
pub mod detect;
pub mod digest;
pub mod fs;
pub mod manifest;
pub mod reference;
pub mod resolve;
pub mod tree;

pub use crate::check::{CheckError, check};
pub use crate::digest::{Algorithm, CryptoOptions, Encoding};
pub use crate::manifest::{HashEntry, Manifest};
pub use crate::tree::{HashOptions, create};
