//! Algorithm/encoding detection.
//!
//! Given a recorded entry and no idea which algorithm and encoding produced
//! it, rebuild the tree with each catalog candidate until one reproduces the
//! recorded digest. Candidates are limited to those whose output could look
//! like the recorded digest (length and alphabet), tried in catalog order,
//! and the first match wins. Two candidates producing the same string for
//! the same content would be ambiguous; the earlier one is reported.

use crate::check::entries_match;
use crate::digest::{CryptoOptions, candidates_for};
use crate::fs::FileSystem;
use crate::manifest::HashEntry;
use crate::tree::{HashOptions, build_entry};
use std::fmt::Display;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionOutcome {
    /// The pair that reproduced the reference, if any.
    pub candidate: Option<CryptoOptions>,
    /// Number of rebuilds performed.
    pub attempts: usize,
}

impl DetectionOutcome {
    pub fn matched(&self) -> bool {
        self.candidate.is_some()
    }
}

/// Detect which pair produced `reference` for the tree at `input`.
///
/// Each rebuild uses the exclusions of `options` and mirrors the verbosity of
/// `reference`; the algorithm and encoding of `options` are ignored.
pub fn detect(
    fs: &dyn FileSystem,
    input: &Path,
    reference: &HashEntry,
    options: &HashOptions,
) -> DetectionOutcome {
    let verbose = reference.is_verbose();
    detect_with(reference, |crypto| {
        build_entry(fs, input, &options.with_candidate(crypto, verbose))
    })
}

/// Candidate search with the rebuild step supplied by the caller.
///
/// A rebuild that fails counts as a non-match and the search moves on.
pub fn detect_with<F, E>(reference: &HashEntry, mut rebuild: F) -> DetectionOutcome
where
    F: FnMut(CryptoOptions) -> Result<HashEntry, E>,
    E: Display,
{
    let mut outcome = DetectionOutcome::default();
    let mut candidates = candidates_for(reference.digest()).peekable();

    if candidates.peek().is_none() {
        debug!(
            "Reference digest {:?} cannot come from any supported algorithm/encoding",
            reference.digest()
        );
        return outcome;
    }

    for crypto in candidates {
        outcome.attempts += 1;
        match rebuild(crypto) {
            Ok(fresh) if entries_match(reference, &fresh) => {
                info!("Detected {crypto} after {} attempt(s)", outcome.attempts);
                outcome.candidate = Some(crypto);
                return outcome;
            }
            Ok(_) => debug!("Candidate {crypto} does not match"),
            Err(e) => debug!("Candidate {crypto} failed: {e}"),
        }
    }

    info!("No candidate matched after {} attempt(s)", outcome.attempts);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{Algorithm, CATALOG, Encoding};
    use crate::fs::memory::MemoryFs;
    use crate::manifest::VerboseNode;
    use std::collections::BTreeMap;

    const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";

    fn sample_tree() -> MemoryFs {
        let mut memfs = MemoryFs::new();
        memfs
            .add_file("/root/a.txt", "a")
            .add_file("/root/sub/b.txt", "b")
            .add_file("/root/skip.txt", "skipped");
        memfs
    }

    #[test]
    fn test_every_catalog_pair_is_detected() {
        let memfs = sample_tree();
        for crypto in CATALOG {
            for verbose in [false, true] {
                let options = HashOptions {
                    crypto,
                    verbose,
                    ..HashOptions::default()
                };
                let reference = build_entry(&memfs, Path::new("/root"), &options).unwrap();

                let outcome = detect(
                    &memfs,
                    Path::new("/root"),
                    &reference,
                    &HashOptions::default(),
                );

                assert_eq!(outcome.candidate, Some(crypto), "verbose: {verbose}");
            }
        }
    }

    #[test]
    fn test_exclusions_are_preserved() {
        let memfs = sample_tree();
        let mut options = HashOptions::default();
        options.exclude.insert("skip.txt".to_string());
        let reference = build_entry(&memfs, Path::new("/root"), &options).unwrap();

        assert!(detect(&memfs, Path::new("/root"), &reference, &options).matched());
        assert!(!detect(&memfs, Path::new("/root"), &reference, &HashOptions::default()).matched());
    }

    #[test]
    fn test_stops_at_first_match() {
        let reference = HashEntry::Digest(HELLO_MD5.to_string());
        let mut calls = Vec::new();

        let outcome = detect_with(&reference, |crypto| {
            calls.push(crypto);
            Ok::<_, String>(HashEntry::Digest(crypto.digest(b"hello")))
        });

        assert_eq!(calls, vec![CryptoOptions::new(Algorithm::Md5, Encoding::Hex)]);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(
            outcome.candidate,
            Some(CryptoOptions::new(Algorithm::Md5, Encoding::Hex))
        );
    }

    #[test]
    fn test_failing_candidate_is_skipped() {
        // 32 hex chars: md5/hex first, then sha256/latin1.
        let reference = HashEntry::Digest(HELLO_MD5.to_string());

        let outcome = detect_with(&reference, |crypto| {
            if crypto.algorithm == Algorithm::Md5 {
                Err("transient failure")
            } else {
                Ok(HashEntry::Digest(HELLO_MD5.to_string()))
            }
        });

        assert_eq!(outcome.attempts, 2);
        assert_eq!(
            outcome.candidate,
            Some(CryptoOptions::new(Algorithm::Sha256, Encoding::Latin1))
        );
    }

    #[test]
    fn test_empty_fresh_digest_is_not_a_match() {
        let reference = HashEntry::Digest(HELLO_MD5.to_string());

        let outcome = detect_with(&reference, |_| Ok::<_, String>(HashEntry::Digest(String::new())));

        assert!(!outcome.matched());
        assert_eq!(outcome.attempts, 2);
    }

    #[test]
    fn test_all_failures_exhaust_catalog() {
        let reference = HashEntry::Digest(HELLO_MD5.to_string());

        let outcome = detect_with(&reference, |_| Err::<HashEntry, _>("boom"));

        assert_eq!(outcome, DetectionOutcome { candidate: None, attempts: 2 });
    }

    #[test]
    fn test_unrepresentable_digest_is_rejected_without_rebuilding() {
        for digest in ["12A468C211G95", "\u{010A},F2\u{ab}+{@/=", ""] {
            let reference = HashEntry::Digest(digest.to_string());
            let mut called = false;

            let outcome = detect_with(&reference, |_| {
                called = true;
                Err::<HashEntry, _>("unreachable")
            });

            assert!(!called, "rebuilt for {digest:?}");
            assert_eq!(outcome.attempts, 0);
        }
    }

    #[test]
    fn test_verbosity_is_mirrored_from_reference() {
        let memfs = sample_tree();
        let compact = HashOptions {
            verbose: false,
            ..HashOptions::default()
        };
        let digest = build_entry(&memfs, Path::new("/root"), &compact)
            .unwrap()
            .digest()
            .to_string();

        // Same aggregate, recorded both ways.
        let plain = HashEntry::Digest(digest.clone());
        let verbose = HashEntry::Node(VerboseNode {
            contents: BTreeMap::new(),
            hash: digest.clone(),
        });
        let mut wrong_child = VerboseNode {
            contents: BTreeMap::new(),
            hash: digest,
        };
        wrong_child
            .contents
            .insert("a.txt".to_string(), HashEntry::Digest("0".repeat(32)));

        let options = HashOptions::default();
        assert!(detect(&memfs, Path::new("/root"), &plain, &options).matched());
        assert!(detect(&memfs, Path::new("/root"), &verbose, &options).matched());
        assert!(!detect(&memfs, Path::new("/root"), &HashEntry::Node(wrong_child), &options).matched());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let memfs = sample_tree();
        let options = HashOptions {
            crypto: CryptoOptions::new(Algorithm::Sha384, Encoding::Base64),
            ..HashOptions::default()
        };
        let reference = build_entry(&memfs, Path::new("/root"), &options).unwrap();

        let first = detect(&memfs, Path::new("/root"), &reference, &HashOptions::default());
        let second = detect(&memfs, Path::new("/root"), &reference, &HashOptions::default());

        assert_eq!(first, second);
        assert_eq!(first.attempts, 1);
    }
}
