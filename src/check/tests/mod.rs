use super::*;
use crate::digest::{Algorithm, CryptoOptions, Encoding};
use crate::fs::LocalFs;
use crate::fs::memory::MemoryFs;
use crate::manifest::MANIFEST_FILENAME;
use crate::tree::create;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// md5/hex digest of `fileToHash.txt` ("hello").
const FILE_DIGEST: &str = "5d41402abc4b2a76b9719d911017c592";
/// Aggregate md5/hex digest of the fixtures root.
const ROOT_DIGEST: &str = "94fa16e888e98896e4127c191b156820";
/// Aggregate md5/hex digest of `fixtures/directory`.
const DIRECTORY_DIGEST: &str = "54f5fbf0ac0ff66d3b3a3397a58ac57c";
/// Aggregate md5/hex digest of `fixtures/fixtures`.
const SUB_FIXTURES_DIGEST: &str = "f7ee925566e81c38ec1833738ecc5dc9";

/// On-disk layout:
///
/// ```text
/// fixtures/
///   .integrity.json                  verbose manifest of fixtures/
///   fileToHash.txt                   "hello"
///   directory/anotherFileToHash.txt  "another"
///   fixtures/
///     .integrity.json                verbose manifest of fixtures/fixtures/
///     fileToHash.txt                 "nested"
///     directory/
///       .integrity.json              verbose manifest of fixtures/fixtures/directory/
///       anotherFileToHash.txt        "nested another"
/// ```
struct Fixtures {
    _temp: TempDir,
    root: PathBuf,
}

impl Fixtures {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("fixtures");

        fs::create_dir_all(root.join("directory")).unwrap();
        fs::create_dir_all(root.join("fixtures/directory")).unwrap();
        fs::write(root.join("fileToHash.txt"), "hello").unwrap();
        fs::write(root.join("directory/anotherFileToHash.txt"), "another").unwrap();
        fs::write(root.join("fixtures/fileToHash.txt"), "nested").unwrap();
        fs::write(
            root.join("fixtures/directory/anotherFileToHash.txt"),
            "nested another",
        )
        .unwrap();

        let root = root.canonicalize().unwrap();
        for dir in [
            root.join("fixtures/directory"),
            root.join("fixtures"),
            root.clone(),
        ] {
            let manifest = create(&LocalFs, &dir, &HashOptions::default()).unwrap();
            manifest.save(&dir.join(MANIFEST_FILENAME)).unwrap();
        }

        Fixtures { _temp: temp, root }
    }

    fn path(&self, relative: &str) -> String {
        if relative.is_empty() {
            return self.root.to_str().unwrap().to_string();
        }
        self.root.join(relative).to_str().unwrap().to_string()
    }

    fn manifest(&self, relative_dir: &str) -> String {
        if relative_dir.is_empty() {
            return self.path(MANIFEST_FILENAME);
        }
        self.path(&format!("{relative_dir}/{MANIFEST_FILENAME}"))
    }

    fn write_root_manifest(&self, content: &str) {
        fs::write(self.manifest(""), content).unwrap();
    }
}

fn compact() -> HashOptions {
    HashOptions {
        verbose: false,
        ..HashOptions::default()
    }
}

fn check_local(input: &str, integrity: &str, options: Option<&HashOptions>) -> bool {
    check(&LocalFs, input, integrity, options, false).unwrap()
}

fn detect_local(input: &str, integrity: &str, options: Option<&HashOptions>) -> bool {
    check(&LocalFs, input, integrity, options, true).unwrap()
}
