use assert_cmd::{Command, cargo::cargo_bin_cmd};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// md5/hex of "hello".
#[allow(dead_code)]
pub const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";
/// md5/hex aggregate of a directory holding only `file.txt` = "hello".
#[allow(dead_code)]
pub const PROJECT_MD5: &str = "367e5c23335f8d281421fce9401293c4";

pub fn treeseal_cmd(cwd: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("treeseal");
    cmd.arg("-C").arg(cwd);
    cmd
}

/// A temp dir holding `project/file.txt` = "hello".
pub fn temp_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("project")).unwrap();
    fs::write(temp.path().join("project/file.txt"), "hello").unwrap();
    temp
}

// Each integration test file is compiled as its own crate, and not all of
// them seal the project before running.
#[allow(dead_code)]
pub fn seal_project(cwd: &Path, args: &[&str]) {
    treeseal_cmd(cwd)
        .arg("create")
        .arg("project")
        .arg("--write")
        .args(args)
        .assert()
        .success();
}

// Permission tests are meaningless when running as root.
#[cfg(unix)]
#[allow(dead_code)]
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}
