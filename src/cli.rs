mod help_text;

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use treeseal::config::Overrides;
use treeseal::digest::{Algorithm, Encoding};

/// Compute and verify content-integrity manifests
#[derive(Parser, Debug)]
#[command(name = "treeseal", version, about, long_about = help_text::ROOT_LONG_ABOUT)]
pub struct Cli {
    /// Change to DIRECTORY before doing anything
    #[arg(short = 'C', value_name = "DIRECTORY", global = true)]
    pub directory: Option<PathBuf>,

    /// Increase logging (-v info, -vv debug). Takes precedence over RUST_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Set the log level explicitly. Takes precedence over RUST_LOG.
    #[arg(
        long,
        value_name = "LEVEL",
        global = true,
        conflicts_with = "verbose"
    )]
    pub log_level: Option<Level>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Hash a file or directory into a manifest
    #[command(long_about = help_text::CREATE_LONG_ABOUT)]
    Create {
        /// File or directory to hash
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        hashing: HashingArgs,

        /// Write .integrity.json instead of printing the manifest
        #[arg(long)]
        write: bool,

        /// Replace an existing .integrity.json that records other entries
        #[arg(long, requires = "write")]
        force: bool,
    },

    /// Verify a file or directory against a manifest or digest
    #[command(long_about = help_text::CHECK_LONG_ABOUT)]
    Check {
        /// File or directory to verify
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Manifest file, directory, manifest JSON or digest to verify against
        /// (default: nearest .integrity.json above PATH)
        #[arg(short, long, value_name = "REF")]
        integrity: Option<String>,

        #[command(flatten)]
        hashing: HashingArgs,

        /// Find the algorithm and encoding that produced the reference
        #[arg(long)]
        detect: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct HashingArgs {
    /// Digest algorithm (md5, sha1, sha224, sha256, sha384, sha512)
    #[arg(short, long, value_name = "ALG")]
    pub algorithm: Option<Algorithm>,

    /// Digest encoding (hex, base64, latin1)
    #[arg(short, long, value_name = "ENC")]
    pub encoding: Option<Encoding>,

    /// Leave out entries with this name, or this path relative to PATH
    #[arg(short = 'x', long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Record directories by aggregate digest only
    #[arg(long)]
    pub compact: bool,
}

impl HashingArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            algorithm: self.algorithm,
            encoding: self.encoding,
            exclude: self.exclude.clone(),
            compact: self.compact,
        }
    }
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
