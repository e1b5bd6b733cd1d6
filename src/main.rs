mod cli;

use anyhow::{Context, anyhow, bail};
use cli::{Cli, Command};
use std::fmt as stdfmt;
use std::io::{IsTerminal, stderr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Event, Level, Subscriber, error, info, warn};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use treeseal::config::Config;
use treeseal::fs::{FileSystem, LocalFs, PathKind};
use treeseal::manifest::MANIFEST_FILENAME;
use treeseal::{HashOptions, Manifest, check, create};

struct SealExitCode;

impl SealExitCode {
    /// Exit code used when the integrity check fails.
    fn check_failed() -> ExitCode {
        ExitCode::from(1)
    }

    /// Exit code used for other errors (I/O errors, invalid manifests, etc.).
    fn any_error() -> ExitCode {
        ExitCode::from(255)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_level);

    // Change working directory if -C was specified
    if let Some(directory) = cli.directory
        && let Err(e) = std::env::set_current_dir(&directory)
    {
        error!(
            "Failed to change directory to {}: {}",
            directory.display(),
            e
        );
        return SealExitCode::any_error();
    }

    let config = match Config::load(&LocalFs, Path::new(".")) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return SealExitCode::any_error();
        }
    };

    let result: anyhow::Result<ExitCode> = match cli.command {
        Command::Create {
            path,
            hashing,
            write,
            force,
        } => handle_create(
            &path,
            &config.hash_options(&hashing.overrides()),
            write,
            force,
        ),
        Command::Check {
            path,
            integrity,
            hashing,
            detect,
        } => handle_check(
            &path,
            integrity,
            &config.hash_options(&hashing.overrides()),
            detect,
        ),
    };

    match result {
        Ok(exit_code) => exit_code,
        Err(err) => {
            error!("{err:#}");
            SealExitCode::any_error()
        }
    }
}

fn handle_create(
    path: &Path,
    options: &HashOptions,
    write: bool,
    force: bool,
) -> anyhow::Result<ExitCode> {
    let manifest = create(&LocalFs, path, options)?;

    if !write {
        println!("{}", manifest.to_json()?);
        return Ok(ExitCode::SUCCESS);
    }

    let target = manifest_dir(path)?.join(MANIFEST_FILENAME);
    if !force && !records_same_entries(&target, &manifest) {
        bail!(
            "Refusing to replace {}, which was not created for {} (use --force to overwrite)",
            target.display(),
            path.display()
        );
    }
    manifest
        .save(&target)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    info!("Wrote {}", target.display());

    Ok(ExitCode::SUCCESS)
}

fn handle_check(
    path: &Path,
    integrity: Option<String>,
    options: &HashOptions,
    detect: bool,
) -> anyhow::Result<ExitCode> {
    let input = path
        .to_str()
        .ok_or_else(|| anyhow!("Path is not valid UTF-8: {}", path.display()))?;

    // Without a reference, search for a manifest from the input upward.
    let integrity = match integrity {
        Some(integrity) => integrity,
        None => manifest_dir(path)
            .unwrap_or_else(|_| PathBuf::from("."))
            .to_str()
            .ok_or_else(|| anyhow!("Path is not valid UTF-8: {}", path.display()))?
            .to_string(),
    };

    if check(&LocalFs, input, &integrity, Some(options), detect)? {
        info!("Integrity check passed: {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    error!("Integrity check failed: {}", path.display());
    Ok(SealExitCode::check_failed())
}

/// Whether writing `manifest` to `target` keeps the entries already recorded
/// there. A missing target is trivially fine; an unreadable one is not.
fn records_same_entries(target: &Path, manifest: &Manifest) -> bool {
    if !LocalFs.exists(target) {
        return true;
    }
    match Manifest::load(&LocalFs, target) {
        Ok(existing) => existing.hashes.keys().eq(manifest.hashes.keys()),
        Err(e) => {
            warn!("Existing {} is not a usable manifest: {e}", target.display());
            false
        }
    }
}

/// The directory a manifest for `path` lives in: `path` itself for a
/// directory, its parent otherwise.
fn manifest_dir(path: &Path) -> anyhow::Result<PathBuf> {
    if LocalFs.kind(path)? == PathKind::Directory {
        return Ok(path.to_path_buf());
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        _ => Ok(PathBuf::from(".")),
    }
}

fn init_tracing(verbose: u8, log_level: Option<Level>) {
    let stderr_is_terminal = stderr().is_terminal();
    let formatter = EmojiFormatter { stderr_is_terminal };

    let filter = match (log_level, verbose) {
        (Some(level), _) => EnvFilter::new(level.as_str().to_ascii_lowercase()),
        (None, 0) => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        }
        (None, 1) => EnvFilter::new("info"),
        (None, _) => EnvFilter::new("debug"),
    };

    let fmt_layer = tracing_fmt::layer()
        .event_format(formatter)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

struct EmojiFormatter {
    stderr_is_terminal: bool,
}

impl<S, N> FormatEvent<S, N> for EmojiFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        if self.stderr_is_terminal {
            match *event.metadata().level() {
                Level::DEBUG => write!(writer, "🔍 ")?,
                Level::INFO => write!(writer, "ℹ️ ")?,
                Level::WARN => write!(writer, "⚠️  ")?,
                Level::ERROR => write!(writer, "❌️ ")?,
                _ => {}
            }
        } else {
            match *event.metadata().level() {
                Level::DEBUG => writer.write_str("DEBUG: ")?,
                Level::INFO => writer.write_str("INFO: ")?,
                Level::WARN => writer.write_str("WARN: ")?,
                Level::ERROR => writer.write_str("ERROR: ")?,
                _ => {}
            }
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
