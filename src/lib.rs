//! Hashkeep - persistent content-addressed file inventory.
//!
//! Records a BLAKE3 digest, size, and mtime for every file under a tree in
//! a SQLite-backed store, re-hashing only files whose metadata changed since
//! the last pass. Secondary queries group identical content and report
//! aggregate statistics.

pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod logging;
pub mod policy;
pub mod progress;
pub mod scan;
pub mod signal;
pub mod store;
pub mod walker;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bytesize::ByteSize;

use cli::{Cli, Commands, DupesArgs, ScanArgs, StatsArgs};
use config::ScanSettings;
use error::ExitCode;
use progress::Progress;
use scan::Scanner;
use store::RecordStore;
use walker::Walker;

/// Run the application logic for the parsed command line.
///
/// Returns the exit code to report; `Err` means a fatal failure that the
/// binary maps to [`ExitCode::GeneralError`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Scan(args) => run_scan(args, cli.quiet),
        Commands::Dupes(args) => run_dupes(args),
        Commands::Stats(args) => run_stats(args),
    }
}

fn open_store_at(db: Option<PathBuf>) -> Result<(RecordStore, PathBuf)> {
    let db_path = match db {
        Some(path) => path,
        None => config::default_store_path()?,
    };
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let store = RecordStore::open(&db_path)?;
    Ok((store, db_path))
}

fn run_scan(args: ScanArgs, quiet: bool) -> Result<ExitCode> {
    let root = fs::canonicalize(&args.path)
        .with_context(|| format!("Cannot access {}", args.path.display()))?;
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let (store, db_path) = open_store_at(args.db)?;
    log::info!("Scanning {} (store: {})", root.display(), db_path.display());

    let settings = ScanSettings::default()
        .with_force(args.force)
        .with_mtime_tolerance(args.mtime_tolerance)
        .with_flush_every(args.flush_every);

    let mut scanner = Scanner::new(store, settings);

    // A second handler registration fails (e.g. in tests); the scan then
    // simply runs without graceful interruption.
    match signal::install_handler() {
        Ok(handler) => scanner = scanner.with_shutdown_flag(handler.get_flag()),
        Err(e) => log::debug!("Signal handler not installed: {}", e),
    }

    if !args.no_progress {
        scanner = scanner.with_progress(Arc::new(Progress::new(quiet)));
    }

    let walker = Walker::new(&root).with_extensions(&args.extensions);
    let summary = scanner.run(walker.walk())?;

    if !quiet {
        println!(
            "Scanned {} files in {:.1}s: {} hashed ({}), {} unchanged, {} errors",
            summary.snapshot().total(),
            summary.elapsed.as_secs_f64(),
            summary.processed,
            ByteSize(summary.bytes),
            summary.skipped,
            summary.errors,
        );
        if summary.interrupted {
            println!("Interrupted: remaining files were not visited this run.");
        }
    }

    Ok(if summary.interrupted {
        ExitCode::Interrupted
    } else if summary.errors > 0 {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    })
}

fn run_dupes(args: DupesArgs) -> Result<ExitCode> {
    let (mut store, _) = open_store_at(args.db)?;
    let groups = store.group_by_digest()?;

    if groups.is_empty() {
        println!("No duplicate content recorded.");
        return Ok(ExitCode::Success);
    }

    let shown = args.limit.unwrap_or(groups.len()).min(groups.len());
    for group in &groups[..shown] {
        println!("{} ({} files)", group.digest, group.paths.len());
        for path in &group.paths {
            println!("  {}", path);
        }
    }
    if shown < groups.len() {
        println!("... and {} more groups", groups.len() - shown);
    }

    Ok(ExitCode::Success)
}

fn run_stats(args: StatsArgs) -> Result<ExitCode> {
    let (mut store, db_path) = open_store_at(args.db)?;
    let stats = store.stats()?;

    println!("Store:            {}", db_path.display());
    println!("Files recorded:   {}", stats.total_records);
    println!("Distinct digests: {}", stats.distinct_digests);
    println!("Duplicate files:  {}", stats.duplicates());
    println!("Total size:       {}", ByteSize(stats.total_bytes));

    Ok(ExitCode::Success)
}
