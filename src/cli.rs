//! Command-line interface definitions.
//!
//! All arguments use the clap derive API, with global options (verbosity,
//! quiet, JSON errors) and one subcommand per operation.
//!
//! # Example
//!
//! ```bash
//! # Incrementally index a tree
//! hashkeep scan ~/photos
//!
//! # Re-hash everything, restricted to two extensions
//! hashkeep scan ~/photos --force --ext jpg --ext png
//!
//! # Query the inventory
//! hashkeep dupes
//! hashkeep stats
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Persistent content-addressed file inventory.
///
/// Hashkeep records a BLAKE3 digest, size and mtime for every file under a
/// tree and skips re-hashing files whose metadata is unchanged, so repeated
/// scans only pay for what actually changed.
#[derive(Debug, Parser)]
#[command(name = "hashkeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory tree and update the inventory
    Scan(ScanArgs),
    /// List groups of files with identical content
    Dupes(DupesArgs),
    /// Show aggregate inventory statistics
    Stats(StatsArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Root directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Re-hash every file, ignoring stored size/mtime
    #[arg(short, long)]
    pub force: bool,

    /// Only scan files with these extensions (case-insensitive, repeatable)
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Path to the record database (default: platform data directory)
    #[arg(long, value_name = "PATH", env = "HASHKEEP_DB")]
    pub db: Option<PathBuf>,

    /// Records per durability flush
    #[arg(long, value_name = "N", default_value = "512")]
    pub flush_every: usize,

    /// Mtime comparison tolerance in seconds
    ///
    /// Absorbs timestamp rounding across filesystems. Changing this changes
    /// staleness semantics for the existing store.
    #[arg(long, value_name = "SECONDS", default_value = "1.0")]
    pub mtime_tolerance: f64,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the dupes subcommand.
#[derive(Debug, Args)]
pub struct DupesArgs {
    /// Path to the record database (default: platform data directory)
    #[arg(long, value_name = "PATH", env = "HASHKEEP_DB")]
    pub db: Option<PathBuf>,

    /// Show at most this many groups
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

/// Arguments for the stats subcommand.
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Path to the record database (default: platform data directory)
    #[arg(long, value_name = "PATH", env = "HASHKEEP_DB")]
    pub db: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_args_parse() {
        let cli = Cli::try_parse_from([
            "hashkeep", "scan", "/data", "--force", "--ext", "jpg", "--ext", "png",
        ])
        .unwrap();

        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.path, PathBuf::from("/data"));
                assert!(args.force);
                assert_eq!(args.extensions, vec!["jpg", "png"]);
                assert_eq!(args.flush_every, 512);
                assert_eq!(args.mtime_tolerance, 1.0);
            }
            _ => panic!("expected scan subcommand"),
        }
    }

    #[test]
    fn test_scan_requires_path() {
        assert!(Cli::try_parse_from(["hashkeep", "scan"]).is_err());
    }

    #[test]
    fn test_dupes_limit() {
        let cli = Cli::try_parse_from(["hashkeep", "dupes", "--limit", "5"]).unwrap();
        match cli.command {
            Commands::Dupes(args) => assert_eq!(args.limit, Some(5)),
            _ => panic!("expected dupes subcommand"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["hashkeep", "-q", "-v", "stats"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["hashkeep", "stats", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
