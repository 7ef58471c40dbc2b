//! Logging setup using the `log` facade and `env_logger` backend.
//!
//! Level selection, in priority order:
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (errors only) or `-v`/`-vv` (debug/trace)
//! 3. Default: info
//!
//! Debug builds include timestamp and module path in each line; release
//! builds use a compact `level: message` format.

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initialize logging from CLI verbosity flags.
///
/// Safe to call more than once; later calls are no-ops (the first installed
/// logger wins), which keeps integration tests that drive the full app from
/// panicking.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    configure_format(&mut builder);

    let _ = builder.try_init();
}

/// Map CLI flags to a log level.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn configure_format(builder: &mut Builder) {
    if cfg!(debug_assertions) {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.module_path().unwrap_or("?"),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_wins() {
        assert_eq!(determine_level(0, true), LevelFilter::Error);
        assert_eq!(determine_level(2, true), LevelFilter::Error);
    }

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(determine_level(0, false), LevelFilter::Info);
        assert_eq!(determine_level(1, false), LevelFilter::Debug);
        assert_eq!(determine_level(2, false), LevelFilter::Trace);
        assert_eq!(determine_level(7, false), LevelFilter::Trace);
    }

    #[test]
    fn test_init_logging_is_reentrant() {
        init_logging(0, false);
        init_logging(1, true);
    }
}
