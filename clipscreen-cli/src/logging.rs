// ============================================================================
// clipscreen-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger initialization and run log files
//
// The core library logs through the `log` facade; this module installs
// env_logger as the backend. Records go to stderr and, when a log directory
// is given, are copied to a per-run log file as well.
//
// USAGE:
// - default: info
// - --verbose: debug
// - --log-level / CLIPSCREEN_LOG_LEVEL / RUST_LOG: any env_logger filter
//
// AI-ASSISTANT-INFO: Logging initialization and log file helpers

use std::fs::{self, File};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("clipscreen_run_{}.log", clipscreen_cli::logging::get_timestamp());
/// assert!(log_filename.starts_with("clipscreen_run_"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// File name of the log for a run started now.
pub fn run_log_file_name() -> String {
    format!("clipscreen_run_{}.log", get_timestamp())
}

/// Picks the filter string: verbose beats an explicit level, which beats
/// RUST_LOG.
pub fn resolve_filter(verbose: bool, log_level: Option<&str>) -> String {
    if verbose {
        return "debug".to_string();
    }
    log_level
        .map(str::to_string)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .filter(|filter| !filter.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

/// Writes every record to stderr and to the run log file.
struct TeeWriter {
    file: LineWriter<File>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Installs the global logger. Returns the path of the run log file when a
/// log directory was given.
pub fn init_logging(filter: &str, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        // HTTP client internals are noise at debug level
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper_util", LevelFilter::Warn)
        .filter_module("rustls", LevelFilter::Warn)
        .parse_filters(filter)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:<5}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        });

    let log_path = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create log directory '{}'", dir.display())
            })?;
            let path = dir.join(run_log_file_name());
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file '{}'", path.display()))?;
            builder
                .target(Target::Pipe(Box::new(TeeWriter {
                    file: LineWriter::new(file),
                })))
                .write_style(WriteStyle::Never);
            Some(path)
        }
        None => None,
    };

    builder
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_has_expected_shape() {
        let stamp = get_timestamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
        assert!(run_log_file_name().starts_with("clipscreen_run_"));
        assert!(run_log_file_name().ends_with(".log"));
    }

    #[test]
    fn verbose_overrides_explicit_level() {
        assert_eq!(resolve_filter(true, Some("warn")), "debug");
        assert_eq!(resolve_filter(false, Some("warn")), "warn");
    }
}
