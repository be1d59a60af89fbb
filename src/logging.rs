//! Tracing setup.
//!
//! The interactive client owns the terminal, so its log lines go to a file.
//! Headless runs print the report on stdout and send log lines to stderr.
//! `RUST_LOG` overrides the default filter in both cases.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset. HTTP client internals stay quiet.
const DEFAULT_FILTER: &str = "querydeck=info,warn";

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// Truncated at startup.
    File(PathBuf),
    Stderr,
}

impl LogSink {
    /// Picks the sink for a run mode.
    pub fn for_mode(headless: bool) -> Self {
        if headless {
            Self::Stderr
        } else {
            Self::File(log_path())
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber.
///
/// A log file that cannot be created leaves logging disabled with a warning
/// on stderr; the client still runs.
pub fn init(sink: &LogSink) {
    match sink {
        LogSink::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(io::stderr)
            .init(),
        LogSink::File(path) => match open_log_file(path) {
            Ok(file) => tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(file)
                .with_ansi(false)
                .init(),
            Err(e) => eprintln!("Warning: logging disabled, {}: {e}", path.display()),
        },
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// `querydeck/querydeck.log` under the state directory, falling back to
/// the config directory and then the temp directory.
pub fn log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("querydeck").join("querydeck.log"))
        .unwrap_or_else(|| std::env::temp_dir().join("querydeck.log"))
}
