//! # Logger: Severity-Tagged Diagnostics
//!
//! Everything in tessera logs through the [`log`] facade. This module adds the
//! engine's severity model on top of it and installs the output backend.
//!
//! ## Output Format
//!
//! ```text
//! message(m)            →  m
//! warning(m, Medium)    →  WARNING: m
//!                          SEVERITY: Medium
//! error(m, High)        →  ERROR: m
//!                          SEVERITY: High
//! ```
//!
//! Lines carry no timestamp or level prefix, so a `debug.err` file reads the
//! same as the console.
//!
//! ## Severity
//!
//! | Severity | `warning`  | `error`                                  |
//! |----------|------------|------------------------------------------|
//! | Low      | logged     | logged                                   |
//! | Medium   | logged     | logged, then [`exit_requested`] is set   |
//! | High     | logged     | logged, flushed, then panics ([`fatal`]) |
//!
//! The game loop polls [`exit_requested`] between frames and shuts down
//! cleanly; a High error never returns.
//!
//! ## Backend
//!
//! [`init`] installs an `env_logger` with a bare `{message}` format writing to
//! stderr or to a file. `RUST_LOG` still narrows what is printed. If a logger
//! is already installed (tests, embedding applications) `init` keeps it.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

static EXIT_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogTarget {
    /// Standard error.
    #[default]
    Console,
    /// A file, truncated at start-up.
    File {
        #[serde(default = "default_log_path")]
        path: PathBuf,
    },
}

fn default_log_path() -> PathBuf {
    PathBuf::from("debug.err")
}

impl LogTarget {
    /// The conventional `debug.err` file in the working directory.
    pub fn debug_file() -> Self {
        LogTarget::File {
            path: default_log_path(),
        }
    }
}

/// How bad a warning or error is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => f.write_str("Low"),
            Severity::Medium => f.write_str("Medium"),
            Severity::High => f.write_str("High"),
        }
    }
}

/// Install the global logger writing to `target`.
///
/// Fails only if the log file cannot be created.
pub fn init(target: &LogTarget) -> std::io::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()));

    match target {
        LogTarget::Console => {
            builder.target(env_logger::Target::Stderr);
        }
        LogTarget::File { path } => {
            let file = std::fs::File::create(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already installed, keeping it");
    }
    Ok(())
}

pub fn format_warning(message: &str, severity: Severity) -> String {
    format!("WARNING: {message}\nSEVERITY: {severity}")
}

pub fn format_error(message: &str, severity: Severity) -> String {
    format!("ERROR: {message}\nSEVERITY: {severity}")
}

/// Plain informational line.
pub fn message(message: impl fmt::Display) {
    log::info!("{message}");
}

pub fn warning(message: impl fmt::Display, severity: Severity) {
    log::warn!("{}", format_warning(&message.to_string(), severity));
}

/// Report an error. Medium requests an exit, High is [`fatal`].
pub fn error(message: impl fmt::Display, severity: Severity) {
    match severity {
        Severity::Low => {
            log::error!("{}", format_error(&message.to_string(), severity));
        }
        Severity::Medium => {
            log::error!("{}", format_error(&message.to_string(), severity));
            request_exit();
        }
        Severity::High => fatal(message),
    }
}

/// Log a High severity error and abort the current thread of control.
pub fn fatal(message: impl fmt::Display) -> ! {
    let message = message.to_string();
    log::error!("{}", format_error(&message, Severity::High));
    log::logger().flush();
    request_exit();
    panic!("{message}");
}

pub fn request_exit() {
    EXIT_REQUESTED.store(true, Ordering::SeqCst);
}

/// Set by a Medium or High error; the game loop stops when it sees it.
pub fn exit_requested() -> bool {
    EXIT_REQUESTED.load(Ordering::SeqCst)
}

pub fn clear_exit_request() {
    EXIT_REQUESTED.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_format() {
        assert_eq!(
            format_warning("texture is not square", Severity::Low),
            "WARNING: texture is not square\nSEVERITY: Low"
        );
    }

    #[test]
    fn error_format() {
        assert_eq!(
            format_error("shader link failed", Severity::Medium),
            "ERROR: shader link failed\nSEVERITY: Medium"
        );
    }

    #[test]
    fn severities_are_ordered() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    #[should_panic(expected = "component missing")]
    fn high_error_is_fatal() {
        error("component missing", Severity::High);
    }

    #[test]
    fn medium_error_requests_exit() {
        error("window lost", Severity::Medium);
        assert!(exit_requested());
    }

    #[test]
    fn log_target_from_json() {
        let target: LogTarget = serde_json::from_str(r#"{ "kind": "file" }"#).unwrap();
        assert_eq!(target, LogTarget::debug_file());

        let target: LogTarget = serde_json::from_str(r#"{ "kind": "console" }"#).unwrap();
        assert_eq!(target, LogTarget::Console);
    }

    #[test]
    fn file_target_receives_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("debug.err");
        init(&LogTarget::File { path: path.clone() }).unwrap();

        message("tessera-file-target-marker");
        log::logger().flush();

        // Another test may have installed the logger first; only check the
        // file when ours won.
        let contents = std::fs::read_to_string(&path).unwrap();
        if !contents.is_empty() {
            assert!(contents.contains("tessera-file-target-marker\n"));
        }
    }
}
