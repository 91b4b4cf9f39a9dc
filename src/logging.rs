//! Structured JSONL logging with human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.snapkey/logs/snapkey.jsonl) - structured for later inspection
//! - **Compact to stderr** - human-readable while the daemon runs in a console
//!
//! # Usage
//!
//! ```rust,ignore
//! use snapkey::{config, logging};
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let config = config::load_config();
//! let _guard = logging::init(&config.get_log_filter());
//!
//! tracing::info!(position = "top_left", "window snapped");
//! ```
//!
//! # JSONL Output Format
//!
//! Each line is a valid JSON object:
//! ```json
//! {"timestamp":"2025-03-02T10:30:45.123Z","level":"INFO","target":"snapkey::arranger","fields":{"message":"window snapped","position":"top_left"}}
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// `default_filter` is used when RUST_LOG is not set; it normally comes from
/// the config file via [`crate::config::Config::get_log_filter`].
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// Dropping the guard will flush remaining logs and close the file.
pub fn init(default_filter: &str) -> LoggingGuard {
    // Create log directory
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join("snapkey.jsonl");

    // Print log location for discoverability
    eprintln!("========================================");
    eprintln!("[SNAPKEY] JSONL log: {}", log_path.display());
    eprintln!("[SNAPKEY] Compact logs: stderr");
    eprintln!("========================================");

    // Open log file with append mode; if that fails the file layer writes to
    // a sink so the stderr layer still works.
    let writer: Box<dyn Write + Send> = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            Box::new(std::io::sink())
        }
    };

    // Create non-blocking writer for file (keeps the hook thread off disk I/O)
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(writer);

    // Environment filter - RUST_LOG wins, then the configured default
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.to_string()));

    // JSONL layer for file output
    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    // Compact layer for stderr (human developers)
    let compact_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    // Initialize the subscriber with both layers
    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(compact_layer)
        .init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Initialize stderr-only logging for one-shot CLI commands.
///
/// No log file and no banner, so command output stays clean. Warnings from
/// the shortcuts store (malformed lines, unreadable files) still reach the
/// user on stderr.
pub fn init_cli() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

/// Get the log directory path (~/.snapkey/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".snapkey").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("snapkey-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join("snapkey.jsonl")
}
