//! Structured JSONL logging to file and human-readable stderr output.
//!
//! - **JSONL to file** (`<data_local_dir>/copypaste/logs/copypaste.jsonl`)
//! - **Compact to stderr** for developers
//!
//! # Usage
//!
//! ```rust,ignore
//! use copypaste_core::logging;
//!
//! // Keep the guard alive for the duration of the program
//! let _guard = logging::init();
//!
//! tracing::info!(entry_id = %id, app = %app, "Clipboard entry added");
//! ```
//!
//! Clipboard payloads are never logged; use [`content_fingerprint`] to refer
//! to a piece of content in log fields.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "copypaste.jsonl";
const DEFAULT_FILTER: &str = "info";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the dual-output logging system.
///
/// Falls back to stderr-only logging when the log file cannot be opened.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);
    let file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            return init_stderr_only();
        }
    };

    // Non-blocking writer keeps ingestion off the disk path
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

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

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(json_layer)
        .with(pretty_layer)
        .try_init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: Some(file_guard),
    }
}

/// Initialize stderr-only logging (CLI `--no-log-file`, tests).
pub fn init_stderr_only() -> LoggingGuard {
    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(pretty_layer)
        .try_init();

    LoggingGuard { _file_guard: None }
}

/// Default to info, allow override via RUST_LOG
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn get_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("copypaste").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("copypaste-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

/// Short, stable fingerprint of clipboard content for log fields.
pub fn content_fingerprint(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..12].to_string()
}
