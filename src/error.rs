use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

/// Domain-specific errors for the clipboard history engine.
///
/// Core operations never return these; they surface from the config loader,
/// the persistence layer and the CLI.
#[derive(Error, Debug)]
pub enum CopyPasteError {
    #[error("Failed to read or write config at '{path}': {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("Invalid persisted record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Unknown board '{0}'")]
    UnknownBoard(String),
}

impl CopyPasteError {
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigIo { path, .. } => format!("Could not access {}", path.display()),
            Self::ConfigParse(e) => format!("Settings file is malformed: {}", e),
            Self::Persistence(e) => format!("History database issue: {}", e),
            Self::InvalidRecord { id, reason } => format!("Skipped entry {}: {}", id, reason),
            Self::UnknownBoard(name) => format!("'{}' is not a board", name),
        }
    }
}

pub type Result<T> = std::result::Result<T, CopyPasteError>;

/// Extension trait for best-effort operations.
///
/// Logs the error with the caller location and converts the result into an
/// `Option`. Used wherever a collaborator failure must not change in-memory
/// state (persistence writes, probe calls).
///
/// ```ignore
/// use copypaste_core::error::ResultExt;
///
/// persistence.save_item(&record).log_err();
/// let settings = persistence.load_settings().warn_on_err().unwrap_or_default();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_err_passes_through_ok() {
        let ok: std::result::Result<u32, String> = Ok(7);
        assert_eq!(ok.log_err(), Some(7));
    }

    #[test]
    fn test_log_err_converts_err_to_none() {
        let err: std::result::Result<u32, String> = Err("boom".to_string());
        assert_eq!(err.log_err(), None);
    }

    #[test]
    fn test_warn_on_err_converts_err_to_none() {
        let err: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("disk gone"));
        assert!(err.warn_on_err().is_none());
    }

    #[test]
    fn test_user_message_for_invalid_record() {
        let e = CopyPasteError::InvalidRecord {
            id: "abc".to_string(),
            reason: "temporary without expiry".to_string(),
        };
        assert_eq!(e.user_message(), "Skipped entry abc: temporary without expiry");
    }

    #[test]
    fn test_config_parse_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let e: CopyPasteError = parse_err.into();
        assert!(matches!(e, CopyPasteError::ConfigParse(_)));
    }
}
