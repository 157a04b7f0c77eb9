//! copypaste - clipboard history attribution and ingestion engine
//!
//! Decides, for every clipboard change, which application produced it,
//! whether it may be stored (capture toggles, secret-safe blocklist,
//! dedupe), which board it belongs to, and how it is ordered and expired
//! in the in-memory history.
//!
//! The main entry points are [`HistoryStore`] for storage and policy,
//! [`FocusHistoryTracker`] for attribution and [`ClipboardIngestor`],
//! which ties the two together for a clipboard watcher.

pub mod app_name;
pub mod boards;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod focus;
pub mod history;
pub mod ingest;
pub mod logging;
pub mod periodic;
pub mod persistence;
pub mod secret_safe;
pub mod transforms;

pub use app_name::UNKNOWN_APP;
pub use boards::{Board, BoardRouter, RuleSpec};
pub use config::Config;
pub use error::{CopyPasteError, Result};
pub use focus::{FocusEvent, FocusHistoryTracker, FocusPoller, FocusProbe};
pub use history::{ClipboardEntry, EntryId, EntrySummary, HistoryEvent, HistoryStore};
pub use ingest::{CaptureGate, ClipboardIngestor};
pub use persistence::{MemoryPersistence, Persistence, SqlitePersistence};
pub use secret_safe::Retention;
