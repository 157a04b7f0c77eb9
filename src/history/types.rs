//! Clipboard history types

use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::boards::Board;
use crate::secret_safe::Retention;

/// Opaque, immutable entry identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new() -> Self {
        EntryId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        EntryId(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        EntryId(value.to_string())
    }
}

impl Borrow<str> for EntryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One retained clipboard snapshot.
///
/// `content` never changes after creation; transforms produce new strings.
/// Temporariness and expiry are a single [`Retention`] value, so an entry
/// cannot be temporary without an expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    pub id: EntryId,
    pub content: String,
    /// Canonical app name
    pub source_app: String,
    /// Creation time, refreshed when a duplicate copy is folded into it
    pub timestamp: DateTime<Utc>,
    pub board: Board,
    pub retention: Retention,
    pub pinned: bool,
}

impl ClipboardEntry {
    pub fn is_temporary(&self) -> bool {
        self.retention.is_temporary()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.retention.expires_at()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.retention.is_expired_at(now)
    }
}

/// JSON view of an entry for the CLI and external consumers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySummary<'a> {
    pub id: &'a str,
    pub content: &'a str,
    pub source_app: &'a str,
    pub timestamp: DateTime<Utc>,
    pub board: Board,
    pub is_temporary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub pinned: bool,
}

impl<'a> From<&'a ClipboardEntry> for EntrySummary<'a> {
    fn from(entry: &'a ClipboardEntry) -> Self {
        EntrySummary {
            id: entry.id.as_str(),
            content: &entry.content,
            source_app: &entry.source_app,
            timestamp: entry.timestamp,
            board: entry.board,
            is_temporary: entry.is_temporary(),
            expires_at: entry.expires_at(),
            pinned: entry.pinned,
        }
    }
}
