//! Versioned persisted record schema
//!
//! Records written by earlier releases are upgraded one version at a time
//! through explicit migration functions before they become entries.
//!
//! | version | change |
//! |---|---|
//! | 1 | initial layout, no board |
//! | 2 | `board` is always present |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::boards::{Board, BoardRouter};
use crate::error::{CopyPasteError, Result};
use crate::history::{ClipboardEntry, EntryId};
use crate::secret_safe::Retention;

pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Flat persisted form of a [`ClipboardEntry`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub schema_version: u32,
    pub id: String,
    pub content: String,
    pub source_app: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
    pub is_temporary: bool,
    /// Expiry instant; present iff `is_temporary`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<DateTime<Utc>>,
    pub pinned: bool,
}

impl EntryRecord {
    pub fn from_entry(entry: &ClipboardEntry) -> Self {
        EntryRecord {
            schema_version: CURRENT_SCHEMA_VERSION,
            id: entry.id.to_string(),
            content: entry.content.clone(),
            source_app: entry.source_app.clone(),
            timestamp: entry.timestamp,
            board: Some(entry.board),
            is_temporary: entry.is_temporary(),
            expire_at: entry.expires_at(),
            pinned: entry.pinned,
        }
    }

    fn invalid(&self, reason: &str) -> CopyPasteError {
        CopyPasteError::InvalidRecord {
            id: self.id.clone(),
            reason: reason.to_string(),
        }
    }

    /// Convert a current-version record into an entry.
    ///
    /// Rejects records that are not at [`CURRENT_SCHEMA_VERSION`], have an
    /// empty id or content, lack a board, or whose temporary flag and expiry
    /// disagree.
    pub fn into_entry(self) -> Result<ClipboardEntry> {
        if self.schema_version != CURRENT_SCHEMA_VERSION {
            return Err(self.invalid("record has not been migrated"));
        }
        if self.id.trim().is_empty() {
            return Err(self.invalid("empty id"));
        }
        if self.content.is_empty() {
            return Err(self.invalid("empty content"));
        }
        let retention = match (self.is_temporary, self.expire_at) {
            (true, Some(expires_at)) => Retention::Temporary { expires_at },
            (false, None) => Retention::Permanent,
            (true, None) => return Err(self.invalid("temporary record without expiry")),
            (false, Some(_)) => return Err(self.invalid("expiry on a permanent record")),
        };
        let board = self.board.ok_or_else(|| self.invalid("missing board"))?;
        Ok(ClipboardEntry {
            id: EntryId::from(self.id),
            content: self.content,
            source_app: self.source_app,
            timestamp: self.timestamp,
            board,
            retention,
            pinned: self.pinned,
        })
    }
}

/// v1 → v2: assign a board with the active router
pub fn migrate_v1_to_v2(mut record: EntryRecord, router: &BoardRouter) -> EntryRecord {
    if record.board.is_none() {
        record.board = Some(router.route(&record.source_app, &record.content));
    }
    record.schema_version = 2;
    record
}

/// Upgrade `record` to [`CURRENT_SCHEMA_VERSION`].
///
/// Returns the record and whether anything changed (so callers can write
/// it back). Records from a newer schema are rejected.
pub fn migrate_record(record: EntryRecord, router: &BoardRouter) -> Result<(EntryRecord, bool)> {
    if record.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(record.invalid("record is from a newer schema"));
    }
    let original_version = record.schema_version;
    let mut record = record;
    if record.schema_version <= 1 {
        record = migrate_v1_to_v2(record, router);
    }
    let changed = record.schema_version != original_version;
    if changed {
        debug!(
            entry_id = %record.id,
            from = original_version,
            to = record.schema_version,
            "Migrated history record"
        );
    }
    Ok((record, changed))
}
