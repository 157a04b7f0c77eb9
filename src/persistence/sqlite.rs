//! SQLite persistence
//!
//! Table layout matches earlier releases of the tool (`items`, `settings`,
//! `metadata`) so existing databases open in place; columns added since are
//! migrated with `ALTER TABLE` on open. Rows without a `schema_version`
//! load as version 1 records and go through the record migrations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use tracing::{debug, info, warn};

use super::{EntryRecord, Persistence};
use crate::boards::Board;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    source_app TEXT,
    timestamp TEXT,
    board TEXT,
    is_temporary INTEGER DEFAULT 0,
    expire_at REAL NULL,
    pinned INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT
);

CREATE TABLE IF NOT EXISTS metadata (
    k TEXT PRIMARY KEY,
    v TEXT
);
";

pub struct SqlitePersistence {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqlitePersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlitePersistence")
            .field("path", &self.path)
            .finish()
    }
}

impl SqlitePersistence {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .context("Failed to enable WAL mode")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000; PRAGMA temp_store = MEMORY;")
            .context("Failed to set connection pragmas")?;

        let store = SqlitePersistence {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        };
        store.ensure_schema()?;
        info!(path = %path.display(), "Opened history database");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = SqlitePersistence {
            conn: Mutex::new(conn),
            path: None,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(SCHEMA)
            .context("Failed to create history tables")?;
        add_column_if_missing(&conn, "items", "schema_version", "INTEGER DEFAULT 1")?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_items_pinned_timestamp ON items(pinned DESC, timestamp DESC)",
            [],
        )
        .context("Failed to create pinned+timestamp index")?;
        Ok(())
    }
}

/// Add `column` to `table` unless a column of that name already exists
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, decl: &str) -> Result<()> {
    let exists: bool = conn
        .query_row(
            &format!(
                "SELECT COUNT(*) FROM pragma_table_info('{}') WHERE name = ?1",
                table
            ),
            params![column],
            |row| row.get::<_, i32>(0),
        )
        .map(|count| count > 0)
        .unwrap_or(false);

    if !exists {
        conn.execute(
            &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, decl),
            [],
        )
        .with_context(|| format!("Failed to add {} column", column))?;
        info!(table, column, "Migrated history database: added column");
    }
    Ok(())
}

/// Timestamps written by earlier releases are ISO-8601 without an offset
/// (taken as UTC) or epoch seconds; current rows are RFC 3339.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    raw.parse::<f64>().ok().and_then(epoch_seconds)
}

fn epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}

fn to_epoch_seconds(ts: DateTime<Utc>) -> f64 {
    ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_nanos()) / 1_000_000_000.0
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<(EntryRecord, Option<String>)> {
    let id: String = row.get("id")?;
    let raw_timestamp: Option<String> = row.get("timestamp")?;
    let board: Option<String> = row.get("board")?;
    let expire_at: Option<f64> = row.get("expire_at")?;
    let schema_version: Option<i64> = row.get("schema_version")?;

    let timestamp = raw_timestamp.as_deref().and_then(parse_timestamp);
    let problem = match (&raw_timestamp, timestamp) {
        (_, Some(_)) => None,
        (Some(raw), None) => Some(format!("unparsable timestamp '{}'", raw)),
        (None, None) => Some("missing timestamp".to_string()),
    };

    let record = EntryRecord {
        schema_version: schema_version.unwrap_or(1).max(0) as u32,
        id,
        content: row.get("content")?,
        source_app: row
            .get::<_, Option<String>>("source_app")?
            .unwrap_or_default(),
        timestamp: timestamp.unwrap_or_default(),
        board: board.as_deref().and_then(|b| b.parse::<Board>().ok()),
        is_temporary: row.get::<_, Option<i64>>("is_temporary")?.unwrap_or(0) != 0,
        expire_at: expire_at.and_then(epoch_seconds),
        pinned: row.get::<_, Option<i64>>("pinned")?.unwrap_or(0) != 0,
    };
    Ok((record, problem))
}

impl Persistence for SqlitePersistence {
    fn load_items(&self) -> Result<Vec<EntryRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, content, source_app, timestamp, board, is_temporary, expire_at, pinned, schema_version
                 FROM items ORDER BY pinned DESC, timestamp DESC",
            )
            .context("Failed to prepare item query")?;

        let rows = stmt
            .query_map([], row_to_record)
            .context("Failed to query items")?;

        let mut records = Vec::new();
        for row in rows {
            let (record, problem) = row.context("Failed to read item row")?;
            if let Some(problem) = problem {
                warn!(entry_id = %record.id, problem = %problem, "Skipping unreadable history row");
                continue;
            }
            records.push(record);
        }
        debug!(count = records.len(), "Loaded history records");
        Ok(records)
    }

    fn save_item(&self, record: &EntryRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO items
                (id, content, source_app, timestamp, board, is_temporary, expire_at, pinned, schema_version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.content,
                record.source_app,
                record.timestamp.to_rfc3339(),
                record.board.map(|b| b.as_str()),
                record.is_temporary as i64,
                record.expire_at.map(to_epoch_seconds),
                record.pinned as i64,
                record.schema_version as i64,
            ],
        )
        .with_context(|| format!("Failed to save item {}", record.id))?;
        Ok(())
    }

    fn update_item(&self, record: &EntryRecord) -> Result<()> {
        self.save_item(record)
    }

    fn delete_item(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM items WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete item {}", id))?;
        Ok(())
    }

    fn load_settings(&self) -> Result<HashMap<String, String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT key, value FROM settings")
            .context("Failed to prepare settings query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                ))
            })
            .context("Failed to query settings")?;
        let mut settings = HashMap::new();
        for row in rows {
            let (key, value) = row.context("Failed to read settings row")?;
            settings.insert(key, value);
        }
        Ok(settings)
    }

    fn save_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .with_context(|| format!("Failed to save setting {}", key))?;
        Ok(())
    }
}
