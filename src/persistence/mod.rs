//! Persistence collaborator
//!
//! The history store calls into a [`Persistence`] implementation
//! opportunistically. Every call is best-effort: failures are logged at the
//! call site and in-memory state stays authoritative for the session.

mod memory;
pub mod record;
mod sqlite;

use std::collections::HashMap;

use anyhow::Result;

pub use memory::MemoryPersistence;
pub use record::{migrate_record, migrate_v1_to_v2, EntryRecord, CURRENT_SCHEMA_VERSION};
pub use sqlite::SqlitePersistence;

/// Settings key for the secret-safe toggle (JSON bool)
pub const SETTING_SECRET_SAFE_MODE: &str = "secret_safe_mode";
/// Settings key for the blocklist (JSON array of strings)
pub const SETTING_BLOCKLIST_APPS: &str = "blocklist_apps";
/// Settings key for per-app capture toggles (JSON object of bools)
pub const SETTING_PER_APP_CAPTURE: &str = "per_app_capture_toggle";

pub trait Persistence: Send + Sync {
    fn load_items(&self) -> Result<Vec<EntryRecord>>;
    /// Insert or replace
    fn save_item(&self, record: &EntryRecord) -> Result<()>;
    fn update_item(&self, record: &EntryRecord) -> Result<()>;
    fn delete_item(&self, id: &str) -> Result<()>;
    fn load_settings(&self) -> Result<HashMap<String, String>>;
    fn save_setting(&self, key: &str, value: &str) -> Result<()>;
}
