use std::collections::HashMap;

use anyhow::{bail, Result};
use parking_lot::Mutex;

use super::{EntryRecord, Persistence};

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<EntryRecord>,
    settings: HashMap<String, String>,
    fail_writes: bool,
}

/// In-process persistence, used by tests and as a stand-in for a database
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    state: Mutex<MemoryState>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated with records and settings
    pub fn with_contents(items: Vec<EntryRecord>, settings: HashMap<String, String>) -> Self {
        MemoryPersistence {
            state: Mutex::new(MemoryState {
                items,
                settings,
                fail_writes: false,
            }),
        }
    }

    /// Make every write fail, to exercise best-effort handling
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    pub fn items(&self) -> Vec<EntryRecord> {
        self.state.lock().items.clone()
    }

    pub fn setting(&self, key: &str) -> Option<String> {
        self.state.lock().settings.get(key).cloned()
    }
}

impl Persistence for MemoryPersistence {
    fn load_items(&self) -> Result<Vec<EntryRecord>> {
        Ok(self.state.lock().items.clone())
    }

    fn save_item(&self, record: &EntryRecord) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            bail!("write rejected for {}", record.id);
        }
        match state.items.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => state.items.push(record.clone()),
        }
        Ok(())
    }

    fn update_item(&self, record: &EntryRecord) -> Result<()> {
        self.save_item(record)
    }

    fn delete_item(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            bail!("delete rejected for {}", id);
        }
        state.items.retain(|r| r.id != id);
        Ok(())
    }

    fn load_settings(&self) -> Result<HashMap<String, String>> {
        Ok(self.state.lock().settings.clone())
    }

    fn save_setting(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            bail!("setting write rejected for {}", key);
        }
        state.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
