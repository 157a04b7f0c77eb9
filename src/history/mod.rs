//! Clipboard History Store
//!
//! The authoritative ordered collection of clipboard entries and its
//! mutation API.
//!
//! ## Ordering
//!
//! Pinned entries always precede unpinned ones; each segment is ordered
//! most-recent-first. A per-entry insertion sequence breaks timestamp ties
//! so ordering is deterministic even when several copies share a clock tick.
//!
//! ## Concurrency
//!
//! All store state sits behind one `parking_lot::Mutex`. Every public
//! operation takes the lock exactly once and works on the locked state
//! through private helpers, so no operation can observe another half-done.
//! Change listeners run after the lock is released.
//!
//! ## Background expiry
//!
//! Temporary entries are removed by a sweeper started the first time a
//! temporary entry exists. It holds only a weak reference to the store and
//! goes through [`HistoryStore::sweep_expired_at`] like any other caller.

mod events;
mod sweeper;
mod types;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::app_name::{self, UNKNOWN_APP};
use crate::boards::{Board, BoardRouter, RuleSpec};
use crate::config::Config;
use crate::dedupe::{content_hash, DedupeAction, DedupeEngine};
use crate::error::ResultExt;
use crate::logging::content_fingerprint;
use crate::periodic::PeriodicTask;
use crate::persistence::{
    migrate_record, EntryRecord, Persistence, SETTING_BLOCKLIST_APPS, SETTING_PER_APP_CAPTURE,
    SETTING_SECRET_SAFE_MODE,
};
use crate::secret_safe::SecretSafeFilter;

pub use events::{HistoryEvent, Listener, ListenerId};
pub use types::{ClipboardEntry, EntryId, EntrySummary};

use events::{dispatch, ListenerBus};

#[derive(Debug)]
struct Slot {
    entry: ClipboardEntry,
    /// Monotonic insertion/refresh sequence, newest highest
    seq: u64,
}

struct StoreState {
    slots: HashMap<EntryId, Slot>,
    /// Store order: pinned first, then most-recent-first
    order: Vec<EntryId>,
    next_seq: u64,
    dedupe: DedupeEngine,
    secret_safe: SecretSafeFilter,
    router: BoardRouter,
    per_app_capture: HashMap<String, bool>,
    max_items: usize,
}

/// Outcome of a mutation computed under the lock, applied after it
#[derive(Default)]
struct Effects {
    events: Vec<HistoryEvent>,
    start_sweeper: bool,
}

pub(crate) struct StoreInner {
    state: Mutex<StoreState>,
    listeners: Mutex<ListenerBus>,
    persistence: Option<Arc<dyn Persistence>>,
    sweeper: Mutex<Option<PeriodicTask>>,
    sweep_interval: std::time::Duration,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        if let Some(mut task) = self.sweeper.get_mut().take() {
            task.stop();
        }
    }
}

/// Cloneable handle to a shared history store
#[derive(Clone)]
pub struct HistoryStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("len", &self.len())
            .field("persistent", &self.inner.persistence.is_some())
            .finish()
    }
}

// ============================================
// STATE HELPERS (lock held by caller)
// ============================================

impl StoreState {
    fn new(config: &Config) -> Self {
        StoreState {
            slots: HashMap::new(),
            order: Vec::new(),
            next_seq: 0,
            dedupe: DedupeEngine::new(&config.dedupe),
            secret_safe: SecretSafeFilter::new(&config.secret_safe),
            router: BoardRouter::from_config(config.board_rules.as_deref()),
            per_app_capture: config
                .history
                .per_app_capture
                .iter()
                .map(|(app, enabled)| (capture_key(app), *enabled))
                .collect(),
            max_items: config.history.max_items.max(1),
        }
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn pinned_count(&self) -> usize {
        self.order
            .iter()
            .take_while(|id| self.slots.get(*id).is_some_and(|s| s.entry.pinned))
            .count()
    }

    /// Toggles are keyed by canonical name; a raw-name key is a fallback
    fn capture_enabled(&self, raw_app: &str, normalized: &str) -> bool {
        let lookup = |name: &str| self.per_app_capture.get(name).copied();
        lookup(normalized).or_else(|| lookup(raw_app)).unwrap_or(true)
    }

    fn detach(&mut self, id: &str) {
        if let Some(pos) = self.order.iter().position(|existing| existing.as_str() == id) {
            self.order.remove(pos);
        }
    }

    /// Place an already-stored entry at its correct position.
    ///
    /// Pinned entries go to the front. Unpinned entries go before the first
    /// unpinned entry that is older by (timestamp, seq).
    fn place(&mut self, id: EntryId) {
        let (pinned, key) = match self.slots.get(&id) {
            Some(slot) => (slot.entry.pinned, (slot.entry.timestamp, slot.seq)),
            None => return,
        };
        if pinned {
            self.order.insert(0, id);
            return;
        }
        let start = self.pinned_count();
        let offset = self.order[start..]
            .iter()
            .position(|other| {
                self.slots
                    .get(other)
                    .is_some_and(|s| (s.entry.timestamp, s.seq) < key)
            })
            .unwrap_or(self.order.len() - start);
        self.order.insert(start + offset, id);
    }

    fn insert_new(&mut self, entry: ClipboardEntry) {
        let id = entry.id.clone();
        let seq = self.bump_seq();
        let index = if entry.pinned { 0 } else { self.pinned_count() };
        self.slots.insert(id.clone(), Slot { entry, seq });
        self.order.insert(index, id);
    }

    fn remove(&mut self, id: &str) -> Option<ClipboardEntry> {
        let slot = self.slots.remove(id)?;
        self.detach(id);
        Some(slot.entry)
    }

    /// Remove oldest unpinned entries beyond `max_items`
    fn evict_overflow(&mut self) -> Vec<EntryId> {
        let mut evicted = Vec::new();
        while self.order.len() > self.max_items {
            let victim = self
                .order
                .iter()
                .rev()
                .find(|id| self.slots.get(*id).is_some_and(|s| !s.entry.pinned))
                .cloned();
            match victim {
                Some(id) => {
                    self.remove(id.as_str());
                    evicted.push(id);
                }
                None => break,
            }
        }
        evicted
    }

    fn entries(&self) -> impl Iterator<Item = &ClipboardEntry> {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(id).map(|s| &s.entry))
    }

    fn has_temporaries(&self) -> bool {
        self.slots.values().any(|s| s.entry.is_temporary())
    }
}

// ============================================
// PUBLIC API
// ============================================

impl HistoryStore {
    /// In-memory store
    pub fn new(config: &Config) -> Self {
        Self::build(config, None)
    }

    /// Store backed by a persistence collaborator.
    ///
    /// Persisted settings override `config`; persisted items are migrated,
    /// expired temporaries dropped, and the rest restored in store order.
    pub fn with_persistence(config: &Config, persistence: Arc<dyn Persistence>) -> Self {
        Self::build(config, Some(persistence))
    }

    fn build(config: &Config, persistence: Option<Arc<dyn Persistence>>) -> Self {
        let store = HistoryStore {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState::new(config)),
                listeners: Mutex::new(ListenerBus::default()),
                persistence,
                sweeper: Mutex::new(None),
                sweep_interval: config.history.sweep_interval(),
            }),
        };
        if store.inner.persistence.is_some() {
            store.restore(Utc::now());
        }
        store
    }

    pub(crate) fn from_inner(inner: Arc<StoreInner>) -> Self {
        HistoryStore { inner }
    }

    fn persistence(&self) -> Option<&dyn Persistence> {
        self.inner.persistence.as_deref()
    }

    fn persist_entry(&self, entry: &ClipboardEntry, is_new: bool) {
        if let Some(p) = self.persistence() {
            let record = EntryRecord::from_entry(entry);
            if is_new {
                p.save_item(&record).log_err();
            } else {
                p.update_item(&record).log_err();
            }
        }
    }

    fn persist_deletions(&self, ids: &[EntryId]) {
        if let Some(p) = self.persistence() {
            for id in ids {
                p.delete_item(id.as_str()).log_err();
            }
        }
    }

    fn save_setting<T: serde::Serialize>(&self, key: &str, value: &T) {
        let Some(p) = self.persistence() else {
            return;
        };
        match serde_json::to_string(value) {
            Ok(json) => {
                p.save_setting(key, &json).log_err();
            }
            Err(e) => warn!(key, error = %e, "Failed to encode setting"),
        }
    }

    /// Notify listeners and start the sweeper as required
    fn apply(&self, effects: Effects) {
        if effects.start_sweeper {
            self.ensure_sweeper();
        }
        if effects.events.is_empty() {
            return;
        }
        let listeners = self.inner.listeners.lock().snapshot();
        dispatch(&listeners, &effects.events);
    }

    fn ensure_sweeper(&self) {
        let mut current = self.inner.sweeper.lock();
        if current.as_ref().is_some_and(|t| t.is_running()) {
            return;
        }
        match sweeper::spawn(Arc::downgrade(&self.inner), self.inner.sweep_interval) {
            Ok(task) => *current = Some(task),
            Err(e) => warn!(error = %e, "Failed to start expiry sweeper"),
        }
    }

    /// Whether the background expiry sweep is running
    pub fn sweeper_running(&self) -> bool {
        self.inner
            .sweeper
            .lock()
            .as_ref()
            .is_some_and(|t| t.is_running())
    }

    fn restore(&self, now: DateTime<Utc>) {
        let Some(p) = self.persistence() else {
            return;
        };

        let settings = p.load_settings().log_err().unwrap_or_default();
        {
            let mut state = self.inner.state.lock();
            apply_persisted_settings(&mut state, &settings);
        }

        let Some(records) = p.load_items().log_err() else {
            return;
        };

        let mut state = self.inner.state.lock();
        let mut restored: Vec<ClipboardEntry> = Vec::with_capacity(records.len());
        let mut migrated: Vec<ClipboardEntry> = Vec::new();
        let mut expired: Vec<EntryId> = Vec::new();
        let mut skipped = 0usize;

        for record in records {
            let id = record.id.clone();
            let converted = migrate_record(record, &state.router)
                .and_then(|(record, changed)| record.into_entry().map(|e| (e, changed)));
            match converted {
                Ok((entry, _)) if entry.is_expired_at(now) => expired.push(entry.id),
                Ok((entry, changed)) => {
                    if changed {
                        migrated.push(entry.clone());
                    }
                    restored.push(entry);
                }
                Err(e) => {
                    warn!(entry_id = %id, error = %e, "Skipping invalid history record");
                    skipped += 1;
                }
            }
        }

        // Oldest first, so the newest entries end with the highest sequence
        // numbers and the most recent dedupe positions.
        restored.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        for entry in restored {
            let hash = content_hash(&entry.content);
            state.dedupe.seed(&hash, &entry.source_app, entry.timestamp);
            let id = entry.id.clone();
            let seq = state.bump_seq();
            state.slots.insert(id.clone(), Slot { entry, seq });
            state.place(id);
        }
        let evicted = state.evict_overflow();
        let start_sweeper = state.has_temporaries();
        let total = state.order.len();
        drop(state);

        for entry in &migrated {
            self.persist_entry(entry, false);
        }
        self.persist_deletions(&expired);
        self.persist_deletions(&evicted);

        info!(
            restored = total,
            migrated = migrated.len(),
            expired = expired.len(),
            evicted = evicted.len(),
            skipped,
            "Restored clipboard history"
        );
        if start_sweeper {
            self.ensure_sweeper();
        }
    }

    /// [`add_item_at`](Self::add_item_at) stamped with the current time
    pub fn add_item(&self, content: &str, source_app: &str) -> Option<ClipboardEntry> {
        self.add_item_at(content, source_app, Utc::now())
    }

    /// Run a clipboard snapshot through the ingestion pipeline.
    ///
    /// Returns `None` for empty content, when capture is disabled for the
    /// app, when the app is blocked, or when dedupe suppresses the copy.
    /// A duplicate folded into an existing entry returns that entry.
    pub fn add_item_at(
        &self,
        content: &str,
        source_app: &str,
        timestamp: DateTime<Utc>,
    ) -> Option<ClipboardEntry> {
        if content.trim().is_empty() {
            return None;
        }
        let raw_app = if source_app.trim().is_empty() {
            UNKNOWN_APP
        } else {
            source_app.trim()
        };
        let normalized = app_name::normalize(raw_app);
        let app = if normalized.is_empty() {
            UNKNOWN_APP.to_string()
        } else {
            normalized
        };

        let mut effects = Effects::default();
        let mut state = self.inner.state.lock();

        if !state.capture_enabled(raw_app, &app) {
            debug!(app = %app, "Capture disabled for app, skipping");
            return None;
        }
        if state.secret_safe.is_blocked_app(raw_app) || state.secret_safe.is_blocked_app(&app) {
            info!(app = %app, "Blocked app, clipboard content not captured");
            return None;
        }

        let hash = content_hash(content);
        let action = {
            let StoreState {
                dedupe,
                slots,
                order,
                ..
            } = &mut *state;
            dedupe.evaluate(&hash, &app, timestamp, || {
                find_same(slots, order, content, &app)
            })
        };

        let result = match action {
            DedupeAction::Suppress => None,
            DedupeAction::ReuseExisting(id) => {
                let seq = state.bump_seq();
                let refreshed = state.slots.get_mut(&id).map(|slot| {
                    slot.entry.timestamp = slot.entry.timestamp.max(timestamp);
                    slot.seq = seq;
                    slot.entry.clone()
                });
                if let Some(entry) = &refreshed {
                    state.detach(id.as_str());
                    state.place(id.clone());
                    self.persist_entry(entry, false);
                    debug!(entry_id = %id, app = %app, "Refreshed existing entry");
                    effects.events.push(HistoryEvent::Refreshed(entry.clone()));
                }
                refreshed
            }
            DedupeAction::Admit if state.pinned_count() >= state.max_items => {
                debug!(app = %app, max_items = state.max_items, "History full of pinned entries, not admitting");
                None
            }
            DedupeAction::Admit => {
                let retention = state.secret_safe.classify(content, timestamp);
                let board = state.router.route(&app, content);
                let entry = ClipboardEntry {
                    id: EntryId::new(),
                    content: content.to_string(),
                    source_app: app.clone(),
                    timestamp,
                    board,
                    retention,
                    pinned: false,
                };
                state.insert_new(entry.clone());
                state.dedupe.record_admitted(&hash, &app, timestamp);
                self.persist_entry(&entry, true);
                info!(
                    entry_id = %entry.id,
                    app = %app,
                    board = %board,
                    temporary = entry.is_temporary(),
                    content_len = content.len(),
                    fingerprint = %content_fingerprint(content),
                    "Added clipboard entry"
                );

                let evicted = state.evict_overflow();
                self.persist_deletions(&evicted);
                effects.start_sweeper = entry.is_temporary();
                effects.events.push(HistoryEvent::Added(entry.clone()));
                if !evicted.is_empty() {
                    debug!(count = evicted.len(), "Evicted oldest unpinned entries");
                    effects.events.push(HistoryEvent::Evicted(evicted));
                }
                Some(entry)
            }
        };
        drop(state);
        self.apply(effects);
        result
    }

    pub fn get_item_by_id(&self, id: &str) -> Option<ClipboardEntry> {
        let state = self.inner.state.lock();
        state.slots.get(id).map(|s| s.entry.clone())
    }

    /// Distinct source apps, sorted
    pub fn get_apps(&self) -> Vec<String> {
        let state = self.inner.state.lock();
        let apps: BTreeSet<&str> = state.entries().map(|e| e.source_app.as_str()).collect();
        apps.into_iter().map(str::to_string).collect()
    }

    /// Entries from `app` in store order. The name is matched as given and
    /// in its canonical form.
    pub fn get_items_by_app(&self, app: &str) -> Vec<ClipboardEntry> {
        let canonical = app_name::normalize(app);
        let state = self.inner.state.lock();
        state
            .entries()
            .filter(|e| e.source_app == app || e.source_app == canonical)
            .cloned()
            .collect()
    }

    pub fn get_items_by_board(&self, board: Board) -> Vec<ClipboardEntry> {
        let state = self.inner.state.lock();
        state.entries().filter(|e| e.board == board).cloned().collect()
    }

    /// Snapshot of all entries in store order
    pub fn items(&self) -> Vec<ClipboardEntry> {
        self.inner.state.lock().entries().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pin an entry, moving it to the front. False if `id` is unknown.
    pub fn pin_item(&self, id: &str) -> bool {
        self.set_pinned(id, true)
    }

    /// Unpin an entry, returning it to its recency position. False if `id`
    /// is unknown.
    pub fn unpin_item(&self, id: &str) -> bool {
        self.set_pinned(id, false)
    }

    fn set_pinned(&self, id: &str, pinned: bool) -> bool {
        let mut state = self.inner.state.lock();
        let Some(slot) = state.slots.get_mut(id) else {
            debug!(entry_id = id, "Pin toggle for unknown entry");
            return false;
        };
        if slot.entry.pinned == pinned {
            return true;
        }
        slot.entry.pinned = pinned;
        let entry = slot.entry.clone();
        state.detach(id);
        state.place(entry.id.clone());
        self.persist_entry(&entry, false);
        drop(state);

        info!(entry_id = id, pinned, "Pin state changed");
        let event = if pinned {
            HistoryEvent::Pinned(entry.id)
        } else {
            HistoryEvent::Unpinned(entry.id)
        };
        self.apply(Effects {
            events: vec![event],
            start_sweeper: false,
        });
        true
    }

    /// Remove an entry on request. False if `id` is unknown.
    pub fn delete_item(&self, id: &str) -> bool {
        let removed = self.inner.state.lock().remove(id);
        let Some(entry) = removed else {
            return false;
        };
        self.persist_deletions(std::slice::from_ref(&entry.id));
        self.apply(Effects {
            events: vec![HistoryEvent::Deleted(entry.id)],
            start_sweeper: false,
        });
        true
    }

    // ============================================
    // POLICY
    // ============================================

    pub fn secret_safe_enabled(&self) -> bool {
        self.inner.state.lock().secret_safe.is_enabled()
    }

    /// Applies to subsequent `add_item` calls only
    pub fn set_secret_safe_enabled(&self, enabled: bool) {
        self.inner.state.lock().secret_safe.set_enabled(enabled);
        info!(enabled, "Secret-safe mode changed");
        self.save_setting(SETTING_SECRET_SAFE_MODE, &enabled);
    }

    pub fn blocklist(&self) -> Vec<String> {
        self.inner.state.lock().secret_safe.blocklist().to_vec()
    }

    /// Replace the blocklist. Applies to subsequent `add_item` calls only.
    pub fn set_blocklist<S: AsRef<str>>(&self, entries: &[S]) {
        let blocklist = {
            let mut state = self.inner.state.lock();
            state.secret_safe.set_blocklist(entries);
            state.secret_safe.blocklist().to_vec()
        };
        info!(count = blocklist.len(), "Blocklist replaced");
        self.save_setting(SETTING_BLOCKLIST_APPS, &blocklist);
    }

    pub fn app_capture_enabled(&self, app: &str) -> bool {
        let state = self.inner.state.lock();
        state.capture_enabled(app, &app_name::normalize(app))
    }

    /// Enable or disable capture for one app without touching history or
    /// dedupe state
    pub fn set_app_capture_enabled(&self, app: &str, enabled: bool) {
        let toggles = {
            let mut state = self.inner.state.lock();
            state.per_app_capture.insert(capture_key(app), enabled);
            state.per_app_capture.clone()
        };
        info!(app, enabled, "Per-app capture changed");
        self.save_setting(SETTING_PER_APP_CAPTURE, &toggles);
    }

    // ============================================
    // BOARDS
    // ============================================

    /// Replace the board rule table. Existing entries keep their boards
    /// until [`reclassify_all`](Self::reclassify_all) runs.
    pub fn set_board_rules(&self, specs: &[RuleSpec]) {
        self.inner.state.lock().router.set_rules(specs);
    }

    pub fn board_rules(&self) -> Vec<RuleSpec> {
        self.inner.state.lock().router.rules_as_spec()
    }

    /// Board the active rules would assign, without storing anything
    pub fn route(&self, app: &str, content: &str) -> Board {
        self.inner.state.lock().router.route(app, content)
    }

    /// Recompute every entry's board with the active rules.
    ///
    /// Returns the entries whose board changed, with their new board.
    pub fn reclassify_all(&self) -> Vec<(EntryId, Board)> {
        let mut state = self.inner.state.lock();
        let StoreState {
            slots,
            order,
            router,
            ..
        } = &mut *state;
        let mut changed = Vec::new();
        for id in order.iter() {
            let Some(slot) = slots.get_mut(id) else {
                continue;
            };
            let board = router.route(&slot.entry.source_app, &slot.entry.content);
            if board != slot.entry.board {
                slot.entry.board = board;
                self.persist_entry(&slot.entry, false);
                changed.push((id.clone(), board));
            }
        }
        drop(state);

        info!(changed = changed.len(), "Reclassified history entries");
        if !changed.is_empty() {
            self.apply(Effects {
                events: vec![HistoryEvent::Reclassified(changed.clone())],
                start_sweeper: false,
            });
        }
        changed
    }

    // ============================================
    // EXPIRY
    // ============================================

    /// Remove temporary entries whose expiry is at or before `now`.
    ///
    /// Persistence deletions and listener notification happen after the
    /// store lock is released.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> Vec<EntryId> {
        let expired: Vec<EntryId> = {
            let mut state = self.inner.state.lock();
            let ids: Vec<EntryId> = state
                .order
                .iter()
                .filter(|id| {
                    state
                        .slots
                        .get(*id)
                        .is_some_and(|s| s.entry.is_expired_at(now))
                })
                .cloned()
                .collect();
            for id in &ids {
                state.remove(id.as_str());
            }
            ids
        };
        if expired.is_empty() {
            return expired;
        }

        info!(count = expired.len(), "Expired temporary entries");
        self.persist_deletions(&expired);
        self.apply(Effects {
            events: vec![HistoryEvent::Expired(expired.clone())],
            start_sweeper: false,
        });
        expired
    }

    // ============================================
    // LISTENERS & LIFECYCLE
    // ============================================

    /// Register a change listener, invoked after every visible mutation
    pub fn add_change_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&HistoryEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.lock().add(Arc::new(listener))
    }

    pub fn remove_change_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.lock().remove(id)
    }

    /// Number of hashes held by the dedupe LRU
    pub fn tracked_hashes(&self) -> usize {
        self.inner.state.lock().dedupe.tracked_hashes()
    }

    /// Stop the background sweeper and wait for it
    pub fn shutdown(&self) {
        let task = self.inner.sweeper.lock().take();
        if let Some(mut task) = task {
            task.stop();
            info!("History store shut down");
        }
    }
}

fn find_same(
    slots: &HashMap<EntryId, Slot>,
    order: &[EntryId],
    content: &str,
    app: &str,
) -> Option<EntryId> {
    order
        .iter()
        .find(|id| {
            slots
                .get(*id)
                .is_some_and(|s| s.entry.content == content && s.entry.source_app == app)
        })
        .cloned()
}

/// Canonical key for a per-app capture toggle
fn capture_key(app: &str) -> String {
    let canonical = app_name::normalize(app);
    if canonical.is_empty() {
        UNKNOWN_APP.to_string()
    } else {
        canonical
    }
}

/// Apply persisted policy settings over the configured ones
fn apply_persisted_settings(state: &mut StoreState, settings: &HashMap<String, String>) {
    if let Some(raw) = settings.get(SETTING_SECRET_SAFE_MODE) {
        match serde_json::from_str::<bool>(raw) {
            Ok(enabled) => state.secret_safe.set_enabled(enabled),
            Err(e) => warn!(key = SETTING_SECRET_SAFE_MODE, error = %e, "Ignoring malformed setting"),
        }
    }
    if let Some(raw) = settings.get(SETTING_BLOCKLIST_APPS) {
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(list) => state.secret_safe.set_blocklist(&list),
            Err(e) => warn!(key = SETTING_BLOCKLIST_APPS, error = %e, "Ignoring malformed setting"),
        }
    }
    if let Some(raw) = settings.get(SETTING_PER_APP_CAPTURE) {
        match serde_json::from_str::<HashMap<String, bool>>(raw) {
            Ok(toggles) => state
                .per_app_capture
                .extend(toggles.into_iter().map(|(app, enabled)| (capture_key(&app), enabled))),
            Err(e) => warn!(key = SETTING_PER_APP_CAPTURE, error = %e, "Ignoring malformed setting"),
        }
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
