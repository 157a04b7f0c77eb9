//! Content-hash deduplication
//!
//! Two notions of "duplicate" are tracked:
//! - global reappearance of the same content (bounded recent-hash LRU)
//! - the same app copying the same content repeatedly inside a short
//!   sliding window (per-(app, hash) last-seen map)
//!
//! The global check runs first so identical text copied from a different
//! app still becomes its own entry, while repeated copies from the same app
//! collapse onto one.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::DedupeConfig;

/// Stable SHA-256 hex digest of the content
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Outcome of a dedupe evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupeAction<T> {
    /// Surface this existing entry instead of creating a duplicate
    ReuseExisting(T),
    /// Silently drop the snapshot
    Suppress,
    /// Create a new entry, then call [`DedupeEngine::record_admitted`]
    Admit,
}

#[derive(Debug)]
pub struct DedupeEngine {
    recent: LruCache<String, DateTime<Utc>>,
    per_app: HashMap<(String, String), DateTime<Utc>>,
    per_app_window: Duration,
}

impl DedupeEngine {
    pub fn new(config: &DedupeConfig) -> Self {
        let capacity = NonZeroUsize::new(config.lru_size).unwrap_or(NonZeroUsize::MIN);
        DedupeEngine {
            recent: LruCache::new(capacity),
            per_app: HashMap::new(),
            per_app_window: config.per_app_window(),
        }
    }

    /// Decide what to do with `hash` copied from `app` at `now`.
    ///
    /// `find_existing` looks up a stored entry with identical content and
    /// app; it is only called when one of the indices already knows the
    /// hash.
    pub fn evaluate<T, F>(
        &mut self,
        hash: &str,
        app: &str,
        now: DateTime<Utc>,
        find_existing: F,
    ) -> DedupeAction<T>
    where
        F: FnOnce() -> Option<T>,
    {
        let mut find_existing = Some(find_existing);
        let mut existing = || find_existing.take().and_then(|f| f());

        if self.recent.contains(hash) {
            if let Some(found) = existing() {
                self.recent.put(hash.to_string(), now);
                self.per_app.insert((app.to_string(), hash.to_string()), now);
                debug!(app = %app, "Dedupe: content already stored, reusing entry");
                return DedupeAction::ReuseExisting(found);
            }
        }

        let key = (app.to_string(), hash.to_string());
        if let Some(last_seen) = self.per_app.get(&key).copied() {
            if now - last_seen <= self.per_app_window {
                self.per_app.insert(key, now);
                return match existing() {
                    Some(found) => DedupeAction::ReuseExisting(found),
                    None => {
                        debug!(app = %app, "Dedupe: repeated copy inside per-app window, suppressed");
                        DedupeAction::Suppress
                    }
                };
            }
        }

        DedupeAction::Admit
    }

    /// Index a freshly admitted entry
    pub fn record_admitted(&mut self, hash: &str, app: &str, now: DateTime<Utc>) {
        self.recent.put(hash.to_string(), now);
        self.per_app.insert((app.to_string(), hash.to_string()), now);
        self.prune_per_app(now);
    }

    /// Index an entry restored from persistence
    pub fn seed(&mut self, hash: &str, app: &str, seen_at: DateTime<Utc>) {
        self.recent.put(hash.to_string(), seen_at);
        self.per_app.insert((app.to_string(), hash.to_string()), seen_at);
    }

    /// Drop per-app timestamps that can no longer match a window
    fn prune_per_app(&mut self, now: DateTime<Utc>) {
        if self.per_app.len() <= self.recent.cap().get() {
            return;
        }
        let window = self.per_app_window;
        self.per_app.retain(|_, seen| now - *seen <= window);
    }

    /// Number of hashes currently held in the LRU
    pub fn tracked_hashes(&self) -> usize {
        self.recent.len()
    }

    pub fn capacity(&self) -> usize {
        self.recent.cap().get()
    }

    pub fn per_app_len(&self) -> usize {
        self.per_app.len()
    }

    pub fn clear(&mut self) {
        self.recent.clear();
        self.per_app.clear();
    }
}

impl Default for DedupeEngine {
    fn default() -> Self {
        Self::new(&DedupeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_content_hash_is_stable_hex() {
        let a = content_hash("hello");
        assert_eq!(a, content_hash("hello"));
        assert_ne!(a, content_hash("world"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_new_content_is_admitted() {
        let mut engine = DedupeEngine::default();
        let action: DedupeAction<u32> = engine.evaluate(&content_hash("x"), "Notes", t0(), || {
            panic!("lookup not needed for unknown content")
        });
        assert_eq!(action, DedupeAction::Admit);
    }

    #[test]
    fn test_known_hash_with_existing_entry_is_reused() {
        let mut engine = DedupeEngine::default();
        let hash = content_hash("x");
        engine.record_admitted(&hash, "Notes", t0());
        let action = engine.evaluate(&hash, "Notes", t0() + Duration::seconds(1), || Some(7));
        assert_eq!(action, DedupeAction::ReuseExisting(7));
    }

    #[test]
    fn test_other_app_is_admitted() {
        let mut engine = DedupeEngine::default();
        let hash = content_hash("x");
        engine.record_admitted(&hash, "AppA", t0());
        // the store has no AppB entry with this content
        let action: DedupeAction<u32> = engine.evaluate(&hash, "AppB", t0(), || None);
        assert_eq!(action, DedupeAction::Admit);
    }

    #[test]
    fn test_window_match_without_entry_is_suppressed() {
        let mut engine = DedupeEngine::default();
        let hash = content_hash("x");
        engine.record_admitted(&hash, "Notes", t0());
        let action: DedupeAction<u32> =
            engine.evaluate(&hash, "Notes", t0() + Duration::seconds(5), || None);
        assert_eq!(action, DedupeAction::Suppress);
    }

    #[test]
    fn test_window_expiry_readmits() {
        let mut engine = DedupeEngine::default();
        let hash = content_hash("x");
        engine.record_admitted(&hash, "Notes", t0());
        let later = t0() + Duration::seconds(31);
        let action: DedupeAction<u32> = engine.evaluate(&hash, "Notes", later, || None);
        assert_eq!(action, DedupeAction::Admit);
    }

    #[test]
    fn test_suppression_slides_the_window() {
        let mut engine = DedupeEngine::default();
        let hash = content_hash("x");
        engine.record_admitted(&hash, "Notes", t0());
        let t1 = t0() + Duration::seconds(20);
        let _: DedupeAction<u32> = engine.evaluate(&hash, "Notes", t1, || None);
        // 40s after admission but only 20s after the last sighting
        let t2 = t0() + Duration::seconds(40);
        let action: DedupeAction<u32> = engine.evaluate(&hash, "Notes", t2, || None);
        assert_eq!(action, DedupeAction::Suppress);
    }

    #[test]
    fn test_lru_is_bounded() {
        let config = DedupeConfig {
            lru_size: 200,
            ..DedupeConfig::default()
        };
        let mut engine = DedupeEngine::new(&config);
        for i in 0..250 {
            engine.record_admitted(&content_hash(&format!("item {}", i)), "Notes", t0());
        }
        assert!(engine.tracked_hashes() <= 200);
        assert_eq!(engine.capacity(), 200);
    }

    #[test]
    fn test_evicted_hash_falls_through_to_window_check() {
        let config = DedupeConfig {
            lru_size: 1,
            ..DedupeConfig::default()
        };
        let mut engine = DedupeEngine::new(&config);
        let first = content_hash("first");
        engine.record_admitted(&first, "Notes", t0());
        engine.record_admitted(&content_hash("second"), "Notes", t0());
        // evicted from the LRU, still inside the per-app window
        let action = engine.evaluate(&first, "Notes", t0(), || Some(1));
        assert_eq!(action, DedupeAction::ReuseExisting(1));
    }

    #[test]
    fn test_per_app_map_is_pruned() {
        let config = DedupeConfig {
            lru_size: 4,
            per_app_window_secs: 1,
        };
        let mut engine = DedupeEngine::new(&config);
        for i in 0..10 {
            let at = t0() + Duration::seconds(i * 10);
            engine.record_admitted(&content_hash(&format!("item {}", i)), "Notes", at);
        }
        assert!(engine.per_app_len() <= 5);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let config = DedupeConfig {
            lru_size: 0,
            ..DedupeConfig::default()
        };
        assert_eq!(DedupeEngine::new(&config).capacity(), 1);
    }
}
