//! Focus History Tracker
//!
//! Records "app became frontmost" transitions from one or more probes and
//! answers "which app most plausibly owned the clipboard at time T".
//!
//! ## Why look backwards
//!
//! Focus transitions race with clipboard notifications: by the time a
//! change is observed the OS may already have moved focus (often to this
//! tool). Resolution therefore scores transitions in a small window around
//! the event (`preMargin` before, `postMargin` after) instead of reading
//! the current focus.
//!
//! ## Concurrency
//!
//! [`FocusHistoryTracker::record`] may be called concurrently from a push
//! observer and a poller; the log sits behind a `parking_lot::Mutex`.

pub mod probe;
pub mod scoring;

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::app_name::{self, UNKNOWN_APP};
use crate::config::FocusConfig;
use scoring::{frequency_score, is_ide, window_score, FrequencyCandidate};

pub use probe::{sample_once, FocusPoller, FocusProbe};
pub use scoring::{categorize, AppCategory};

/// An observed app-activation instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusEvent {
    pub timestamp: DateTime<Utc>,
    /// Canonical app name
    pub app: String,
}

#[derive(Debug, Default)]
struct TrackerState {
    /// Time-ordered transitions, oldest first
    events: VecDeque<FocusEvent>,
}

/// Bounded, time-ordered log of focus transitions
#[derive(Debug)]
pub struct FocusHistoryTracker {
    config: FocusConfig,
    /// Lowercase substrings identifying this process
    self_names: Vec<String>,
    state: Mutex<TrackerState>,
}

/// Lowercase file stem of the running executable, if it has a usable one
pub fn process_identity() -> Option<String> {
    let exe = std::env::current_exe().ok()?;
    let stem = exe.file_stem()?.to_string_lossy().to_lowercase();
    (stem.len() >= 3).then_some(stem)
}

impl FocusHistoryTracker {
    /// Create a tracker. The running process's own identity is added to the
    /// configured self names.
    pub fn new(config: FocusConfig) -> Self {
        let mut self_names: Vec<String> = config
            .self_names
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(identity) = process_identity() {
            if !self_names.contains(&identity) {
                self_names.push(identity);
            }
        }
        let capacity = config.history_capacity.max(1);
        FocusHistoryTracker {
            config,
            self_names,
            state: Mutex::new(TrackerState {
                events: VecDeque::with_capacity(capacity),
            }),
        }
    }

    pub fn config(&self) -> &FocusConfig {
        &self.config
    }

    /// Whether a normalized name must never be recorded or returned
    fn is_ignored(&self, normalized: &str) -> bool {
        if app_name::is_unknown(normalized) {
            return true;
        }
        let lower = normalized.to_lowercase();
        self.self_names.iter().any(|s| lower.contains(s.as_str()))
            || self.config.ignored_owners.iter().any(|o| *o == lower)
    }

    /// Record an app activation observed at `timestamp`.
    ///
    /// Returns true when a transition was appended. Nothing is recorded for
    /// empty or unknown names, this tool's own process, ignored system
    /// owners, or when the app is unchanged since the preceding transition.
    /// A late sample of the app recorded right after it moves that
    /// transition back to `timestamp` instead.
    pub fn record(&self, raw_app: &str, timestamp: DateTime<Utc>) -> bool {
        let app = app_name::normalize(raw_app);
        if self.is_ignored(&app) {
            trace!(raw_app = raw_app, "Ignoring focus observation");
            return false;
        }

        let mut state = self.state.lock();
        // Probes may report slightly out of order; keep the log sorted.
        let pos = state
            .events
            .iter()
            .rposition(|e| e.timestamp <= timestamp)
            .map(|i| i + 1)
            .unwrap_or(0);

        if pos > 0 && state.events[pos - 1].app == app {
            return false;
        }
        // A late sample of the app that follows: the transition began earlier
        if let Some(next) = state.events.get_mut(pos).filter(|e| e.app == app) {
            next.timestamp = timestamp;
            return false;
        }

        debug!(app = %app, history_len = state.events.len() + 1, "Recorded focus transition");
        state.events.insert(pos, FocusEvent { timestamp, app });
        let capacity = self.config.history_capacity.max(1);
        while state.events.len() > capacity {
            state.events.pop_front();
        }
        true
    }

    /// Snapshot of the log, oldest first
    pub fn events(&self) -> Vec<FocusEvent> {
        self.state.lock().events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().events.is_empty()
    }

    pub fn clear(&self) {
        self.state.lock().events.clear();
    }

    /// Most recently recorded app overall
    pub fn last_app(&self) -> Option<String> {
        self.state.lock().events.back().map(|e| e.app.clone())
    }

    /// Best candidate inside `[ts - preMargin, ts + postMargin]`, if any.
    ///
    /// Candidates score `1/(1+|Δt|)` plus their category weight. Ties go to
    /// the later observation.
    pub fn resolve_in_window(&self, timestamp: DateTime<Utc>) -> Option<String> {
        let start = timestamp - self.config.pre_margin();
        let end = timestamp + self.config.post_margin();

        let state = self.state.lock();
        let mut best: Option<(f64, &FocusEvent)> = None;
        for event in state
            .events
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp <= end)
        {
            let score = window_score(timestamp, event.timestamp, &event.app, &self.config);
            match best {
                Some((best_score, _)) if score < best_score => {}
                _ => best = Some((score, event)),
            }
        }
        best.map(|(score, event)| {
            debug!(app = %event.app, score, "Resolved source app from focus window");
            event.app.clone()
        })
    }

    /// Which app most plausibly owned the clipboard at `timestamp`.
    ///
    /// Falls back to the most recently recorded app when the margin window
    /// is empty; `None` only when nothing was ever recorded.
    pub fn resolve(&self, timestamp: DateTime<Utc>) -> Option<String> {
        self.resolve_in_window(timestamp).or_else(|| self.last_app())
    }

    /// Secondary lookup for content that looks like source code.
    ///
    /// Within the lookback window:
    /// 1. for code-like content with a known `language_hint`, the most recent
    ///    sighting of that language's canonical IDE (wider frequency
    ///    lookback), then of its preferred IDEs;
    /// 2. for code-like content, the most recent IDE of any kind;
    /// 3. the hinted canonical IDE if it appears in the window at all;
    /// 4. frequency+recency scoring, with the IDE bonus only when
    ///    `allow_ide` is set.
    pub fn pick_by_recency_and_content_type(
        &self,
        timestamp: DateTime<Utc>,
        code_like: bool,
        language_hint: Option<&str>,
        allow_ide: bool,
    ) -> Option<String> {
        let language = language_hint.and_then(|h| self.config.language_ide(h));
        let end = timestamp + self.config.post_margin();
        let lookback_start = timestamp - self.config.lookback();
        let freq_start = timestamp - self.config.freq_lookback();

        let state = self.state.lock();
        if state.events.is_empty() {
            return None;
        }

        let most_recent = |start: DateTime<Utc>, pred: &dyn Fn(&str) -> bool| {
            state
                .events
                .iter()
                .rev()
                .filter(|e| e.timestamp >= start && e.timestamp <= end)
                .find(|e| pred(&e.app.to_lowercase()))
                .map(|e| e.app.clone())
        };

        if code_like {
            if let Some(lang) = language {
                let canonical = lang.canonical.to_lowercase();
                if let Some(app) = most_recent(freq_start, &|n| n.contains(canonical.as_str())) {
                    return Some(app);
                }
                if let Some(app) = most_recent(lookback_start, &|n| {
                    lang.preferred.iter().any(|p| n.contains(p.as_str()))
                }) {
                    return Some(app);
                }
            }
            if let Some(app) = most_recent(lookback_start, &|n| is_ide(n, &self.config)) {
                return Some(app);
            }
        }

        // First-seen order keeps iteration (and tie-breaks) deterministic
        let mut candidates: Vec<FrequencyCandidate> = Vec::new();
        for event in state
            .events
            .iter()
            .filter(|e| e.timestamp >= lookback_start && e.timestamp <= end)
        {
            match candidates.iter_mut().find(|c| c.app == event.app) {
                Some(c) => {
                    c.count += 1;
                    c.last_seen = c.last_seen.max(event.timestamp);
                }
                None => candidates.push(FrequencyCandidate {
                    app: event.app.clone(),
                    count: 1,
                    last_seen: event.timestamp,
                }),
            }
        }
        drop(state);

        if candidates.is_empty() {
            return None;
        }

        if let Some(lang) = language {
            let canonical = lang.canonical.to_lowercase();
            let present = candidates.iter().any(|c| {
                let name = c.app.to_lowercase();
                name.contains(canonical.as_str()) || canonical.contains(name.as_str())
            });
            if present {
                return Some(lang.canonical.clone());
            }
        }

        let total: usize = candidates.iter().map(|c| c.count).sum();
        let mut best: Option<(f64, &FrequencyCandidate)> = None;
        for candidate in &candidates {
            let score =
                frequency_score(candidate, total, timestamp, code_like, allow_ide, &self.config);
            let better = match best {
                None => true,
                Some((best_score, current)) => {
                    score > best_score
                        || (score == best_score && candidate.last_seen > current.last_seen)
                }
            };
            if better {
                best = Some((score, candidate));
            }
        }
        best.map(|(_, c)| c.app.clone())
    }

    /// `resolve`, or the unknown sentinel
    pub fn resolve_or_unknown(&self, timestamp: DateTime<Utc>) -> String {
        self.resolve(timestamp)
            .unwrap_or_else(|| UNKNOWN_APP.to_string())
    }
}

#[cfg(test)]
#[path = "focus_tests.rs"]
mod tests;
