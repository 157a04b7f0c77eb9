//! Clipboard change ingestion
//!
//! Bridges clipboard-change notifications into the history store:
//! a capture gate drops events during pauses and short bursts, the focus
//! tracker attributes the snapshot to a source app, and the result goes
//! through [`HistoryStore::add_item_at`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::app_name::UNKNOWN_APP;
use crate::config::CaptureConfig;
use crate::focus::FocusHistoryTracker;
use crate::history::{ClipboardEntry, HistoryStore};

// ============================================
// CAPTURE GATE
// ============================================

#[derive(Debug, Default)]
struct GateState {
    /// Events strictly before this instant are ignored
    ignore_until: Option<DateTime<Utc>>,
}

/// Decides whether a clipboard change should be captured at all.
///
/// Capture is paused explicitly, after this tool writes to the clipboard
/// itself, and for a short window after every captured event so that a
/// burst of change notifications yields one snapshot.
#[derive(Debug)]
pub struct CaptureGate {
    enabled: bool,
    pause_after_set: Duration,
    burst_ignore: Duration,
    state: Mutex<GateState>,
}

impl CaptureGate {
    pub fn new(config: &CaptureConfig) -> Self {
        CaptureGate {
            enabled: config.enabled,
            pause_after_set: Duration::milliseconds(config.pause_after_set_ms as i64),
            burst_ignore: Duration::milliseconds(config.burst_ignore_ms as i64),
            state: Mutex::new(GateState::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pause capture for `ms` milliseconds from now
    pub fn pause(&self, ms: u64) {
        self.pause_at(Utc::now(), ms);
    }

    pub fn pause_at(&self, now: DateTime<Utc>, ms: u64) {
        let until = now + Duration::milliseconds(ms as i64);
        self.state.lock().ignore_until = Some(until);
        debug!(pause_ms = ms, "Clipboard capture paused");
    }

    /// Lift any pause or burst window immediately
    pub fn resume(&self) {
        self.state.lock().ignore_until = None;
    }

    /// The tool is about to write the clipboard; skip the echo
    pub fn notify_programmatic_set_at(&self, now: DateTime<Utc>) {
        let until = now + self.pause_after_set;
        self.state.lock().ignore_until = Some(until);
    }

    pub fn is_paused_at(&self, now: DateTime<Utc>) -> bool {
        self.state
            .lock()
            .ignore_until
            .is_some_and(|until| now < until)
    }

    /// Admit an event observed at `now`, opening the burst window on success
    pub fn try_admit(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        let mut state = self.state.lock();
        if state.ignore_until.is_some_and(|until| now < until) {
            return false;
        }
        state.ignore_until = Some(now + self.burst_ignore);
        true
    }
}

impl Default for CaptureGate {
    fn default() -> Self {
        Self::new(&CaptureConfig::default())
    }
}

// ============================================
// CODE DETECTION
// ============================================

/// Result of [`detect_code`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeSignal {
    pub code_like: bool,
    /// `python` or `javascript` when one language clearly dominates
    pub language: Option<&'static str>,
}

const PYTHON_LINE_PREFIXES: &[&str] = &[
    "def ",
    "async def ",
    "class ",
    "elif ",
    "except",
    "import ",
    "print(",
    "with ",
];

const JS_LINE_PREFIXES: &[&str] = &[
    "function ",
    "const ",
    "let ",
    "var ",
    "export ",
    "async function ",
    "console.",
];

fn python_line(line: &str) -> bool {
    if line.starts_with("from ") {
        return line.contains(" import ");
    }
    if line.starts_with("import ") && (line.contains(" from ") || line.ends_with(';')) {
        return false;
    }
    PYTHON_LINE_PREFIXES.iter().any(|p| line.starts_with(p)) || line.contains("self.")
}

fn js_line(line: &str) -> bool {
    if line.starts_with("import ") && line.contains(" from ") {
        return true;
    }
    JS_LINE_PREFIXES.iter().any(|p| line.starts_with(p))
        || line.contains("=>")
        || line.contains("console.log(")
        || line.contains("===")
}

fn generic_code_line(line: &str) -> bool {
    line.ends_with(';')
        || line.ends_with('{')
        || line == "}"
        || line.starts_with("#include")
        || line.starts_with("fn ")
        || line.starts_with("pub fn ")
        || line.starts_with("return ")
}

/// Heuristic check for source code, with a language hint for attribution.
pub fn detect_code(text: &str) -> CodeSignal {
    let (mut python, mut js, mut generic) = (0usize, 0usize, 0usize);
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if python_line(line) {
            python += 1;
        }
        if js_line(line) {
            js += 1;
        }
        if generic_code_line(line) {
            generic += 1;
        }
    }

    let language = match python.cmp(&js) {
        std::cmp::Ordering::Greater => Some("python"),
        std::cmp::Ordering::Less => Some("javascript"),
        std::cmp::Ordering::Equal => None,
    };
    CodeSignal {
        code_like: language.is_some() || python + js + generic > 0,
        language,
    }
}

// ============================================
// INGESTOR
// ============================================

/// Turns clipboard-change notifications into history entries
#[derive(Debug)]
pub struct ClipboardIngestor {
    store: HistoryStore,
    tracker: Arc<FocusHistoryTracker>,
    gate: CaptureGate,
}

impl ClipboardIngestor {
    pub fn new(store: HistoryStore, tracker: Arc<FocusHistoryTracker>, capture: &CaptureConfig) -> Self {
        ClipboardIngestor {
            store,
            tracker,
            gate: CaptureGate::new(capture),
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn tracker(&self) -> &Arc<FocusHistoryTracker> {
        &self.tracker
    }

    pub fn gate(&self) -> &CaptureGate {
        &self.gate
    }

    /// Call before writing to the clipboard so the resulting change is not
    /// captured as a new entry
    pub fn notify_programmatic_set(&self) {
        self.gate.notify_programmatic_set_at(Utc::now());
    }

    /// Source app for a snapshot taken at `timestamp`.
    ///
    /// Margin-window candidates win; code-like text then prefers a matching
    /// IDE from the wider lookback; then the last recorded app.
    pub fn attribute(&self, text: &str, timestamp: DateTime<Utc>) -> String {
        if let Some(app) = self.tracker.resolve_in_window(timestamp) {
            return app;
        }
        let signal = detect_code(text);
        if signal.code_like {
            if let Some(app) = self.tracker.pick_by_recency_and_content_type(
                timestamp,
                true,
                signal.language,
                true,
            ) {
                debug!(app = %app, language = ?signal.language, "Attributed code-like content");
                return app;
            }
        }
        self.tracker
            .last_app()
            .unwrap_or_else(|| UNKNOWN_APP.to_string())
    }

    /// Handle one clipboard change observed at `timestamp`
    pub fn on_clipboard_change(&self, text: &str, timestamp: DateTime<Utc>) -> Option<ClipboardEntry> {
        if text.is_empty() {
            return None;
        }
        if !self.gate.try_admit(timestamp) {
            trace!("Clipboard change inside capture pause, ignored");
            return None;
        }
        let app = self.attribute(text, timestamp);
        self.store.add_item_at(text, &app, timestamp)
    }
}
