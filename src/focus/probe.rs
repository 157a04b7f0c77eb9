//! Focus probes
//!
//! A probe answers "which app is frontmost right now". Real probes are
//! platform specific (accessibility APIs, window-server queries, shell
//! helpers) and live outside this crate; they plug in through
//! [`FocusProbe`]. Probe output is best-effort: it may be absent, wrong, or
//! this tool's own name, and the tracker filters accordingly.
//!
//! [`FocusPoller`] samples a probe on a fixed interval into a
//! [`FocusHistoryTracker`]. Push-based observers call
//! [`FocusHistoryTracker::record`] directly.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use super::FocusHistoryTracker;
use crate::periodic::{PeriodicTask, TickControl};

/// Synchronous "who is frontmost" query
pub trait FocusProbe: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str {
        "probe"
    }

    /// Current frontmost app, or `None` when unavailable.
    ///
    /// Implementations must return within a small bounded time.
    fn frontmost_app(&self) -> Option<String>;
}

impl<F> FocusProbe for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn frontmost_app(&self) -> Option<String> {
        self()
    }
}

/// Take one sample from `probe` and record it.
///
/// A panicking probe is treated as "no signal". Returns whether a new
/// transition was recorded.
pub fn sample_once(tracker: &FocusHistoryTracker, probe: &dyn FocusProbe) -> bool {
    let observed = panic::catch_unwind(AssertUnwindSafe(|| probe.frontmost_app()));
    match observed {
        Ok(Some(app)) => tracker.record(&app, Utc::now()),
        Ok(None) => false,
        Err(_) => {
            warn!(probe = probe.name(), "Focus probe panicked, ignoring sample");
            false
        }
    }
}

/// Periodic sampler feeding a tracker
#[derive(Debug)]
pub struct FocusPoller {
    task: PeriodicTask,
}

impl FocusPoller {
    /// Seed the tracker with an immediate sample, then sample every `interval`.
    pub fn start(
        tracker: Arc<FocusHistoryTracker>,
        probe: Arc<dyn FocusProbe>,
        interval: Duration,
    ) -> std::io::Result<Self> {
        info!(
            probe = probe.name(),
            interval_ms = interval.as_millis() as u64,
            "Starting focus poller"
        );
        sample_once(&tracker, probe.as_ref());

        let task = PeriodicTask::spawn("focus-poller", interval, move || {
            sample_once(&tracker, probe.as_ref());
            TickControl::Continue
        })?;
        Ok(FocusPoller { task })
    }

    /// `start` using the tracker's configured poll interval
    pub fn start_default(
        tracker: Arc<FocusHistoryTracker>,
        probe: Arc<dyn FocusProbe>,
    ) -> std::io::Result<Self> {
        let interval = tracker.config().poll_interval();
        Self::start(tracker, probe, interval)
    }

    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }

    /// Stop sampling; returns within one interval
    pub fn stop(&mut self) {
        self.task.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FocusConfig;
    use parking_lot::Mutex;
    use std::thread;
    use std::time::Instant;

    struct ScriptedProbe {
        apps: Mutex<Vec<&'static str>>,
    }

    impl FocusProbe for ScriptedProbe {
        fn name(&self) -> &str {
            "scripted"
        }

        fn frontmost_app(&self) -> Option<String> {
            let mut apps = self.apps.lock();
            if apps.is_empty() {
                None
            } else {
                Some(apps.remove(0).to_string())
            }
        }
    }

    #[test]
    fn test_sample_once_records_closure_probe() {
        let tracker = FocusHistoryTracker::new(FocusConfig::default());
        let probe = || Some("Google Chrome".to_string());
        assert!(sample_once(&tracker, &probe));
        assert!(!sample_once(&tracker, &probe), "unchanged app is not a transition");
        assert_eq!(tracker.last_app().as_deref(), Some("Chrome"));
    }

    #[test]
    fn test_sample_once_survives_panicking_probe() {
        let tracker = FocusHistoryTracker::new(FocusConfig::default());
        let probe = || -> Option<String> { panic!("probe exploded") };
        assert!(!sample_once(&tracker, &probe));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_poller_seeds_immediately_and_samples() {
        let tracker = Arc::new(FocusHistoryTracker::new(FocusConfig::default()));
        let probe = Arc::new(ScriptedProbe {
            apps: Mutex::new(vec!["Safari", "Slack", "Notes"]),
        });
        let mut poller =
            FocusPoller::start(tracker.clone(), probe, Duration::from_millis(10)).unwrap();
        assert_eq!(tracker.len(), 1, "seed sample taken synchronously");

        thread::sleep(Duration::from_millis(150));
        poller.stop();
        assert!(!poller.is_running());
        let apps: Vec<String> = tracker.events().into_iter().map(|e| e.app).collect();
        assert_eq!(apps, vec!["Safari", "Slack", "Notes"]);
    }

    #[test]
    fn test_poller_stops_promptly() {
        let tracker = Arc::new(FocusHistoryTracker::new(FocusConfig::default()));
        let probe: Arc<dyn FocusProbe> = Arc::new(|| None::<String>);
        let mut poller = FocusPoller::start(tracker, probe, Duration::from_secs(30)).unwrap();
        let start = Instant::now();
        poller.stop();
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
