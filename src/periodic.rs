//! Timer-driven background tasks
//!
//! Both background jobs in the engine (the expiry sweep and the focus
//! poller) run on a [`PeriodicTask`]: a named thread that calls a tick
//! closure every `interval` until told to stop. Stopping is prompt: the
//! thread waits on a stop channel with `recv_timeout`, so `stop()` returns
//! after at most one in-flight tick instead of a full interval.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Returned by a tick to keep the task alive or end it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Handle to a running periodic task.
///
/// Dropping the handle stops and joins the thread.
pub struct PeriodicTask {
    name: &'static str,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawn a thread that calls `tick` every `interval`.
    ///
    /// The first tick happens one interval after spawning.
    pub fn spawn<F>(name: &'static str, interval: Duration, mut tick: F) -> std::io::Result<Self>
    where
        F: FnMut() -> TickControl + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name(format!("copypaste-{}", name))
            .spawn(move || {
                info!(
                    task = name,
                    interval_ms = interval.as_millis() as u64,
                    "Periodic task started"
                );
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if tick() == TickControl::Stop {
                                debug!(task = name, "Tick requested stop");
                                break;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!(task = name, "Periodic task stopping");
            })?;

        Ok(PeriodicTask {
            name,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True until the thread has exited
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the thread and wait for it to exit.
    ///
    /// Safe to call more than once. When called from the task's own thread
    /// (a tick dropping the last owner of the task) the join is skipped.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            let _ = handle.join();
            debug!(task = self.name, "Periodic task joined");
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn test_ticks_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let mut task = PeriodicTask::spawn("test-ticks", Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            TickControl::Continue
        })
        .unwrap();

        thread::sleep(Duration::from_millis(120));
        task.stop();
        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "expected several ticks, got {}", after_stop);
        assert!(!task.is_running());

        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), after_stop, "no ticks after stop");
    }

    #[test]
    fn test_stop_is_prompt_with_long_interval() {
        let mut task =
            PeriodicTask::spawn("test-prompt", Duration::from_secs(60), || TickControl::Continue)
                .unwrap();
        let start = Instant::now();
        task.stop();
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_tick_can_end_task() {
        let task = PeriodicTask::spawn("test-self-stop", Duration::from_millis(5), || {
            TickControl::Stop
        })
        .unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(!task.is_running());
    }

    #[test]
    fn test_stop_twice_is_noop() {
        let mut task =
            PeriodicTask::spawn("test-twice", Duration::from_millis(5), || TickControl::Continue)
                .unwrap();
        task.stop();
        task.stop();
        assert_eq!(task.name(), "test-twice");
    }
}
