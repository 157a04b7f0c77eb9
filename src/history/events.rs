//! Change notification
//!
//! Listeners are snapshotted under a short lock and invoked after the store
//! has released its own lock. Each invocation is isolated: a panicking
//! listener is logged and the remaining listeners still run.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use super::types::{ClipboardEntry, EntryId};
use crate::boards::Board;

/// An externally visible store mutation
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    /// A new entry was inserted
    Added(ClipboardEntry),
    /// A duplicate copy refreshed an existing entry
    Refreshed(ClipboardEntry),
    Pinned(EntryId),
    Unpinned(EntryId),
    /// Temporary entries removed by the expiry sweep
    Expired(Vec<EntryId>),
    /// Oldest unpinned entries removed by the capacity bound
    Evicted(Vec<EntryId>),
    /// Entry removed on request
    Deleted(EntryId),
    /// Entries whose board changed, with their new board
    Reclassified(Vec<(EntryId, Board)>),
}

pub type Listener = Arc<dyn Fn(&HistoryEvent) + Send + Sync>;

/// Handle returned by registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub(crate) struct ListenerBus {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl ListenerBus {
    pub(crate) fn add(&mut self, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub(crate) fn snapshot(&self) -> Vec<Listener> {
        self.listeners.iter().map(|(_, l)| l.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

/// Deliver `events` to every listener in registration order
pub(crate) fn dispatch(listeners: &[Listener], events: &[HistoryEvent]) {
    for event in events {
        for listener in listeners {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| listener(event)));
            if delivered.is_err() {
                warn!(event = event_kind(event), "History listener panicked, continuing");
            }
        }
    }
}

fn event_kind(event: &HistoryEvent) -> &'static str {
    match event {
        HistoryEvent::Added(_) => "added",
        HistoryEvent::Refreshed(_) => "refreshed",
        HistoryEvent::Pinned(_) => "pinned",
        HistoryEvent::Unpinned(_) => "unpinned",
        HistoryEvent::Expired(_) => "expired",
        HistoryEvent::Evicted(_) => "evicted",
        HistoryEvent::Deleted(_) => "deleted",
        HistoryEvent::Reclassified(_) => "reclassified",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_panicking_listener_does_not_block_others() {
        let mut bus = ListenerBus::default();
        let calls = Arc::new(AtomicUsize::new(0));

        bus.add(Arc::new(|_: &HistoryEvent| panic!("listener bug")));
        let counter = calls.clone();
        bus.add(Arc::new(move |_: &HistoryEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let events = vec![
            HistoryEvent::Pinned(EntryId::from("a")),
            HistoryEvent::Unpinned(EntryId::from("a")),
        ];
        dispatch(&bus.snapshot(), &events);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_remove_listener() {
        let mut bus = ListenerBus::default();
        let id = bus.add(Arc::new(|_: &HistoryEvent| {}));
        assert_eq!(bus.len(), 1);
        assert!(bus.remove(id));
        assert!(!bus.remove(id), "second removal is a no-op");
        assert_eq!(bus.len(), 0);
    }
}
