//! Background expiry sweep

use std::sync::Weak;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use super::{HistoryStore, StoreInner};
use crate::periodic::{PeriodicTask, TickControl};

/// Start a sweeper that removes expired temporaries every `interval`.
///
/// The task ends on its own once the store has been dropped.
pub(super) fn spawn(store: Weak<StoreInner>, interval: Duration) -> std::io::Result<PeriodicTask> {
    PeriodicTask::spawn("expiry-sweeper", interval, move || {
        let Some(inner) = store.upgrade() else {
            debug!("History store dropped, sweeper exiting");
            return TickControl::Stop;
        };
        HistoryStore::from_inner(inner).sweep_expired_at(Utc::now());
        TickControl::Continue
    })
}
