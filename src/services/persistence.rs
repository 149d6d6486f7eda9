//! Persistence service — autosave of the in-memory database.
//!
//! DESIGN
//! ======
//! A background task flushes the database every autosave interval, and
//! immediately whenever a mutation requests a save. A flush snapshots the
//! database under the read lock, releases it, then writes the snapshot, so
//! CRUD calls never wait on disk I/O.
//!
//! ERROR HANDLING
//! ==============
//! The persisted revision advances only after a successful write. A failed
//! autosave is logged and leaves the store dirty, so the next cycle writes
//! the latest snapshot again. Mutations never observe autosave failures.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::error::BackendError;
use crate::state::SharedStore;

/// Spawn the background autosave task. Returns a handle for shutdown.
pub(crate) fn spawn_autosave_task(store: SharedStore, interval: Duration) -> JoinHandle<()> {
    // tokio intervals reject a zero period.
    let interval = interval.max(Duration::from_millis(1));
    info!(
        interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        location = %store.backend.location(),
        "autosave configured"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately; the store was just loaded.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = store.save_requested.notified() => {}
            }
            if let Err(e) = flush(&store).await {
                error!(error = %e, location = %store.backend.location(), "autosave flush failed");
            }
        }
    })
}

/// Ask the autosave task to flush soon. Never blocks.
pub(crate) fn request_save(store: &SharedStore) {
    store.save_requested.notify_one();
}

/// Write the current database if it changed since the last write.
///
/// Returns `true` when a snapshot was written.
///
/// # Errors
///
/// Returns the backend error if the write fails; the store stays dirty.
pub(crate) async fn flush(store: &SharedStore) -> Result<bool, BackendError> {
    let _guard = store.flush_lock.lock().await;

    // PHASE: SNAPSHOT
    // WHY: clone under the read lock, then perform I/O lock-free.
    let (revision, snapshot) = {
        let state = store.state.read().await;
        if !state.is_dirty() {
            return Ok(false);
        }
        (state.db.revision(), state.db.clone())
    };

    store.backend.persist(&snapshot).await?;

    // PHASE: ACK
    // EDGE: mutations made after the snapshot keep the store dirty.
    let mut state = store.state.write().await;
    state.persisted_revision = state.persisted_revision.max(revision);
    debug!(revision, documents = snapshot.document_count(), "store flushed");
    Ok(true)
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
