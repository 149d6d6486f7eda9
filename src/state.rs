//! Shared store state.
//!
//! DESIGN
//! ======
//! `SharedStore` is cloned into the autosave task and held by the
//! `WidgetStore` facade. It owns the in-memory database behind one lock,
//! the backend it mirrors to, and the signal used to request a save after
//! each mutation. The in-memory database is authoritative; the backend is
//! eventually consistent with it.

use std::sync::Arc;

use tokio::sync::{Mutex, Notify, RwLock};

use crate::db::Database;
use crate::db::backend::Backend;

// =============================================================================
// STORE STATE
// =============================================================================

/// In-memory database plus the revision last written to the backend.
pub(crate) struct StoreState {
    pub db: Database,
    pub persisted_revision: u64,
}

impl StoreState {
    /// State freshly loaded from the backend, therefore clean.
    pub fn loaded(db: Database) -> Self {
        let persisted_revision = db.revision();
        Self { db, persisted_revision }
    }

    pub fn is_dirty(&self) -> bool {
        self.db.revision() > self.persisted_revision
    }
}

// =============================================================================
// SHARED STORE
// =============================================================================

#[derive(Clone)]
pub(crate) struct SharedStore {
    pub state: Arc<RwLock<StoreState>>,
    pub backend: Arc<dyn Backend>,
    /// Serializes flushes so an older snapshot never lands after a newer one.
    pub flush_lock: Arc<Mutex<()>>,
    pub save_requested: Arc<Notify>,
}

impl SharedStore {
    pub fn new(db: Database, backend: Arc<dyn Backend>) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::loaded(db))),
            backend,
            flush_lock: Arc::new(Mutex::new(())),
            save_requested: Arc::new(Notify::new()),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use serde_json::json;

    use crate::db::backend::MemoryBackend;
    use crate::store::WidgetStore;
    use crate::widget::Widget;

    /// Store over a fresh in-memory backend with autosave off.
    pub async fn memory_store() -> (WidgetStore, MemoryBackend) {
        let backend = MemoryBackend::new();
        let store = WidgetStore::open(std::sync::Arc::new(backend.clone()), None)
            .await
            .expect("memory backend never fails to load");
        (store, backend)
    }

    /// Fully populated widget for tests.
    #[must_use]
    pub fn dummy_widget(id: &str) -> Widget {
        let mut widget = Widget::new(id, format!("widget {id}"));
        widget.description = "test widget".into();
        widget.visualization = "graph".into();
        widget.code = "return [1, 2, 3];".into();
        widget.data = json!({"nodes": [{"id": 1}], "edges": []});
        widget
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
