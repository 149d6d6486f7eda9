//! `WidgetStore` — the public gateway to widget persistence.
//!
//! DESIGN
//! ======
//! A store value exists only after its initial load finished, so no CRUD
//! call can race the load. Dropping the store stops autosave without a
//! final write; call [`WidgetStore::close`] or [`WidgetStore::flush`] to
//! guarantee the latest state reached the backend.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::db::backend::{Backend, FileBackend};
use crate::error::StoreError;
use crate::services::{persistence, widgets};
use crate::state::SharedStore;
use crate::widget::{Widget, WidgetSummary};

pub struct WidgetStore {
    shared: SharedStore,
    autosave: Option<JoinHandle<()>>,
}

impl WidgetStore {
    /// Open the file-backed store described by `config`, loading any
    /// existing data and starting autosave.
    ///
    /// # Errors
    ///
    /// Returns `StorageInit` if the file cannot be read or parsed, or its
    /// directory cannot be created.
    pub async fn init(config: StoreConfig) -> Result<Self, StoreError> {
        let backend = Arc::new(FileBackend::new(&config.path));
        let autosave_interval = config.autosave.then_some(config.autosave_interval);
        Self::open(backend, autosave_interval).await
    }

    /// Open a store over any backend. `None` disables the autosave task.
    ///
    /// # Errors
    ///
    /// Returns `StorageInit` if the backend fails to load.
    pub async fn open(backend: Arc<dyn Backend>, autosave_interval: Option<Duration>) -> Result<Self, StoreError> {
        let db = backend
            .load()
            .await
            .map_err(StoreError::StorageInit)?
            .unwrap_or_default();

        info!(
            location = %backend.location(),
            collections = db.collection_names().count(),
            documents = db.document_count(),
            "widget store loaded"
        );

        let shared = SharedStore::new(db, backend);
        let autosave = autosave_interval.map(|interval| persistence::spawn_autosave_task(shared.clone(), interval));
        Ok(Self { shared, autosave })
    }

    /// Insert a new widget and return it as stored.
    ///
    /// Any serializable record is accepted; a missing `id` is generated.
    ///
    /// # Errors
    ///
    /// `Validation` for nil or malformed input, `DuplicateId` if the id is
    /// taken. State is untouched on error.
    pub async fn add_item<T>(&self, item: &T) -> Result<Widget, StoreError>
    where
        T: Serialize + ?Sized,
    {
        widgets::add_item(&self.shared, item).await
    }

    /// Shallow-merge `item` onto the widget with the same id, or insert it.
    ///
    /// # Errors
    ///
    /// `Validation` for nil or malformed input. State is untouched on error.
    pub async fn upsert_item<T>(&self, item: &T) -> Result<Widget, StoreError>
    where
        T: Serialize + ?Sized,
    {
        widgets::upsert_item(&self.shared, item).await
    }

    /// Remove the widget(s) with `id`. Missing ids are a no-op.
    pub async fn remove_item(&self, id: &str) -> usize {
        widgets::remove_item(&self.shared, id).await
    }

    pub async fn get_item_by_id(&self, id: &str) -> Option<Widget> {
        widgets::get_item_by_id(&self.shared, id).await
    }

    pub async fn id_exists(&self, id: &str) -> bool {
        self.get_item_by_id(id).await.is_some()
    }

    /// `{id, text}` of every widget, in insertion order.
    pub async fn get_widget_list(&self) -> Vec<WidgetSummary> {
        widgets::get_widget_list(&self.shared).await
    }

    /// True if changes exist that have not reached the backend.
    pub async fn is_dirty(&self) -> bool {
        self.shared.state.read().await.is_dirty()
    }

    /// Write pending changes now.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend write fails; changes stay pending.
    pub async fn flush(&self) -> Result<(), StoreError> {
        persistence::flush(&self.shared).await?;
        Ok(())
    }

    /// Stop autosave and write pending changes.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the final write fails.
    pub async fn close(mut self) -> Result<(), StoreError> {
        if let Some(handle) = self.autosave.take() {
            handle.abort();
        }
        self.flush().await
    }
}

impl Drop for WidgetStore {
    fn drop(&mut self) {
        if let Some(handle) = self.autosave.take() {
            handle.abort();
        }
        if let Ok(state) = self.shared.state.try_read() {
            if state.is_dirty() {
                warn!(location = %self.shared.backend.location(), "widget store dropped with unsaved changes");
            }
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
