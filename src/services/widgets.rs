//! Widget service — add, upsert, remove, and lookups on the `Widgets`
//! collection.
//!
//! DESIGN
//! ======
//! Inputs are normalized by `check_item` before the lock is taken, so a
//! rejected input never touches state. Mutations update the in-memory
//! database immediately and request a save; durability is the
//! persistence service's job. Reads and removals treat a missing
//! collection as empty instead of creating it; only inserts provision it.

use serde::Serialize;
use tracing::{debug, warn};

use crate::db::Database;
use crate::error::StoreError;
use crate::services::persistence;
use crate::state::SharedStore;
use crate::widget::{Document, Widget, WidgetSummary, check_item, document_id, has_id, merge_into};

pub const WIDGET_COLLECTION: &str = "Widgets";

// =============================================================================
// ADD
// =============================================================================

/// Insert a new widget.
///
/// # Errors
///
/// Returns `Validation` for unusable input and `DuplicateId` if the id is
/// already stored. Neither mutates state.
pub(crate) async fn add_item<T>(store: &SharedStore, item: &T) -> Result<Widget, StoreError>
where
    T: Serialize + ?Sized,
{
    let doc = check_item(item)?;
    let widget = {
        let mut state = store.state.write().await;
        insert_unique(&mut state.db, doc)?
    };
    persistence::request_save(store);
    Ok(widget)
}

fn insert_unique(db: &mut Database, doc: Document) -> Result<Widget, StoreError> {
    let id = document_id(&doc).unwrap_or_default().to_owned();

    // Checked before get_or_create so a failed add leaves no empty collection.
    let exists = db
        .get_collection(WIDGET_COLLECTION)
        .is_some_and(|coll| coll.find_one(|d| has_id(d, &id)).is_some());
    if exists {
        warn!(id = %id, "rejecting duplicate widget id");
        return Err(StoreError::DuplicateId(id));
    }

    let widget = Widget::from_document(&doc);
    db.get_or_create_collection(WIDGET_COLLECTION).insert(doc);
    debug!(id = %id, collection = WIDGET_COLLECTION, "widget added");
    Ok(widget)
}

// =============================================================================
// UPSERT
// =============================================================================

/// Merge `item` onto the stored widget with the same id, or insert it.
///
/// Fields present in `item` overwrite; absent fields are preserved.
///
/// # Errors
///
/// Returns `Validation` for unusable input.
pub(crate) async fn upsert_item<T>(store: &SharedStore, item: &T) -> Result<Widget, StoreError>
where
    T: Serialize + ?Sized,
{
    let patch = check_item(item)?;
    let id = document_id(&patch).unwrap_or_default().to_owned();

    let widget = {
        let mut state = store.state.write().await;
        let mut merged = None;
        if let Some(coll) = state.db.get_collection_mut(WIDGET_COLLECTION) {
            coll.update_where(
                |d| has_id(d, &id),
                |d| {
                    merge_into(d, &patch);
                    merged = Some(Widget::from_document(d));
                },
            );
        }

        match merged {
            Some(widget) => {
                debug!(id = %id, collection = WIDGET_COLLECTION, "widget updated");
                widget
            }
            None => insert_unique(&mut state.db, patch)?,
        }
    };
    persistence::request_save(store);
    Ok(widget)
}

// =============================================================================
// REMOVE
// =============================================================================

/// Remove every widget with `id`. Returns how many were removed; zero is
/// not an error.
pub(crate) async fn remove_item(store: &SharedStore, id: &str) -> usize {
    let removed = {
        let mut state = store.state.write().await;
        state
            .db
            .get_collection_mut(WIDGET_COLLECTION)
            .map_or(0, |coll| coll.remove_where(|d| has_id(d, id)))
    };
    if removed > 0 {
        debug!(id, removed, collection = WIDGET_COLLECTION, "widget removed");
        persistence::request_save(store);
    }
    removed
}

// =============================================================================
// LOOKUPS
// =============================================================================

pub(crate) async fn get_item_by_id(store: &SharedStore, id: &str) -> Option<Widget> {
    let state = store.state.read().await;
    state
        .db
        .get_collection(WIDGET_COLLECTION)?
        .find_one(|d| has_id(d, id))
        .map(Widget::from_document)
}

pub(crate) async fn get_widget_list(store: &SharedStore) -> Vec<WidgetSummary> {
    let state = store.state.read().await;
    state
        .db
        .get_collection(WIDGET_COLLECTION)
        .map(|coll| coll.iter().map(WidgetSummary::from_document).collect())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "widgets_test.rs"]
mod tests;
