use std::collections::HashSet;

use serde_json::{Value, json};

use super::*;
use crate::db::backend::MemoryBackend;
use crate::error::ErrorCode;
use crate::state::test_helpers::{dummy_widget, memory_store};
use crate::widget::WidgetPatch;

// =============================================================================
// add_item
// =============================================================================

#[tokio::test]
async fn add_distinct_ids_both_retrievable() {
    let (store, _) = memory_store().await;
    let w1 = dummy_widget("one");
    let w2 = dummy_widget("two");
    store.add_item(&w1).await.unwrap();
    store.add_item(&w2).await.unwrap();

    assert_eq!(store.get_item_by_id("one").await.unwrap(), w1);
    assert_eq!(store.get_item_by_id("two").await.unwrap(), w2);
}

#[tokio::test]
async fn add_duplicate_fails_and_keeps_original() {
    let (store, _) = memory_store().await;
    let original = dummy_widget("a");
    store.add_item(&original).await.unwrap();

    let err = store
        .add_item(&Widget::new("a", "impostor"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "E_DUPLICATE_ID");
    assert_eq!(store.get_item_by_id("a").await.unwrap(), original);
    assert_eq!(store.get_widget_list().await.len(), 1);
}

#[tokio::test]
async fn add_nil_is_validation_error() {
    let (store, _) = memory_store().await;
    let none: Option<Widget> = None;
    let err = store.add_item(&none).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.get_widget_list().await.is_empty());
    assert!(!store.is_dirty().await);
}

#[tokio::test]
async fn add_without_id_generates_one() {
    let (store, _) = memory_store().await;
    let widget = store
        .add_item(&json!({"text": "anonymous", "code": "1 + 1"}))
        .await
        .unwrap();
    assert!(!widget.id.is_empty());
    assert!(store.id_exists(&widget.id).await);
}

#[tokio::test]
async fn many_generated_ids_never_collide() {
    let (store, _) = memory_store().await;
    let mut ids = HashSet::new();
    for i in 0..1000 {
        let widget = store
            .add_item(&WidgetPatch::default().text(format!("w{i}")))
            .await
            .unwrap();
        ids.insert(widget.id);
    }
    assert_eq!(ids.len(), 1000);
    assert_eq!(store.get_widget_list().await.len(), 1000);
}

// =============================================================================
// upsert_item
// =============================================================================

#[tokio::test]
async fn upsert_new_id_behaves_like_add() {
    let (upserted, _) = memory_store().await;
    let (added, _) = memory_store().await;
    let widget = dummy_widget("a");

    upserted.upsert_item(&widget).await.unwrap();
    added.add_item(&widget).await.unwrap();

    assert_eq!(upserted.get_item_by_id("a").await, added.get_item_by_id("a").await);
    assert_eq!(upserted.get_widget_list().await, added.get_widget_list().await);
}

#[tokio::test]
async fn upsert_existing_merges_fields() {
    let (store, _) = memory_store().await;
    store
        .add_item(&json!({"id": "a", "text": "t", "description": "d"}))
        .await
        .unwrap();

    let merged = store
        .upsert_item(&json!({"id": "a", "description": "d2"}))
        .await
        .unwrap();
    assert_eq!(merged.text, "t");
    assert_eq!(merged.description, "d2");

    let stored = serde_json::to_value(store.get_item_by_id("a").await.unwrap()).unwrap();
    assert_eq!(stored["id"], json!("a"));
    assert_eq!(stored["text"], json!("t"));
    assert_eq!(stored["description"], json!("d2"));
}

#[tokio::test]
async fn upsert_replaces_data_payload_wholesale() {
    let (store, _) = memory_store().await;
    store.add_item(&dummy_widget("a")).await.unwrap();
    store
        .upsert_item(&WidgetPatch::with_id("a").data(json!({"series": [4, 5]})))
        .await
        .unwrap();

    let widget = store.get_item_by_id("a").await.unwrap();
    assert_eq!(widget.data, json!({"series": [4, 5]}));
    assert_eq!(widget.code, "return [1, 2, 3];");
}

#[tokio::test]
async fn upsert_twice_equals_once() {
    let (once, _) = memory_store().await;
    let (twice, _) = memory_store().await;
    for store in [&once, &twice] {
        store.add_item(&dummy_widget("a")).await.unwrap();
    }
    let patch = WidgetPatch::with_id("a").text("renamed").visualization("chart");

    once.upsert_item(&patch).await.unwrap();
    twice.upsert_item(&patch).await.unwrap();
    twice.upsert_item(&patch).await.unwrap();

    assert_eq!(once.get_item_by_id("a").await, twice.get_item_by_id("a").await);
    assert_eq!(once.get_widget_list().await, twice.get_widget_list().await);
}

#[tokio::test]
async fn upsert_nil_is_validation_error() {
    let (store, _) = memory_store().await;
    store.add_item(&dummy_widget("a")).await.unwrap();
    let before = store.get_item_by_id("a").await;

    let err = store.upsert_item(&Value::Null).await.unwrap_err();
    assert_eq!(err.error_code(), "E_VALIDATION");
    assert_eq!(store.get_item_by_id("a").await, before);
    assert_eq!(store.get_widget_list().await.len(), 1);
}

#[tokio::test]
async fn upsert_malformed_patch_leaves_record_untouched() {
    let (store, _) = memory_store().await;
    store.add_item(&dummy_widget("a")).await.unwrap();
    let before = store.get_item_by_id("a").await;

    let err = store
        .upsert_item(&json!({"id": "a", "text": ["not", "a", "string"]}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.get_item_by_id("a").await, before);
}

// =============================================================================
// remove_item / lookups
// =============================================================================

#[tokio::test]
async fn remove_absent_id_is_noop() {
    let (store, _) = memory_store().await;
    store.add_item(&dummy_widget("a")).await.unwrap();
    let before = store.get_widget_list().await;

    assert_eq!(store.remove_item("x").await, 0);
    assert_eq!(store.get_widget_list().await, before);
}

#[tokio::test]
async fn remove_existing_id() {
    let (store, _) = memory_store().await;
    store.add_item(&dummy_widget("a")).await.unwrap();
    store.add_item(&dummy_widget("b")).await.unwrap();

    assert_eq!(store.remove_item("a").await, 1);
    assert!(!store.id_exists("a").await);
    assert!(store.id_exists("b").await);
}

#[tokio::test]
async fn removed_id_can_be_added_again() {
    let (store, _) = memory_store().await;
    store.add_item(&dummy_widget("a")).await.unwrap();
    store.remove_item("a").await;
    store.add_item(&Widget::new("a", "again")).await.unwrap();
    assert_eq!(store.get_item_by_id("a").await.unwrap().text, "again");
}

#[tokio::test]
async fn get_item_by_id_unknown_is_none() {
    let (store, _) = memory_store().await;
    assert!(store.get_item_by_id("never").await.is_none());
    assert!(!store.id_exists("never").await);
}

#[tokio::test]
async fn widget_list_projects_id_and_text_only() {
    let (store, _) = memory_store().await;
    for id in ["b", "a", "c"] {
        store.add_item(&dummy_widget(id)).await.unwrap();
    }

    let list = store.get_widget_list().await;
    let ids: Vec<_> = list.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
    assert_eq!(list[0].text, "widget b");

    let value = serde_json::to_value(&list[0]).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys.len(), 2);
    assert!(keys.contains(&"id".to_owned()));
    assert!(keys.contains(&"text".to_owned()));
}

// =============================================================================
// persistence through the facade
// =============================================================================

#[tokio::test]
async fn flush_writes_backend_and_clears_dirty() {
    let (store, backend) = memory_store().await;
    store.add_item(&dummy_widget("a")).await.unwrap();
    assert!(store.is_dirty().await);

    store.flush().await.unwrap();
    assert!(!store.is_dirty().await);
    assert_eq!(backend.persisted().unwrap().document_count(), 1);
}

#[tokio::test]
async fn reopen_over_same_backend_sees_persisted_records() {
    let backend = MemoryBackend::new();
    let first = WidgetStore::open(Arc::new(backend.clone()), None)
        .await
        .unwrap();
    first.add_item(&dummy_widget("a")).await.unwrap();
    first
        .upsert_item(&WidgetPatch::with_id("a").text("edited"))
        .await
        .unwrap();
    first.close().await.unwrap();

    let second = WidgetStore::open(Arc::new(backend), None).await.unwrap();
    let widget = second.get_item_by_id("a").await.unwrap();
    assert_eq!(widget.text, "edited");
    assert_eq!(widget.data, dummy_widget("a").data);
    assert!(!second.is_dirty().await);
}

#[tokio::test]
async fn autosave_persists_without_explicit_flush() {
    let backend = MemoryBackend::new();
    let store = WidgetStore::open(Arc::new(backend.clone()), Some(Duration::from_millis(20)))
        .await
        .unwrap();
    store.add_item(&dummy_widget("a")).await.unwrap();

    for _ in 0..100 {
        if backend.persisted().is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(backend.persisted().unwrap().document_count(), 1);
}

#[tokio::test]
async fn init_with_corrupt_file_is_storage_init_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "[[[").unwrap();

    let result = WidgetStore::init(StoreConfig::default().with_path(&path)).await;
    let Err(err) = result else {
        panic!("corrupt store should not open");
    };
    assert_eq!(err.error_code(), "E_STORAGE_INIT");
}
