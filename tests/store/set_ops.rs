//! Union and difference on stored JSON documents

use crate::common::*;
use keyedstore::{Page, Scalars, StoreError, VALUE_ATTRIBUTE};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;

fn field(name: &str, values: impl Into<Scalars>) -> Vec<(String, Scalars)> {
    vec![(name.to_string(), values.into())]
}

async fn stored_document(t: &TestStore, name: &str) -> Value {
    let rows = t.store.get(name, None, Page::all()).await.unwrap().unwrap();
    serde_json::from_str(rows[0][VALUE_ATTRIBUTE].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_union_then_difference() {
    let t = TestStore::floorplans().await;
    t.store
        .put("ground", None, json!({"tags": ["a", "b"]}).to_string())
        .await
        .unwrap();

    let doc = t.store.union("ground", None, field("tags", vec!["c"])).await.unwrap();
    assert_eq!(doc["tags"], json!(["a", "b", "c"]));

    let doc = t
        .store
        .difference("ground", None, field("tags", vec!["a"]))
        .await
        .unwrap();
    assert_eq!(doc["tags"], json!(["b", "c"]));
    assert_eq!(stored_document(&t, "ground").await, doc);
}

#[tokio::test]
async fn test_union_result_is_visible_through_cached_reads() {
    let t = TestStore::floorplans().await;
    t.store.put("ground", None, json!({"ids": []}).to_string()).await.unwrap();
    assert_eq!(stored_document(&t, "ground").await, json!({"ids": []}));

    t.store.union("ground", None, field("ids", vec![1, 2])).await.unwrap();
    assert_eq!(stored_document(&t, "ground").await, json!({"ids": [1, 2]}));
}

#[tokio::test]
async fn test_set_op_on_missing_item_makes_no_put() {
    let t = TestStore::floorplans().await;
    let err = t.store.union("nowhere", None, field("tags", "a")).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(t.backend.calls.put_item.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_set_op_writes_previous_item_back_once() {
    let t = TestStore::floorplans().await;
    t.store
        .put("ground", None, json!({"tags": "not an array"}).to_string())
        .await
        .unwrap();
    t.backend.reset_counts();

    let err = t
        .store
        .union("ground", None, field("tags", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::WrongType { .. }));
    assert_eq!(t.backend.calls.put_item.load(Ordering::SeqCst), 1);
    assert_eq!(
        stored_document(&t, "ground").await,
        json!({"tags": "not an array"})
    );
}

#[tokio::test]
async fn test_remove_failure_short_circuits() {
    let t = TestStore::floorplans().await;
    t.store.put("ground", None, "{}").await.unwrap();
    t.backend.reset_counts();
    t.backend.fail_deletes();

    let err = t
        .store
        .difference("ground", None, field("tags", "x"))
        .await
        .unwrap_err();
    assert!(err.is_backend());
    assert_eq!(t.backend.calls.put_item.load(Ordering::SeqCst), 0);
    assert_eq!(
        t.backend.memory().item_count("Floorplans"),
        Some(1)
    );
}
