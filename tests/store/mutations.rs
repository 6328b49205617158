//! Put, remove, update and cache coherence

use crate::common::*;
use keyedstore::{Attribute, Page, ScalarValue, StoreError, VALUE_ATTRIBUTE};
use std::sync::atomic::Ordering;

// =============================================================================
// CACHE COHERENCE
// =============================================================================

#[tokio::test]
async fn test_remove_after_cached_read_yields_none() {
    let t = TestStore::readings().await;
    t.store.put("b1", Some(1.into()), "x").await.unwrap();
    assert!(t.store.get("b1", Some(1.into()), Page::all()).await.unwrap().is_some());

    t.store.remove("b1", Some(1.into())).await.unwrap();
    assert!(t.store.get("b1", Some(1.into()), Page::all()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_put_refreshes_cached_partition_read() {
    let t = TestStore::readings().await;
    t.store.put("b1", Some(1.into()), "x").await.unwrap();
    let before = t.store.get("b1", None, Page::all()).await.unwrap().unwrap();
    assert_eq!(before.len(), 1);

    t.store.put("b1", Some(2.into()), "y").await.unwrap();
    let after = t.store.get("b1", None, Page::all()).await.unwrap().unwrap();
    assert_eq!(after.len(), 2);
}

#[tokio::test]
async fn test_put_keeps_unrelated_cache_entries() {
    let t = TestStore::readings().await;
    t.store.put("b1", Some(1.into()), "x").await.unwrap();
    t.store.put("b2", Some(1.into()), "y").await.unwrap();
    t.store.get("b2", None, Page::all()).await.unwrap();

    t.store.put("b1", Some(2.into()), "z").await.unwrap();
    assert_eq!(t.store.cached_entries(), 1);
}

// =============================================================================
// KEY VALIDATION
// =============================================================================

#[tokio::test]
async fn test_mutations_without_sort_key_are_rejected() {
    let t = TestStore::readings().await;
    assert!(matches!(
        t.store.put("b1", None, "x").await,
        Err(StoreError::InvalidKeyUsage(_))
    ));
    assert!(matches!(
        t.store.remove("b1", None).await,
        Err(StoreError::InvalidKeyUsage(_))
    ));
    assert!(matches!(
        t.store.update("b1", None, vec![Attribute::new("a", 1)]).await,
        Err(StoreError::InvalidKeyUsage(_))
    ));
    assert_eq!(t.backend.calls.total(), 0);
}

#[tokio::test]
async fn test_remove_missing_item_is_not_found() {
    let t = TestStore::nodes().await;
    let err = t.store.remove(404, None).await.unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// ARRAY PUT
// =============================================================================

#[tokio::test]
async fn test_array_put_issues_one_put_per_element_under_same_key() {
    let t = TestStore::readings().await;
    t.store
        .put("b1", Some(5.into()), vec!["a", "b", "c"])
        .await
        .unwrap();

    let puts = t.backend.puts();
    assert_eq!(puts.len(), 3);
    for item in &puts {
        assert_eq!(item["Beacon"], ScalarValue::from("b1"));
        assert_eq!(item["At"], ScalarValue::from(5));
    }
    let mut values: Vec<_> = puts.iter().map(|i| i[VALUE_ATTRIBUTE].clone()).collect();
    values.sort();
    assert_eq!(values, vec!["a".into(), "b".into(), "c".into()]);
}

#[tokio::test]
async fn test_array_put_fails_if_any_element_fails() {
    let t = TestStore::readings().await;
    t.backend.fail_nth_put(2);

    let err = t
        .store
        .put("b1", Some(5.into()), vec!["a", "b", "c"])
        .await
        .unwrap_err();
    assert!(err.is_backend());
    assert_eq!(t.backend.calls.put_item.load(Ordering::SeqCst), 3);
}

// =============================================================================
// UPDATE
// =============================================================================

#[tokio::test]
async fn test_update_replaces_whole_item() {
    let t = TestStore::nodes().await;
    t.store.put(1, None, "old").await.unwrap();

    let replaced = t
        .store
        .update(1, None, vec![Attribute::new("positionX", 3.5)])
        .await
        .unwrap();
    assert_eq!(
        replaced.previous.unwrap()[VALUE_ATTRIBUTE],
        ScalarValue::from("old")
    );

    let item = t.backend.memory().item_count("Nodes");
    assert_eq!(item, Some(1));
    assert!(t.store.get(1, None, Page::all()).await.unwrap().unwrap()[0]
        .get(VALUE_ATTRIBUTE)
        .is_none());
}

#[tokio::test]
async fn test_update_stops_when_remove_fails() {
    let t = TestStore::nodes().await;
    t.store.put(1, None, "old").await.unwrap();
    t.backend.reset_counts();
    t.backend.fail_deletes();

    let err = t
        .store
        .update(1, None, vec![Attribute::new("positionX", 1)])
        .await
        .unwrap_err();
    assert!(err.is_backend());
    assert_eq!(t.backend.calls.put_item.load(Ordering::SeqCst), 0);
}
