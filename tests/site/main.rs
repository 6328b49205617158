//! Site Integration Tests
//!
//! Tests for the four-table deployment facade.
//!
//! ```bash
//! cargo test --test site
//! ```

#[path = "../common/mod.rs"]
mod common;

use common::*;
use keyedstore::prelude::*;
use keyedstore::BackendErrorKind;
use std::sync::Arc;

async fn open_site() -> (Site, Arc<RecordingBackend>) {
    init_tracing();
    let backend = Arc::new(RecordingBackend::new(Arc::new(MemoryBackend::new())));
    let site = Site::open(backend.clone()).await.unwrap();
    (site, backend)
}

// =============================================================================
// OPEN
// =============================================================================

#[tokio::test]
async fn test_open_creates_all_tables() {
    let (site, backend) = open_site().await;
    let memory = backend.memory();
    for table in ["Nodes", "Beacons", "Rooms", "Floorplans"] {
        assert_eq!(memory.item_count(table), Some(0), "table {}", table);
    }
    assert!(site.nodes.is_initialized());
    assert!(site.floorplans.is_initialized());
}

#[tokio::test]
async fn test_reopen_reuses_existing_tables() {
    let memory = Arc::new(MemoryBackend::new());
    let first = Site::open(memory.clone()).await.unwrap();
    first.upload_floorplan("ground", "{}").await.unwrap();

    let second = Site::builder().cache_capacity(8).open(memory).await.unwrap();
    assert_eq!(second.floorplans.approx_count(), 1);
    assert_eq!(second.floorplan("ground").await.unwrap().as_deref(), Some("{}"));
}

#[tokio::test]
async fn test_zero_cache_capacity_is_rejected() {
    let err = Site::builder()
        .cache_capacity(0)
        .open(Arc::new(MemoryBackend::new()))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::Config(_)));
}

// =============================================================================
// FLOORPLANS
// =============================================================================

#[tokio::test]
async fn test_floorplan_upload_and_retrieve() {
    let (site, _backend) = open_site().await;
    assert!(site.floorplan("ground").await.unwrap().is_none());

    let serial = json!({"walls": [[0, 0, 10, 0]]}).to_string();
    site.upload_floorplan("ground", &serial).await.unwrap();
    assert_eq!(site.floorplan("ground").await.unwrap(), Some(serial));

    site.upload_floorplan("ground", "{}").await.unwrap();
    assert_eq!(site.floorplan("ground").await.unwrap().as_deref(), Some("{}"));
}

// =============================================================================
// EDITOR WRITES
// =============================================================================

#[tokio::test]
async fn test_set_node_coordinates() {
    let (site, _backend) = open_site().await;
    site.set_node_coordinates(&[
        NodePosition { id: 1, x: 1.5, y: 2.0 },
        NodePosition { id: 2, x: -3.0, y: 4.25 },
    ])
    .await
    .unwrap();

    let rows = site
        .nodes
        .get_attr(
            2,
            None,
            &[AttributeDef::number("positionX"), AttributeDef::number("positionY")],
            Page::all(),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rows[0]["positionX"], ScalarValue::from(-3.0));
    assert_eq!(rows[0]["positionY"], ScalarValue::from(4.25));
}

#[tokio::test]
async fn test_set_room_points_stores_json() {
    let (site, _backend) = open_site().await;
    let outline = RoomOutline {
        id: 7,
        points: vec![Point { x: 0.0, y: 0.0 }, Point { x: 4.0, y: 0.0 }, Point { x: 4.0, y: 3.0 }],
    };
    site.set_room_points(std::slice::from_ref(&outline)).await.unwrap();

    let rows = site
        .rooms
        .get_attr(7, None, &[AttributeDef::string("points")], Page::all())
        .await
        .unwrap()
        .unwrap();
    let points: Vec<Point> = serde_json::from_str(rows[0]["points"].as_str().unwrap()).unwrap();
    assert_eq!(points, outline.points);
}

#[tokio::test]
async fn test_failed_node_update_is_reported() {
    let (site, backend) = open_site().await;
    backend.fail_nth_put(1);

    let err = site
        .set_node_coordinates(&[NodePosition { id: 1, x: 0.0, y: 0.0 }])
        .await
        .unwrap_err();
    assert_eq!(err.backend_kind(), Some(BackendErrorKind::Service));
}

// =============================================================================
// VIEWER SCANS
// =============================================================================

#[tokio::test]
async fn test_last_updated_and_population_scans() {
    let (site, _backend) = open_site().await;
    site.beacons
        .update(1, None, vec![Attribute::new("LastUpdated", 1_700_000_000)])
        .await
        .unwrap();
    site.nodes
        .update(4, None, vec![Attribute::new("LastUpdated", 1_700_000_100)])
        .await
        .unwrap();
    site.rooms
        .update(9, None, vec![Attribute::new("Population", 12)])
        .await
        .unwrap();
    site.rooms.put(10, None, "empty room").await.unwrap();

    let beacons = site.beacons_last_updated().await.unwrap();
    assert_eq!(beacons.len(), 1);
    assert_eq!(beacons[0]["BeaconID"], ScalarValue::from(1));

    let nodes = site.nodes_last_updated().await.unwrap();
    assert_eq!(nodes[0]["LastUpdated"], ScalarValue::from(1_700_000_100));

    let rooms = site.rooms_population().await.unwrap();
    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[0]["Population"], ScalarValue::from(12));
    assert!(!rooms[1].contains_key("Population"));
}
