//! Site: the four tables of an indoor-positioning deployment.
//!
//! | Table | Partition key | Used for |
//! |-------|---------------|----------|
//! | `Nodes` | `NodeID: N` | node coordinates, last-updated time |
//! | `Beacons` | `BeaconID: N` | last-updated time |
//! | `Rooms` | `RoomID: N` | outline points, population |
//! | `Floorplans` | `Name: S` | serialized floorplan under `JSON` |

use crate::error::{Error, Result};
use futures::future::join_all;
use keyedstore_backend::Backend;
use keyedstore_core::{Attribute, AttributeDef, Item, Page};
use keyedstore_engine::{KeyedStore, StoreConfig, DEFAULT_CACHE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Attribute holding a serialized floorplan
pub const FLOORPLAN_ATTRIBUTE: &str = "JSON";

/// Position of one node on the floorplan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    /// Node ID
    pub id: i64,
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

/// Vertex of a room outline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

/// Outline of one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomOutline {
    /// Room ID
    pub id: i64,
    /// Outline vertices, in drawing order
    pub points: Vec<Point>,
}

/// Stores of one deployment.
///
/// Create with [`Site::open`] or [`Site::builder`]; every store is
/// initialized before the site is returned.
///
/// # Example
///
/// ```ignore
/// let site = Site::open(Arc::new(MemoryBackend::new())).await?;
/// site.upload_floorplan("ground", r#"{"walls":[]}"#).await?;
/// let plan = site.floorplan("ground").await?;
/// ```
pub struct Site {
    /// `Nodes` table
    pub nodes: KeyedStore,
    /// `Beacons` table
    pub beacons: KeyedStore,
    /// `Rooms` table
    pub rooms: KeyedStore,
    /// `Floorplans` table
    pub floorplans: KeyedStore,
}

impl Site {
    /// Open all four stores over `backend` with default settings.
    pub async fn open(backend: Arc<dyn Backend>) -> Result<Self> {
        Self::builder().open(backend).await
    }

    /// Create a builder for site configuration.
    pub fn builder() -> SiteBuilder {
        SiteBuilder::new()
    }

    /// `LastUpdated` of every beacon
    pub async fn beacons_last_updated(&self) -> Result<Vec<Item>> {
        Ok(self
            .beacons
            .scan_keys_for_attr(AttributeDef::number("LastUpdated"))
            .await?)
    }

    /// `LastUpdated` of every node
    pub async fn nodes_last_updated(&self) -> Result<Vec<Item>> {
        Ok(self
            .nodes
            .scan_keys_for_attr(AttributeDef::number("LastUpdated"))
            .await?)
    }

    /// `Population` of every room
    pub async fn rooms_population(&self) -> Result<Vec<Item>> {
        Ok(self
            .rooms
            .scan_keys_for_attr(AttributeDef::number("Population"))
            .await?)
    }

    /// Serialized floorplan stored under `name`, if any.
    pub async fn floorplan(&self, name: &str) -> Result<Option<String>> {
        let rows = self
            .floorplans
            .get_attr(
                name,
                None,
                &[AttributeDef::string(FLOORPLAN_ATTRIBUTE)],
                Page::all(),
            )
            .await?;
        Ok(rows
            .and_then(|rows| rows.into_iter().next())
            .and_then(|row| row.get(FLOORPLAN_ATTRIBUTE).cloned())
            .and_then(|value| value.as_str().map(str::to_string)))
    }

    /// Store a serialized floorplan under `name`, replacing any previous one.
    pub async fn upload_floorplan(&self, name: &str, serial: &str) -> Result<()> {
        self.floorplans
            .update(name, None, vec![Attribute::new(FLOORPLAN_ATTRIBUTE, serial)])
            .await?;
        Ok(())
    }

    /// Write `positionX`/`positionY` for each node.
    ///
    /// Nodes are updated concurrently; the first failure is returned after
    /// every update has finished.
    pub async fn set_node_coordinates(&self, nodes: &[NodePosition]) -> Result<()> {
        let updates = nodes.iter().map(|node| {
            self.nodes.update(
                node.id,
                None,
                vec![
                    Attribute::new("positionX", node.x),
                    Attribute::new("positionY", node.y),
                ],
            )
        });
        for result in join_all(updates).await {
            result?;
        }
        Ok(())
    }

    /// Write each room's outline as a JSON array under `points`.
    pub async fn set_room_points(&self, rooms: &[RoomOutline]) -> Result<()> {
        let mut updates = Vec::with_capacity(rooms.len());
        for room in rooms {
            let points = serde_json::to_string(&room.points)?;
            updates.push(
                self.rooms
                    .update(room.id, None, vec![Attribute::new("points", points)]),
            );
        }
        for result in join_all(updates).await {
            result?;
        }
        Ok(())
    }
}

/// Builder for site configuration.
///
/// # Example
///
/// ```ignore
/// let site = Site::builder()
///     .cache_capacity(64)
///     .open(backend)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct SiteBuilder {
    cache_capacity: usize,
}

impl SiteBuilder {
    /// Create a builder with default cache capacity.
    pub fn new() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Read-cache capacity of each store.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Build and initialize the four stores.
    pub async fn open(self, backend: Arc<dyn Backend>) -> Result<Site> {
        let site = Site {
            nodes: self.store("Nodes", AttributeDef::number("NodeID"), &backend)?,
            beacons: self.store("Beacons", AttributeDef::number("BeaconID"), &backend)?,
            rooms: self.store("Rooms", AttributeDef::number("RoomID"), &backend)?,
            floorplans: self.store("Floorplans", AttributeDef::string("Name"), &backend)?,
        };
        for store in [&site.nodes, &site.beacons, &site.rooms, &site.floorplans] {
            store.init().await?;
        }
        info!("site opened");
        Ok(site)
    }

    fn store(
        &self,
        table: &str,
        partition_key: AttributeDef,
        backend: &Arc<dyn Backend>,
    ) -> Result<KeyedStore> {
        let mut config = StoreConfig::new(table, partition_key);
        config.cache_capacity = self.cache_capacity;
        KeyedStore::from_config(&config, backend.clone()).map_err(Error::from)
    }
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}
