//! Store configuration
//!
//! A store is described by its table layout plus a few tuning knobs. The
//! description can be written by hand, built with [`StoreBuilder`], or loaded
//! from TOML:
//!
//! ```toml
//! table = "Floorplans"
//! cache_capacity = 500
//!
//! [partition_key]
//! name = "Name"
//! type = "String"
//! ```

use crate::error::{Result, StoreError};
use crate::store::KeyedStore;
use keyedstore_backend::{Backend, Throughput};
use keyedstore_core::{AttributeDef, TableSchema};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Default number of read-cache entries
pub const DEFAULT_CACHE_CAPACITY: usize = 500;

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_capacity_units() -> u64 {
    1
}

/// Configuration of one keyed store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Remote table name
    pub table: String,
    /// Partition key descriptor
    pub partition_key: AttributeDef,
    /// Sort key descriptor; present for composite keys
    #[serde(default)]
    pub sort_key: Option<AttributeDef>,
    /// Maximum read-cache entries
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Read throughput hint used when the table is created
    #[serde(default = "default_capacity_units")]
    pub read_capacity_units: u64,
    /// Write throughput hint used when the table is created
    #[serde(default = "default_capacity_units")]
    pub write_capacity_units: u64,
}

impl StoreConfig {
    /// Configuration with defaults for everything but the table layout
    pub fn new(table: impl Into<String>, partition_key: AttributeDef) -> Self {
        Self {
            table: table.into(),
            partition_key,
            sort_key: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            read_capacity_units: 1,
            write_capacity_units: 1,
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Table layout described by this configuration
    pub fn schema(&self) -> TableSchema {
        let schema = TableSchema::new(self.table.clone(), self.partition_key.clone());
        match &self.sort_key {
            Some(sort_key) => schema.with_sort_key(sort_key.clone()),
            None => schema,
        }
    }

    /// Throughput hints for table creation
    pub fn throughput(&self) -> Throughput {
        Throughput {
            read_capacity_units: self.read_capacity_units,
            write_capacity_units: self.write_capacity_units,
        }
    }

    /// Check the layout and knobs
    pub fn validate(&self) -> Result<()> {
        self.schema().validate()?;
        if self.cache_capacity == 0 {
            return Err(StoreError::Config("cache_capacity must be positive".into()));
        }
        if self.read_capacity_units == 0 || self.write_capacity_units == 0 {
            return Err(StoreError::Config("capacity units must be positive".into()));
        }
        Ok(())
    }
}

/// Builder for a [`KeyedStore`].
///
/// # Example
///
/// ```ignore
/// let store = KeyedStore::builder("Readings", AttributeDef::string("Beacon"))
///     .sort_key(AttributeDef::number("At"))
///     .cache_capacity(1_000)
///     .build(backend)?;
/// store.init().await?;
/// ```
#[derive(Debug, Clone)]
pub struct StoreBuilder {
    config: StoreConfig,
}

impl StoreBuilder {
    /// Start from a table name and partition key
    pub fn new(table: impl Into<String>, partition_key: AttributeDef) -> Self {
        Self {
            config: StoreConfig::new(table, partition_key),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Make the key composite
    pub fn sort_key(mut self, sort_key: AttributeDef) -> Self {
        self.config.sort_key = Some(sort_key);
        self
    }

    /// Set the read-cache capacity
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Set the throughput hints used at table creation
    pub fn throughput(mut self, read_capacity_units: u64, write_capacity_units: u64) -> Self {
        self.config.read_capacity_units = read_capacity_units;
        self.config.write_capacity_units = write_capacity_units;
        self
    }

    /// Validate and build the store. The store still needs `init`.
    pub fn build(self, backend: Arc<dyn Backend>) -> Result<KeyedStore> {
        self.config.validate()?;
        Ok(KeyedStore::with_config(&self.config, backend))
    }
}
