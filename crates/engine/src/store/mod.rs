//! KeyedStore: cached, schema-aware access to one remote table
//!
//! ## Design
//!
//! The store owns the table's [`TableSchema`], an injected [`Backend`] handle,
//! a bounded read cache and a table of per-partition locks. It builds every
//! backend request from the schema, so callers only deal in partition and
//! sort values.
//!
//! ## Lifecycle
//!
//! Construct, then call [`KeyedStore::init`] once. Until `init` succeeds every
//! operation fails with [`StoreError::UninitializedStore`] without touching
//! the backend.
//!
//! ## Result shapes
//!
//! | Operation | Nothing matched | Backend failure |
//! |-----------|-----------------|-----------------|
//! | `get`, `get_attr`, `get_prefix` | `Ok(None)` | `Err(Backend)` |
//! | `scan_keys`, `scan_keys_for_attr` | `Ok(vec![])` | `Err(Backend)` |
//! | `remove` | `Err(NotFound)` | `Err(Backend)` |

mod mutate;
mod read;
mod scan;
mod set_ops;

pub use mutate::Replaced;
pub use set_ops::SetOp;

use crate::cache::{PartitionLocks, ReadCache};
use crate::config::{StoreBuilder, StoreConfig, DEFAULT_CACHE_CAPACITY};
use crate::error::{Result, StoreError};
use keyedstore_backend::{Backend, CreateTableRequest, ScanRequest, Select, Throughput};
use keyedstore_core::{AttributeDef, ScalarValue, TableSchema};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

/// Cached, schema-aware interface over one remote table.
///
/// `KeyedStore` is `Send + Sync`; share it behind an `Arc`.
pub struct KeyedStore {
    schema: TableSchema,
    throughput: Throughput,
    backend: Arc<dyn Backend>,
    initialized: AtomicBool,
    init_lock: AsyncMutex<()>,
    approx_count: AtomicU64,
    cache: ReadCache,
    locks: PartitionLocks,
}

impl KeyedStore {
    /// Store over `schema` with default cache capacity and throughput hints
    pub fn new(schema: TableSchema, backend: Arc<dyn Backend>) -> Self {
        Self::from_parts(
            schema,
            Throughput::default(),
            NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            backend,
        )
    }

    /// Builder starting from a table name and partition key
    pub fn builder(table: impl Into<String>, partition_key: AttributeDef) -> StoreBuilder {
        StoreBuilder::new(table, partition_key)
    }

    /// Store described by a validated configuration
    pub fn from_config(config: &StoreConfig, backend: Arc<dyn Backend>) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config, backend))
    }

    pub(crate) fn with_config(config: &StoreConfig, backend: Arc<dyn Backend>) -> Self {
        Self::from_parts(
            config.schema(),
            config.throughput(),
            NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN),
            backend,
        )
    }

    fn from_parts(
        schema: TableSchema,
        throughput: Throughput,
        cache_capacity: NonZeroUsize,
        backend: Arc<dyn Backend>,
    ) -> Self {
        Self {
            schema,
            throughput,
            backend,
            initialized: AtomicBool::new(false),
            init_lock: AsyncMutex::new(()),
            approx_count: AtomicU64::new(0),
            cache: ReadCache::new(cache_capacity),
            locks: PartitionLocks::new(),
        }
    }

    /// Table layout
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Whether `init` has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Item count observed at `init`. Diagnostics only; never authoritative.
    pub fn approx_count(&self) -> u64 {
        self.approx_count.load(Ordering::Relaxed)
    }

    /// Number of read-cache entries
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Confirm or create the backing table.
    ///
    /// If the table is missing it is created from the schema; creation being
    /// accepted is treated as readiness. If it exists, a count-only scan
    /// records [`approx_count`](Self::approx_count); a failed count is logged
    /// and does not block readiness. Calling `init` again is a no-op.
    pub async fn init(&self) -> Result<()> {
        let _init = self.init_lock.lock().await;
        if self.is_initialized() {
            debug!(table = self.schema.table_name(), "store already initialized");
            return Ok(());
        }

        let table = self.schema.table_name();
        let tables = self.backend.list_tables().await?;
        info!(?tables, "connected to backend");

        if tables.iter().any(|name| name == table) {
            match self.count_items().await {
                Ok(count) => {
                    self.approx_count.store(count, Ordering::Relaxed);
                    info!("Found {} indexed entries in {}", count, table);
                }
                Err(e) => warn!("Counting entries in {} failed: {}", table, e),
            }
        } else {
            info!("Creating new table {}", table);
            let request = CreateTableRequest::from_schema(&self.schema, self.throughput);
            self.backend.create_table(request).await?;
        }

        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    async fn count_items(&self) -> Result<u64> {
        let mut request = ScanRequest {
            table_name: self.schema.table_name().to_string(),
            select: Select::Count,
            ..Default::default()
        };
        let mut count = 0;
        loop {
            let output = self.backend.scan(request.clone()).await?;
            count += output.count;
            match output.last_evaluated_key {
                Some(key) => request.exclusive_start_key = Some(key),
                None => return Ok(count),
            }
        }
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(StoreError::UninitializedStore)
        }
    }

    /// Human-readable key for error messages
    fn describe_key(partition: &ScalarValue, sort: Option<&ScalarValue>) -> String {
        match sort {
            Some(sort) => format!("{} {}", partition, sort),
            None => partition.to_string(),
        }
    }
}
