//! Shared test utilities
//!
//! - [`RecordingBackend`]: wraps a [`MemoryBackend`], counts calls, records
//!   puts and can fail chosen puts, deletes, scans or table listings
//! - [`TestStore`]: an initialized store over a recording backend

#![allow(dead_code)]

use async_trait::async_trait;
use keyedstore::{AttributeDef, Item, KeyedStore, MemoryBackend, TableSchema};
use keyedstore_backend::{
    Backend, BackendError, BackendErrorKind, BackendResult, CreateTableRequest, DeleteItemRequest,
    PutItemRequest, QueryOutput, QueryRequest, ScanOutput, ScanRequest,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Install a test-writer subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Per-method call counters
#[derive(Debug, Default)]
pub struct CallCounts {
    pub list_tables: AtomicUsize,
    pub create_table: AtomicUsize,
    pub query: AtomicUsize,
    pub put_item: AtomicUsize,
    pub delete_item: AtomicUsize,
    pub scan: AtomicUsize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        [
            &self.list_tables,
            &self.create_table,
            &self.query,
            &self.put_item,
            &self.delete_item,
            &self.scan,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

/// Backend decorator for observing and disturbing store traffic
pub struct RecordingBackend {
    inner: Arc<MemoryBackend>,
    pub calls: CallCounts,
    puts: Mutex<Vec<Item>>,
    failing_puts: Mutex<Vec<usize>>,
    fail_deletes: Mutex<bool>,
    fail_scans: Mutex<bool>,
    fail_list_tables: Mutex<bool>,
}

impl RecordingBackend {
    pub fn new(inner: Arc<MemoryBackend>) -> Self {
        Self {
            inner,
            calls: CallCounts::default(),
            puts: Mutex::new(Vec::new()),
            failing_puts: Mutex::new(Vec::new()),
            fail_deletes: Mutex::new(false),
            fail_scans: Mutex::new(false),
            fail_list_tables: Mutex::new(false),
        }
    }

    pub fn memory(&self) -> &MemoryBackend {
        &self.inner
    }

    /// Items passed to `put_item`, in call order, including failed ones
    pub fn puts(&self) -> Vec<Item> {
        self.puts.lock().clone()
    }

    /// Fail the `n`th `put_item` call from now, counting from 1
    pub fn fail_nth_put(&self, n: usize) {
        let base = self.calls.put_item.load(Ordering::SeqCst);
        self.failing_puts.lock().push(base + n);
    }

    /// Make every subsequent `delete_item` fail
    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock() = true;
    }

    /// Make every subsequent `scan` fail, including count-only scans
    pub fn fail_scans(&self) {
        *self.fail_scans.lock() = true;
    }

    /// Make every subsequent `list_tables` fail
    pub fn fail_list_tables(&self) {
        *self.fail_list_tables.lock() = true;
    }

    pub fn reset_counts(&self) {
        for counter in [
            &self.calls.list_tables,
            &self.calls.create_table,
            &self.calls.query,
            &self.calls.put_item,
            &self.calls.delete_item,
            &self.calls.scan,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
        self.puts.lock().clear();
        self.failing_puts.lock().clear();
    }
}

fn injected() -> BackendError {
    BackendError::new(BackendErrorKind::Service, "injected failure")
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn list_tables(&self) -> BackendResult<Vec<String>> {
        self.calls.list_tables.fetch_add(1, Ordering::SeqCst);
        if *self.fail_list_tables.lock() {
            return Err(injected());
        }
        self.inner.list_tables().await
    }

    async fn create_table(&self, request: CreateTableRequest) -> BackendResult<()> {
        self.calls.create_table.fetch_add(1, Ordering::SeqCst);
        self.inner.create_table(request).await
    }

    async fn query(&self, request: QueryRequest) -> BackendResult<QueryOutput> {
        self.calls.query.fetch_add(1, Ordering::SeqCst);
        self.inner.query(request).await
    }

    async fn put_item(&self, request: PutItemRequest) -> BackendResult<()> {
        let n = self.calls.put_item.fetch_add(1, Ordering::SeqCst) + 1;
        self.puts.lock().push(request.item.clone());
        if self.failing_puts.lock().contains(&n) {
            return Err(injected());
        }
        self.inner.put_item(request).await
    }

    async fn delete_item(&self, request: DeleteItemRequest) -> BackendResult<Option<Item>> {
        self.calls.delete_item.fetch_add(1, Ordering::SeqCst);
        if *self.fail_deletes.lock() {
            return Err(injected());
        }
        self.inner.delete_item(request).await
    }

    async fn scan(&self, request: ScanRequest) -> BackendResult<ScanOutput> {
        self.calls.scan.fetch_add(1, Ordering::SeqCst);
        if *self.fail_scans.lock() {
            return Err(injected());
        }
        self.inner.scan(request).await
    }
}

/// An initialized store and the backend behind it
pub struct TestStore {
    pub store: KeyedStore,
    pub backend: Arc<RecordingBackend>,
}

impl TestStore {
    /// Initialized store over `schema`
    pub async fn new(schema: TableSchema) -> Self {
        Self::with_memory(schema, Arc::new(MemoryBackend::new())).await
    }

    /// Initialized store over `schema` and an existing memory backend
    pub async fn with_memory(schema: TableSchema, memory: Arc<MemoryBackend>) -> Self {
        init_tracing();
        let backend = Arc::new(RecordingBackend::new(memory));
        let store = KeyedStore::new(schema, backend.clone());
        store.init().await.unwrap();
        backend.reset_counts();
        Self { store, backend }
    }

    /// Composite `Readings(Beacon: S, At: N)` store
    pub async fn readings() -> Self {
        Self::new(readings_schema()).await
    }

    /// Partition-only `Floorplans(Name: S)` store
    pub async fn floorplans() -> Self {
        Self::new(TableSchema::new("Floorplans", AttributeDef::string("Name"))).await
    }

    /// Partition-only `Nodes(NodeID: N)` store
    pub async fn nodes() -> Self {
        Self::new(TableSchema::new("Nodes", AttributeDef::number("NodeID"))).await
    }
}

pub fn readings_schema() -> TableSchema {
    TableSchema::new("Readings", AttributeDef::string("Beacon"))
        .with_sort_key(AttributeDef::number("At"))
}
