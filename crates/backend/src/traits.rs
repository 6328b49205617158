//! The remote table contract

use crate::error::BackendResult;
use crate::request::{
    CreateTableRequest, DeleteItemRequest, PutItemRequest, QueryOutput, QueryRequest, ScanOutput,
    ScanRequest,
};
use async_trait::async_trait;
use keyedstore_core::Item;

/// Operations the remote attribute store offers.
///
/// Every call is a single round trip: there are no multi-item transactions,
/// no conditional writes, and no retries at this layer. Implementations must
/// be shareable across tasks.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Names of all tables
    async fn list_tables(&self) -> BackendResult<Vec<String>>;

    /// Create a table. Creation may complete asynchronously on the service.
    async fn create_table(&self, request: CreateTableRequest) -> BackendResult<()>;

    /// One page of rows matching a key condition
    async fn query(&self, request: QueryRequest) -> BackendResult<QueryOutput>;

    /// Write an item, replacing any item with the same primary key
    async fn put_item(&self, request: PutItemRequest) -> BackendResult<()>;

    /// Delete an item; returns its old attributes when requested and present
    async fn delete_item(&self, request: DeleteItemRequest) -> BackendResult<Option<Item>>;

    /// One page of a full-table scan
    async fn scan(&self, request: ScanRequest) -> BackendResult<ScanOutput>;
}
