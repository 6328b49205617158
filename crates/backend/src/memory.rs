//! In-process backend
//!
//! Implements the remote table contract over process memory with the same
//! observable semantics as the service: tables must be created before use,
//! items are unique per primary key (last write wins), and truncated results
//! carry a resume key.
//!
//! # Design
//!
//! - DashMap of tables: each table locks independently
//! - BTreeMap of rows per table: key-ordered iteration for queries and scans
//! - Optional page size: forces pagination so callers exercise resume keys

use crate::error::{BackendError, BackendResult};
use crate::request::{
    Condition, CreateTableRequest, DeleteItemRequest, KeyCondition, KeyType, PutItemRequest,
    QueryOutput, QueryRequest, ScanOutput, ScanRequest, Select,
};
use crate::traits::Backend;
use async_trait::async_trait;
use dashmap::DashMap;
use keyedstore_core::{AttributeDef, Item, ScalarValue};
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::debug;

type PrimaryKey = (ScalarValue, Option<ScalarValue>);

/// One table's key layout and rows
#[derive(Debug)]
struct MemoryTable {
    partition_key: AttributeDef,
    sort_key: Option<AttributeDef>,
    rows: BTreeMap<PrimaryKey, Item>,
}

impl MemoryTable {
    fn from_request(request: &CreateTableRequest) -> BackendResult<Self> {
        let definition = |name: &str| {
            request
                .attribute_definitions
                .iter()
                .find(|def| def.name == name)
                .cloned()
                .ok_or_else(|| {
                    BackendError::validation(format!("key attribute {} has no definition", name))
                })
        };

        let mut partition_key = None;
        let mut sort_key = None;
        for element in &request.key_schema {
            let slot = match element.key_type {
                KeyType::Hash => &mut partition_key,
                KeyType::Range => &mut sort_key,
            };
            if slot.is_some() {
                return Err(BackendError::validation("duplicate key role in key schema"));
            }
            *slot = Some(definition(&element.attribute_name)?);
        }

        let partition_key = partition_key
            .ok_or_else(|| BackendError::validation("key schema has no HASH key"))?;

        Ok(Self {
            partition_key,
            sort_key,
            rows: BTreeMap::new(),
        })
    }

    /// Extract and type-check the primary key of `item`.
    ///
    /// With `exact`, the item must contain nothing but the key attributes.
    fn primary_key(&self, item: &Item, exact: bool) -> BackendResult<PrimaryKey> {
        let partition = Self::key_value(&self.partition_key, item)?;
        let sort = match &self.sort_key {
            Some(def) => Some(Self::key_value(def, item)?),
            None => None,
        };
        let key_count = 1 + usize::from(sort.is_some());
        if exact && item.len() != key_count {
            return Err(BackendError::validation(
                "the provided key does not match the table's key schema",
            ));
        }
        Ok((partition, sort))
    }

    fn key_value(def: &AttributeDef, item: &Item) -> BackendResult<ScalarValue> {
        let value = item.get(&def.name).ok_or_else(|| {
            BackendError::validation(format!("missing key attribute {}", def.name))
        })?;
        def.check(value)
            .map_err(|e| BackendError::validation(e.to_string()))?;
        Ok(value.clone())
    }

    fn key_item(&self, key: &PrimaryKey) -> Item {
        let mut item = Item::new();
        item.insert(self.partition_key.name.clone(), key.0.clone());
        if let (Some(def), Some(sort)) = (&self.sort_key, &key.1) {
            item.insert(def.name.clone(), sort.clone());
        }
        item
    }

    fn partition_matches(&self, condition: &KeyCondition, value: &ScalarValue) -> BackendResult<bool> {
        if condition.attribute != self.partition_key.name {
            return Err(BackendError::validation(format!(
                "{} is not the partition key",
                condition.attribute
            )));
        }
        Self::matches(&condition.condition, value)
    }

    fn sort_matches(&self, condition: &KeyCondition, value: Option<&ScalarValue>) -> BackendResult<bool> {
        match (&self.sort_key, value) {
            (Some(def), Some(value)) if def.name == condition.attribute => {
                Self::matches(&condition.condition, value)
            }
            _ => Err(BackendError::validation(format!(
                "{} is not the sort key",
                condition.attribute
            ))),
        }
    }

    fn matches(condition: &Condition, value: &ScalarValue) -> BackendResult<bool> {
        match condition {
            Condition::Eq(expected) => Ok(expected == value),
            Condition::BeginsWith(prefix) => match value {
                ScalarValue::String(s) => Ok(s.starts_with(prefix.as_str())),
                ScalarValue::Number(_) => Err(BackendError::validation(
                    "begins_with is only supported on string keys",
                )),
            },
        }
    }
}

fn project(item: &Item, projection: Option<&Vec<String>>) -> Item {
    match projection {
        None => item.clone(),
        Some(names) => names
            .iter()
            .filter_map(|name| item.get(name).map(|v| (name.clone(), v.clone())))
            .collect(),
    }
}

/// Backend keeping every table in process memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: DashMap<String, MemoryTable>,
    page_size: Option<usize>,
}

impl MemoryBackend {
    /// Create an empty backend with unbounded pages
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap every query and scan page at `page_size` rows
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            tables: DashMap::new(),
            page_size: Some(page_size.max(1)),
        }
    }

    /// Number of items in `table`, `None` if it does not exist
    pub fn item_count(&self, table: &str) -> Option<usize> {
        self.tables.get(table).map(|t| t.rows.len())
    }

    fn page_limit(&self, requested: Option<usize>) -> Option<usize> {
        match (requested, self.page_size) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn missing_table(name: &str) -> BackendError {
        BackendError::resource_not_found(format!("requested resource not found: table {}", name))
    }
}

/// Collect up to `limit` rows from `rows`, reporting the resume key when
/// rows remain.
fn take_page<'a, I>(
    rows: I,
    limit: Option<usize>,
) -> (Vec<(&'a PrimaryKey, &'a Item)>, Option<&'a PrimaryKey>)
where
    I: Iterator<Item = (&'a PrimaryKey, &'a Item)>,
{
    let mut page = Vec::new();
    let mut rows = rows.peekable();
    while let Some(row) = rows.next() {
        page.push(row);
        if limit.map_or(false, |limit| page.len() >= limit) {
            let resume = rows.peek().map(|_| row.0);
            return (page, resume);
        }
    }
    (page, None)
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list_tables(&self) -> BackendResult<Vec<String>> {
        let mut names: Vec<String> = self.tables.iter().map(|t| t.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn create_table(&self, request: CreateTableRequest) -> BackendResult<()> {
        let table = MemoryTable::from_request(&request)?;
        match self.tables.entry(request.table_name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(BackendError::resource_in_use(
                format!("table already exists: {}", request.table_name),
            )),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                debug!(table = %request.table_name, "created in-memory table");
                slot.insert(table);
                Ok(())
            }
        }
    }

    async fn query(&self, request: QueryRequest) -> BackendResult<QueryOutput> {
        let table = self
            .tables
            .get(&request.table_name)
            .ok_or_else(|| Self::missing_table(&request.table_name))?;

        let mut matching = Vec::new();
        for (key, item) in &table.rows {
            if !table.partition_matches(&request.partition, &key.0)? {
                continue;
            }
            if let Some(sort) = &request.sort {
                if !table.sort_matches(sort, key.1.as_ref())? {
                    continue;
                }
            }
            matching.push((key, item));
        }
        if !request.scan_forward {
            matching.reverse();
        }

        let start = match &request.exclusive_start_key {
            Some(start) => {
                let start = table.primary_key(start, true)?;
                matching
                    .iter()
                    .position(|(key, _)| **key == start)
                    .map_or(matching.len(), |i| i + 1)
            }
            None => 0,
        };

        let (page, resume) = take_page(
            matching[start..].iter().copied(),
            self.page_limit(request.limit),
        );

        Ok(QueryOutput {
            items: page
                .iter()
                .map(|(_, item)| project(item, request.projection.as_ref()))
                .collect(),
            last_evaluated_key: resume.map(|key| table.key_item(key)),
        })
    }

    async fn put_item(&self, request: PutItemRequest) -> BackendResult<()> {
        let mut table = self
            .tables
            .get_mut(&request.table_name)
            .ok_or_else(|| Self::missing_table(&request.table_name))?;
        let key = table.primary_key(&request.item, false)?;
        table.rows.insert(key, request.item);
        Ok(())
    }

    async fn delete_item(&self, request: DeleteItemRequest) -> BackendResult<Option<Item>> {
        let mut table = self
            .tables
            .get_mut(&request.table_name)
            .ok_or_else(|| Self::missing_table(&request.table_name))?;
        let key = table.primary_key(&request.key, true)?;
        let old = table.rows.remove(&key);
        Ok(if request.return_old { old } else { None })
    }

    async fn scan(&self, request: ScanRequest) -> BackendResult<ScanOutput> {
        let table = self
            .tables
            .get(&request.table_name)
            .ok_or_else(|| Self::missing_table(&request.table_name))?;

        let lower = match &request.exclusive_start_key {
            Some(start) => Bound::Excluded(table.primary_key(start, true)?),
            None => Bound::Unbounded,
        };
        let (page, resume) = take_page(
            table.rows.range((lower, Bound::Unbounded)),
            self.page_limit(request.limit),
        );

        let count = page.len() as u64;
        let items = match request.select {
            Select::Count => Vec::new(),
            Select::Items => page
                .iter()
                .map(|(_, item)| project(item, request.projection.as_ref()))
                .collect(),
        };

        Ok(ScanOutput {
            items,
            count,
            scanned_count: count,
            last_evaluated_key: resume.map(|key| table.key_item(key)),
        })
    }
}
