//! Request and response shapes of the remote table contract
//!
//! These mirror what the remote service accepts: attribute definitions and a
//! HASH/RANGE key schema at creation, key conditions for queries, whole items
//! for puts, key items for deletes, and projected or count-only scans.
//! Results that may be truncated carry a `last_evaluated_key` to resume from.

use keyedstore_core::{AttributeDef, Item, ScalarValue, TableSchema};

/// Role of a key attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Partition key
    Hash,
    /// Sort key
    Range,
}

/// One entry of a table's key schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchemaElement {
    /// Key attribute name
    pub attribute_name: String,
    /// Role of the attribute
    pub key_type: KeyType,
}

/// Provisioned throughput hints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput {
    /// Read capacity units
    pub read_capacity_units: u64,
    /// Write capacity units
    pub write_capacity_units: u64,
}

impl Default for Throughput {
    fn default() -> Self {
        Self {
            read_capacity_units: 1,
            write_capacity_units: 1,
        }
    }
}

/// Create-table call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableRequest {
    /// Table name
    pub table_name: String,
    /// Types of the key attributes
    pub attribute_definitions: Vec<AttributeDef>,
    /// HASH key first, then the optional RANGE key
    pub key_schema: Vec<KeySchemaElement>,
    /// Throughput hints
    pub throughput: Throughput,
}

impl CreateTableRequest {
    /// Build the creation request for `schema`.
    ///
    /// The partition key is always defined; the sort key definition and its
    /// RANGE entry are added only for composite keys.
    pub fn from_schema(schema: &TableSchema, throughput: Throughput) -> Self {
        let mut attribute_definitions = vec![schema.partition_key().clone()];
        let mut key_schema = vec![KeySchemaElement {
            attribute_name: schema.partition_key().name.clone(),
            key_type: KeyType::Hash,
        }];

        if let Some(sort_key) = schema.sort_key() {
            attribute_definitions.push(sort_key.clone());
            key_schema.push(KeySchemaElement {
                attribute_name: sort_key.name.clone(),
                key_type: KeyType::Range,
            });
        }

        Self {
            table_name: schema.table_name().to_string(),
            attribute_definitions,
            key_schema,
            throughput,
        }
    }
}

/// Comparison applied to a key attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Equal to the value
    Eq(ScalarValue),
    /// String value starting with the prefix
    BeginsWith(String),
}

/// Condition on one key attribute
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCondition {
    /// Key attribute name
    pub attribute: String,
    /// Comparison
    pub condition: Condition,
}

impl KeyCondition {
    /// `attribute = value`
    pub fn eq(attribute: impl Into<String>, value: ScalarValue) -> Self {
        Self {
            attribute: attribute.into(),
            condition: Condition::Eq(value),
        }
    }

    /// `begins_with(attribute, prefix)`
    pub fn begins_with(attribute: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            condition: Condition::BeginsWith(prefix.into()),
        }
    }
}

/// Query-by-key call
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Table name
    pub table_name: String,
    /// Condition on the partition key
    pub partition: KeyCondition,
    /// Optional equality on the sort key
    pub sort: Option<KeyCondition>,
    /// Attributes to return, or the whole item
    pub projection: Option<Vec<String>>,
    /// Ascending key order when true
    pub scan_forward: bool,
    /// Maximum rows in this page
    pub limit: Option<usize>,
    /// Resume after this key
    pub exclusive_start_key: Option<Item>,
}

impl QueryRequest {
    /// Query `table_name` on a partition condition, ascending, unprojected
    pub fn new(table_name: impl Into<String>, partition: KeyCondition) -> Self {
        Self {
            table_name: table_name.into(),
            partition,
            sort: None,
            projection: None,
            scan_forward: true,
            limit: None,
            exclusive_start_key: None,
        }
    }

    /// Add a sort key condition
    pub fn sort(mut self, condition: KeyCondition) -> Self {
        self.sort = Some(condition);
        self
    }

    /// Restrict the returned attributes
    pub fn projection(mut self, attributes: Vec<String>) -> Self {
        self.projection = Some(attributes);
        self
    }

    /// Return rows in descending key order
    pub fn descending(mut self) -> Self {
        self.scan_forward = false;
        self
    }
}

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    /// Matching rows, projected
    pub items: Vec<Item>,
    /// Set when more rows remain
    pub last_evaluated_key: Option<Item>,
}

/// Put-item call; replaces any item with the same primary key
#[derive(Debug, Clone, PartialEq)]
pub struct PutItemRequest {
    /// Table name
    pub table_name: String,
    /// Full item including its key attributes
    pub item: Item,
}

/// Delete-item call
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteItemRequest {
    /// Table name
    pub table_name: String,
    /// Primary key item
    pub key: Item,
    /// Return the deleted item's attributes
    pub return_old: bool,
}

/// What a scan returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Select {
    /// Rows (optionally projected)
    #[default]
    Items,
    /// Only the number of matching rows
    Count,
}

/// Full-table scan call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanRequest {
    /// Table name
    pub table_name: String,
    /// Attributes to return, or the whole item
    pub projection: Option<Vec<String>>,
    /// Rows or count
    pub select: Select,
    /// Maximum rows examined in this page
    pub limit: Option<usize>,
    /// Resume after this key
    pub exclusive_start_key: Option<Item>,
}

/// One page of scan results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutput {
    /// Rows, empty for `Select::Count`
    pub items: Vec<Item>,
    /// Rows matched in this page
    pub count: u64,
    /// Rows examined in this page
    pub scanned_count: u64,
    /// Set when more rows remain
    pub last_evaluated_key: Option<Item>,
}
