//! Table schema and typed attribute descriptors
//!
//! A table has a required partition key and an optional sort key. The
//! presence of the sort key (the "composite key") is fixed when the schema is
//! built and decides which key shapes every operation accepts.

use crate::error::{CoreError, Result};
use crate::item::Item;
use crate::value::{ScalarType, ScalarValue};
use serde::{Deserialize, Serialize};

/// A named, typed attribute (key definition or projection entry)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute name
    pub name: String,
    /// Declared scalar kind
    #[serde(rename = "type")]
    pub scalar_type: ScalarType,
}

impl AttributeDef {
    /// Create a descriptor
    pub fn new(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar_type,
        }
    }

    /// String-typed descriptor
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ScalarType::String)
    }

    /// Number-typed descriptor
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ScalarType::Number)
    }

    /// Fail with `WrongType` unless `value` has the declared kind
    pub fn check(&self, value: &ScalarValue) -> Result<()> {
        if value.scalar_type() == self.scalar_type {
            Ok(())
        } else {
            Err(CoreError::WrongType {
                name: self.name.clone(),
                expected: self.scalar_type.to_string(),
                actual: value.scalar_type().to_string(),
            })
        }
    }
}

/// A named attribute with its value, as written by an update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Attribute value; its kind is the attribute's type
    pub value: ScalarValue,
}

impl Attribute {
    /// Create an attribute
    pub fn new(name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Key layout of one remote table. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    table_name: String,
    partition_key: AttributeDef,
    sort_key: Option<AttributeDef>,
}

impl TableSchema {
    /// Schema with a partition key only
    pub fn new(table_name: impl Into<String>, partition_key: AttributeDef) -> Self {
        Self {
            table_name: table_name.into(),
            partition_key,
            sort_key: None,
        }
    }

    /// Add a sort key, making the key composite
    pub fn with_sort_key(mut self, sort_key: AttributeDef) -> Self {
        self.sort_key = Some(sort_key);
        self
    }

    /// Remote table name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Partition key descriptor
    pub fn partition_key(&self) -> &AttributeDef {
        &self.partition_key
    }

    /// Sort key descriptor, if the key is composite
    pub fn sort_key(&self) -> Option<&AttributeDef> {
        self.sort_key.as_ref()
    }

    /// Whether the table has both a partition and a sort key
    pub fn has_composite_key(&self) -> bool {
        self.sort_key.is_some()
    }

    /// Names of the key attributes, partition key first
    pub fn key_names(&self) -> Vec<String> {
        let mut names = vec![self.partition_key.name.clone()];
        if let Some(sort_key) = &self.sort_key {
            names.push(sort_key.name.clone());
        }
        names
    }

    /// Check names are non-empty and the two key attributes are distinct
    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(CoreError::InvalidSchema("table name is empty".into()));
        }
        if self.partition_key.name.trim().is_empty() {
            return Err(CoreError::InvalidSchema("partition key name is empty".into()));
        }
        if let Some(sort_key) = &self.sort_key {
            if sort_key.name.trim().is_empty() {
                return Err(CoreError::InvalidSchema("sort key name is empty".into()));
            }
            if sort_key.name == self.partition_key.name {
                return Err(CoreError::InvalidSchema(format!(
                    "partition and sort key share the name {}",
                    sort_key.name
                )));
            }
        }
        Ok(())
    }

    /// Validate the key shape of a read.
    ///
    /// A sort value is optional on composite tables (absent means "the whole
    /// partition") and forbidden on partition-only tables.
    pub fn check_read_key(&self, partition: &ScalarValue, sort: Option<&ScalarValue>) -> Result<()> {
        self.partition_key.check(partition)?;
        match (&self.sort_key, sort) {
            (None, Some(_)) => Err(CoreError::InvalidKeyUsage(
                "sort key was given for a table without a composite key".into(),
            )),
            (Some(sort_key), Some(value)) => sort_key.check(value),
            _ => Ok(()),
        }
    }

    /// Validate the key shape of a mutation named `op`.
    ///
    /// Mutations address exactly one item, so a composite table requires the
    /// sort value and a partition-only table rejects it.
    pub fn check_write_key(
        &self,
        op: &str,
        partition: &ScalarValue,
        sort: Option<&ScalarValue>,
    ) -> Result<()> {
        self.partition_key.check(partition)?;
        match (&self.sort_key, sort) {
            (Some(_), None) => Err(CoreError::InvalidKeyUsage(format!(
                "sort key required for {} on table with composite key",
                op
            ))),
            (None, Some(_)) => Err(CoreError::InvalidKeyUsage(format!(
                "sort key was given for {} on a table without a composite key",
                op
            ))),
            (Some(sort_key), Some(value)) => sort_key.check(value),
            (None, None) => Ok(()),
        }
    }

    /// Build the primary-key item `{partition_key, [sort_key]}`.
    ///
    /// Callers validate the shape first; a sort value on a partition-only
    /// table is dropped here.
    pub fn key_item(&self, partition: &ScalarValue, sort: Option<&ScalarValue>) -> Item {
        let mut item = Item::new();
        item.insert(self.partition_key.name.clone(), partition.clone());
        if let (Some(sort_key), Some(value)) = (&self.sort_key, sort) {
            item.insert(sort_key.name.clone(), value.clone());
        }
        item
    }
}
