//! Items, write payloads and pagination windows

use crate::error::Result;
use crate::schema::AttributeDef;
use crate::value::ScalarValue;
use std::collections::BTreeMap;

/// Name of the attribute that holds a stored value
pub const VALUE_ATTRIBUTE: &str = "Value";

/// A flat, name-ordered map of attribute name to scalar.
///
/// Every row returned to callers is normalized to this shape before it is
/// cached or returned.
pub type Item = BTreeMap<String, ScalarValue>;

/// Project a raw row onto `attributes`, in order.
///
/// Attributes missing from the row are omitted. A present attribute of the
/// wrong kind fails with `WrongType`.
pub fn project(row: &Item, attributes: &[AttributeDef]) -> Result<Item> {
    let mut item = Item::new();
    for def in attributes {
        if let Some(value) = row.get(&def.name) {
            def.check(value)?;
            item.insert(def.name.clone(), value.clone());
        }
    }
    Ok(item)
}

/// One scalar or a sequence of scalars.
///
/// Used as the payload of a put (a sequence writes one item per element under
/// the same key) and as the operand of union/difference.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalars {
    /// A single scalar
    One(ScalarValue),
    /// A sequence of scalars
    Many(Vec<ScalarValue>),
}

impl Scalars {
    /// Elements as a slice, one element for `One`
    pub fn as_slice(&self) -> &[ScalarValue] {
        match self {
            Scalars::One(value) => std::slice::from_ref(value),
            Scalars::Many(values) => values,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True for an empty sequence
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<ScalarValue> for Scalars {
    fn from(value: ScalarValue) -> Self {
        Scalars::One(value)
    }
}

impl From<&str> for Scalars {
    fn from(value: &str) -> Self {
        Scalars::One(value.into())
    }
}

impl From<String> for Scalars {
    fn from(value: String) -> Self {
        Scalars::One(value.into())
    }
}

impl From<f64> for Scalars {
    fn from(value: f64) -> Self {
        Scalars::One(value.into())
    }
}

impl From<i64> for Scalars {
    fn from(value: i64) -> Self {
        Scalars::One(value.into())
    }
}

impl From<i32> for Scalars {
    fn from(value: i32) -> Self {
        Scalars::One(value.into())
    }
}

impl<T: Into<ScalarValue>> From<Vec<T>> for Scalars {
    fn from(values: Vec<T>) -> Self {
        Scalars::Many(values.into_iter().map(Into::into).collect())
    }
}

/// Pagination window applied to a cached or freshly fetched result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Rows to skip
    pub offset: usize,
    /// Maximum rows to return, or all remaining
    pub limit: Option<usize>,
}

impl Page {
    /// The whole result
    pub fn all() -> Self {
        Self::default()
    }

    /// `limit` rows starting at `offset`
    pub fn window(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: Some(limit),
        }
    }

    /// Slice `items` to this window. Out-of-range windows yield an empty vec.
    pub fn apply(&self, items: &[Item]) -> Vec<Item> {
        let start = self.offset.min(items.len());
        let end = match self.limit {
            Some(limit) => start.saturating_add(limit).min(items.len()),
            None => items.len(),
        };
        items[start..end].to_vec()
    }
}
