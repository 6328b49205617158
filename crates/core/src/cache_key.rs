//! Read-cache keys
//!
//! | Lookup | Key | Cached value |
//! |--------|-----|--------------|
//! | point (composite) | `partition/sort` | one item |
//! | partition | `partition` | every item of the partition |
//! | projected | either of the above + `#attr,attr` | projected rows |
//!
//! Every key remembers its partition so a write can drop all entries
//! derived from it.

use crate::schema::AttributeDef;
use crate::value::ScalarValue;
use std::fmt;

/// Key of one read-cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    partition: String,
    sort: Option<String>,
    projection: Option<String>,
}

impl CacheKey {
    /// Key for a `Value` lookup
    pub fn new(partition: &ScalarValue, sort: Option<&ScalarValue>) -> Self {
        Self {
            partition: partition.cache_repr(),
            sort: sort.map(ScalarValue::cache_repr),
            projection: None,
        }
    }

    /// Key for a lookup projected onto `attributes`
    pub fn projected(
        partition: &ScalarValue,
        sort: Option<&ScalarValue>,
        attributes: &[AttributeDef],
    ) -> Self {
        let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
        Self {
            projection: Some(names.join(",")),
            ..Self::new(partition, sort)
        }
    }

    /// Rendered partition value this key belongs to
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Rendered sort value of a point lookup
    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    /// True if this key addresses an unprojected lookup
    pub fn is_plain(&self) -> bool {
        self.projection.is_none()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.partition)?;
        if let Some(sort) = &self.sort {
            write!(f, "/{}", sort)?;
        }
        if let Some(projection) = &self.projection {
            write!(f, "#{}", projection)?;
        }
        Ok(())
    }
}
