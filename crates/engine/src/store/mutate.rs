//! Put, remove and update
//!
//! Every mutation validates the key, takes the partition lock, invalidates
//! the affected cache entries and only then calls the backend.
//!
//! `update` is remove-then-put. The backend offers no atomic replace, so
//! another process can observe the key as absent between the two calls.
//! Readers going through the same store wait on the partition lock instead.

use super::KeyedStore;
use crate::error::{Result, StoreError};
use futures::future::join_all;
use keyedstore_backend::{DeleteItemRequest, PutItemRequest};
use keyedstore_core::{Attribute, Item, ScalarValue, Scalars, VALUE_ATTRIBUTE};
use tracing::debug;

/// Outcome of a remove-then-put update
#[derive(Debug, Clone, PartialEq)]
pub struct Replaced {
    /// Item removed by the first step; `None` if the key was empty
    pub previous: Option<Item>,
}

impl Replaced {
    /// Whether the update replaced an existing item
    pub fn existed(&self) -> bool {
        self.previous.is_some()
    }
}

impl KeyedStore {
    /// Store `value` under the key.
    ///
    /// A single scalar writes one item `{keys, Value}`. A sequence writes one
    /// item per element, all under the same key pair, concurrently; the call
    /// succeeds only if every write succeeds and otherwise reports the first
    /// failure. Which element remains stored is decided by the backend.
    ///
    /// # Errors
    ///
    /// `InvalidKeyUsage` if `sort` is missing on a composite table or given on
    /// a partition-only table.
    pub async fn put(
        &self,
        partition: impl Into<ScalarValue>,
        sort: Option<ScalarValue>,
        value: impl Into<Scalars>,
    ) -> Result<()> {
        self.ensure_initialized()?;
        let partition = partition.into();
        self.schema.check_write_key("put", &partition, sort.as_ref())?;

        let _partition = self.locks.lock(&partition.cache_repr()).await;
        self.invalidate(&partition, sort.as_ref());
        self.put_values(&partition, sort.as_ref(), value.into()).await
    }

    /// Delete the item under the key and return its old attributes.
    ///
    /// # Errors
    ///
    /// `NotFound` if no item exists under the key.
    pub async fn remove(
        &self,
        partition: impl Into<ScalarValue>,
        sort: Option<ScalarValue>,
    ) -> Result<Item> {
        self.ensure_initialized()?;
        let partition = partition.into();
        self.schema.check_write_key("remove", &partition, sort.as_ref())?;

        let _partition = self.locks.lock(&partition.cache_repr()).await;
        self.invalidate(&partition, sort.as_ref());
        self.delete(&partition, sort.as_ref()).await
    }

    /// Replace the item under the key with one holding the key attributes
    /// plus `attributes`.
    ///
    /// A missing item is not an error: the new item is written and
    /// [`Replaced::previous`] is `None`. A failed remove stops before the put.
    ///
    /// # Errors
    ///
    /// `InvalidKeyUsage` for a bad key shape or an attribute that names a key
    /// attribute.
    pub async fn update(
        &self,
        partition: impl Into<ScalarValue>,
        sort: Option<ScalarValue>,
        attributes: Vec<Attribute>,
    ) -> Result<Replaced> {
        self.ensure_initialized()?;
        let partition = partition.into();
        self.schema.check_write_key("update", &partition, sort.as_ref())?;
        let key_names = self.schema.key_names();
        if let Some(attr) = attributes.iter().find(|a| key_names.contains(&a.name)) {
            return Err(StoreError::InvalidKeyUsage(format!(
                "{} is a key attribute and cannot be updated",
                attr.name
            )));
        }

        let _partition = self.locks.lock(&partition.cache_repr()).await;
        self.invalidate(&partition, sort.as_ref());

        let previous = match self.delete(&partition, sort.as_ref()).await {
            Ok(item) => Some(item),
            Err(StoreError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let mut item = self.schema.key_item(&partition, sort.as_ref());
        for attr in attributes {
            item.insert(attr.name, attr.value);
        }
        self.write(item).await?;
        Ok(Replaced { previous })
    }

    /// Drop cache entries a write to the key makes stale. Caller holds the
    /// partition lock.
    pub(super) fn invalidate(&self, partition: &ScalarValue, sort: Option<&ScalarValue>) {
        let sort = sort.map(ScalarValue::cache_repr);
        self.cache.invalidate(&partition.cache_repr(), sort.as_deref());
    }

    /// Delete without locking or invalidating. Caller holds the partition lock.
    pub(super) async fn delete(
        &self,
        partition: &ScalarValue,
        sort: Option<&ScalarValue>,
    ) -> Result<Item> {
        let request = DeleteItemRequest {
            table_name: self.schema.table_name().to_string(),
            key: self.schema.key_item(partition, sort),
            return_old: true,
        };
        self.backend.delete_item(request).await?.ok_or_else(|| {
            StoreError::NotFound(format!("No such item {}", Self::describe_key(partition, sort)))
        })
    }

    /// Write one full item. Caller holds the partition lock.
    pub(super) async fn write(&self, item: Item) -> Result<()> {
        let request = PutItemRequest {
            table_name: self.schema.table_name().to_string(),
            item,
        };
        self.backend.put_item(request).await?;
        Ok(())
    }

    async fn put_values(
        &self,
        partition: &ScalarValue,
        sort: Option<&ScalarValue>,
        value: Scalars,
    ) -> Result<()> {
        let items: Vec<Item> = value
            .as_slice()
            .iter()
            .map(|v| {
                let mut item = self.schema.key_item(partition, sort);
                item.insert(VALUE_ATTRIBUTE.to_string(), v.clone());
                item
            })
            .collect();

        match value {
            Scalars::One(_) => {
                for item in items {
                    self.write(item).await?;
                }
                Ok(())
            }
            Scalars::Many(_) => {
                debug!(writes = items.len(), "fanning out put");
                let results = join_all(items.into_iter().map(|item| self.write(item))).await;
                results.into_iter().collect::<Result<Vec<()>>>().map(|_| ())
            }
        }
    }
}
