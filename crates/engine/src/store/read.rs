//! Cached point and partition reads, existence checks and prefix queries

use super::KeyedStore;
use crate::error::{Result, StoreError};
use keyedstore_backend::{KeyCondition, QueryRequest};
use keyedstore_core::{
    project, AttributeDef, CacheKey, Item, Page, ScalarType, ScalarValue, VALUE_ATTRIBUTE,
};
use std::sync::Arc;
use tracing::debug;

/// What a keyed read returns per row
enum Shape<'a> {
    /// Sort key (when composite) and `Value`
    Value,
    /// Sort key (when composite) and the listed attributes, type-checked
    Attributes(&'a [AttributeDef]),
}

impl KeyedStore {
    /// Items stored under a partition, or one item when `sort` is given.
    ///
    /// Rows contain `Value` and, on composite tables, the sort key. Partition
    /// reads are ordered by descending sort key. The full result is cached
    /// and `page` is applied afterwards, so paging through one partition
    /// costs a single backend query.
    ///
    /// # Errors
    ///
    /// `InvalidKeyUsage` if `sort` is given for a table without a composite
    /// key.
    pub async fn get(
        &self,
        partition: impl Into<ScalarValue>,
        sort: Option<ScalarValue>,
        page: Page,
    ) -> Result<Option<Vec<Item>>> {
        let partition = partition.into();
        let key = CacheKey::new(&partition, sort.as_ref());
        self.cached_read(key, &partition, sort.as_ref(), Shape::Value, page)
            .await
    }

    /// Like [`get`](Self::get), but returns the named attributes instead of
    /// `Value`.
    ///
    /// Each row holds the sort key value first (on composite tables), then
    /// every requested attribute present on the item. A present attribute of
    /// the wrong kind fails with `WrongType`.
    pub async fn get_attr(
        &self,
        partition: impl Into<ScalarValue>,
        sort: Option<ScalarValue>,
        attributes: &[AttributeDef],
        page: Page,
    ) -> Result<Option<Vec<Item>>> {
        let partition = partition.into();
        let key = CacheKey::projected(&partition, sort.as_ref(), attributes);
        self.cached_read(
            key,
            &partition,
            sort.as_ref(),
            Shape::Attributes(attributes),
            page,
        )
        .await
    }

    /// Whether an item (or, without `sort`, any item of the partition) exists.
    ///
    /// A cached entry answers `true` without a backend call.
    pub async fn exists(
        &self,
        partition: impl Into<ScalarValue>,
        sort: Option<ScalarValue>,
    ) -> Result<bool> {
        self.ensure_initialized()?;
        let partition = partition.into();
        self.schema.check_read_key(&partition, sort.as_ref())?;

        if self
            .cache
            .get(&CacheKey::new(&partition, sort.as_ref()))
            .is_some()
        {
            return Ok(true);
        }
        Ok(self.get(partition, sort, Page::all()).await?.is_some())
    }

    /// Items whose partition key starts with `prefix`, each holding the
    /// partition key and `Value`.
    ///
    /// Never cached: a prefix does not map onto one cache key.
    ///
    /// # Errors
    ///
    /// `InvalidKeyUsage` if the partition key is not String-typed.
    pub async fn get_prefix(&self, prefix: &str) -> Result<Option<Vec<Item>>> {
        self.ensure_initialized()?;
        let partition_key = self.schema.partition_key();
        if partition_key.scalar_type != ScalarType::String {
            return Err(StoreError::InvalidKeyUsage(format!(
                "prefix lookup needs a String partition key, {} is {}",
                partition_key.name, partition_key.scalar_type
            )));
        }

        let request = QueryRequest::new(
            self.schema.table_name(),
            KeyCondition::begins_with(partition_key.name.clone(), prefix),
        )
        .projection(vec![partition_key.name.clone(), VALUE_ATTRIBUTE.to_string()]);

        let items = self.query_all(request).await?;
        Ok(if items.is_empty() { None } else { Some(items) })
    }

    async fn cached_read(
        &self,
        key: CacheKey,
        partition: &ScalarValue,
        sort: Option<&ScalarValue>,
        shape: Shape<'_>,
        page: Page,
    ) -> Result<Option<Vec<Item>>> {
        self.ensure_initialized()?;
        self.schema.check_read_key(partition, sort)?;

        if let Some(rows) = self.cache.get(&key) {
            debug!(key = %key, "cache hit");
            return Ok(Some(page.apply(&rows)));
        }

        let _partition = self.locks.lock(key.partition()).await;
        // Another reader may have filled the entry while we waited.
        if let Some(rows) = self.cache.get(&key) {
            return Ok(Some(page.apply(&rows)));
        }
        debug!(key = %key, "cache miss");

        let rows = self.fetch(partition, sort, &shape).await?;
        if rows.is_empty() {
            return Ok(None);
        }

        let rows = Arc::new(rows);
        self.cache.insert(key, rows.clone());
        Ok(Some(page.apply(&rows)))
    }

    async fn fetch(
        &self,
        partition: &ScalarValue,
        sort: Option<&ScalarValue>,
        shape: &Shape<'_>,
    ) -> Result<Vec<Item>> {
        let partition_key = self.schema.partition_key();
        let mut request = QueryRequest::new(
            self.schema.table_name(),
            KeyCondition::eq(partition_key.name.clone(), partition.clone()),
        );

        let mut wanted: Vec<AttributeDef> = Vec::new();
        if let Some(sort_key) = self.schema.sort_key() {
            if let Some(sort) = sort {
                request = request.sort(KeyCondition::eq(sort_key.name.clone(), sort.clone()));
            }
            wanted.push(sort_key.clone());
            request = request.descending();
        }

        let checked = match shape {
            Shape::Value => {
                wanted.push(AttributeDef::string(VALUE_ATTRIBUTE));
                false
            }
            Shape::Attributes(attributes) => {
                wanted.extend(attributes.iter().cloned());
                true
            }
        };

        let request = request.projection(wanted.iter().map(|def| def.name.clone()).collect());
        let rows = self.query_all(request).await?;
        if !checked {
            // `Value` may hold either kind.
            return Ok(rows);
        }
        rows.iter()
            .map(|row| project(row, &wanted).map_err(StoreError::from))
            .collect()
    }

    /// Run a query to exhaustion, following resume keys
    pub(super) async fn query_all(&self, mut request: QueryRequest) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        loop {
            let output = self.backend.query(request.clone()).await?;
            items.extend(output.items);
            match output.last_evaluated_key {
                Some(key) => request.exclusive_start_key = Some(key),
                None => return Ok(items),
            }
        }
    }
}
