//! Full-table key scans. These bypass the cache.

use super::KeyedStore;
use crate::error::{Result, StoreError};
use keyedstore_backend::ScanRequest;
use keyedstore_core::{project, AttributeDef, Item};

impl KeyedStore {
    /// Key attributes of every item in the table
    pub async fn scan_keys(&self) -> Result<Vec<Item>> {
        self.ensure_initialized()?;
        self.scan_projected(self.key_defs()).await
    }

    /// Key attributes plus `attribute` of every item in the table.
    ///
    /// Items without `attribute` are returned with keys only. A present
    /// attribute of the wrong kind fails with `WrongType`.
    pub async fn scan_keys_for_attr(&self, attribute: AttributeDef) -> Result<Vec<Item>> {
        self.ensure_initialized()?;
        let mut wanted = self.key_defs();
        wanted.push(attribute);
        self.scan_projected(wanted).await
    }

    fn key_defs(&self) -> Vec<AttributeDef> {
        let mut defs = vec![self.schema.partition_key().clone()];
        defs.extend(self.schema.sort_key().cloned());
        defs
    }

    async fn scan_projected(&self, wanted: Vec<AttributeDef>) -> Result<Vec<Item>> {
        let mut request = ScanRequest {
            table_name: self.schema.table_name().to_string(),
            projection: Some(wanted.iter().map(|def| def.name.clone()).collect()),
            ..Default::default()
        };

        let mut items = Vec::new();
        loop {
            let output = self.backend.scan(request.clone()).await?;
            for row in &output.items {
                items.push(project(row, &wanted).map_err(StoreError::from)?);
            }
            match output.last_evaluated_key {
                Some(key) => request.exclusive_start_key = Some(key),
                None => return Ok(items),
            }
        }
    }
}
