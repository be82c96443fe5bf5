use std::sync::Arc;

use tracing::{instrument, warn};

use crate::{
    documents::FreshnessRecord,
    logging::{FreshnessEvent, StoreEvent},
    traits::FreshnessStore,
    Status,
};

/// Typed access to freshness records by offer id on top of a
/// `FreshnessStore`. Keys are `KEY_PREFIX` followed by the offer id so the
/// store may be shared with unrelated data.
#[derive(Clone)]
pub struct FreshnessRecords {
    store: Arc<dyn FreshnessStore>,
}

impl FreshnessRecords {
    pub fn new(store: Arc<dyn FreshnessStore>) -> Self {
        FreshnessRecords { store }
    }

    pub async fn read(&self, offer_id: &str) -> Result<Option<FreshnessRecord>, Status> {
        let key = record_key(offer_id);
        match self.store.get(&key).await {
            Ok(record) => {
                StoreEvent::read(self.store.backend(), &key, record.is_some(), None);
                Ok(record)
            }
            Err(status) => {
                StoreEvent::read(self.store.backend(), &key, false, Some(status.to_string()));
                Err(status)
            }
        }
    }

    pub async fn write(&self, offer_id: &str, record: &FreshnessRecord) -> Result<(), Status> {
        let key = record_key(offer_id);
        let result = self.store.set(&key, record).await;
        StoreEvent::write(
            self.store.backend(),
            &key,
            result.as_ref().err().map(|e| e.to_string()),
        );
        result
    }

    /// Marks the record of `offer_id` dirty. Returns false if there was no
    /// record.
    #[instrument(level = "trace", skip(self))]
    pub async fn invalidate(&self, offer_id: &str) -> Result<bool, Status> {
        match self.read(offer_id).await? {
            Some(mut record) => {
                record.mark_dirty();
                self.write(offer_id, &record).await?;
                FreshnessEvent::invalidate(offer_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Marks every record dirty, forcing re-validation on next access.
    /// Returns the number of records that changed.
    #[instrument(level = "trace", skip(self))]
    pub async fn invalidate_all(&self) -> Result<usize, Status> {
        let mut count = 0;
        for offer_id in self.offer_ids().await? {
            match self.read(&offer_id).await? {
                Some(mut record) if record.is_fresh() => {
                    record.mark_dirty();
                    self.write(&offer_id, &record).await?;
                    count += 1;
                }
                _ => {}
            }
        }
        FreshnessEvent::invalidate_all(count);
        Ok(count)
    }

    /// Drops every record, e.g. on logout or locale change.
    #[instrument(level = "trace", skip(self))]
    pub async fn clear(&self) -> Result<(), Status> {
        for offer_id in self.offer_ids().await? {
            let key = record_key(&offer_id);
            if let Err(status) = self.store.remove(&key).await {
                warn!("failed to remove freshness record '{key}': {status}");
                StoreEvent::delete(self.store.backend(), &key, Some(status.to_string()));
                return Err(status);
            }
            StoreEvent::delete(self.store.backend(), &key, None);
        }
        Ok(())
    }

    async fn offer_ids(&self) -> Result<Vec<String>, Status> {
        let keys = self.store.keys().await?;
        StoreEvent::list(self.store.backend(), keys.len(), None);
        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(KEY_PREFIX).map(|id| id.to_owned()))
            .collect())
    }
}

pub fn record_key(offer_id: &str) -> String {
    format!("{KEY_PREFIX}{offer_id}")
}

pub const KEY_PREFIX: &str = "catalog_lmd_";
