use std::sync::Arc;

use tracing::instrument;

use crate::{
    logging::FreshnessEvent, storage::FreshnessRecords, traits::CatalogApi,
    util::validation::validate_offer_id, Status,
};

/// Decides whether an offer needs a metadata round trip and returns the
/// server timestamp to validate the cached descriptor against.
#[derive(Clone)]
pub struct FreshnessResolver {
    api: Arc<dyn CatalogApi>,
    records: FreshnessRecords,
}

impl FreshnessResolver {
    pub fn new(api: Arc<dyn CatalogApi>, records: FreshnessRecords) -> Self {
        FreshnessResolver { api, records }
    }

    /// A clean record answers from storage with no network call. A missing
    /// or dirty record always goes through the metadata endpoint. A failed
    /// metadata request writes nothing.
    #[instrument(name = "freshness::resolve", level = "trace", skip(self))]
    pub async fn resolve(&self, offer_id: &str) -> Result<i64, Status> {
        validate_offer_id(offer_id)?;

        if let Some(record) = self.records.read(offer_id).await? {
            if record.is_fresh() {
                FreshnessEvent::cache_hit(offer_id, record.last_observed_server_timestamp);
                return Ok(record.last_observed_server_timestamp);
            }
        }

        let timestamp = match self.api.offer_updated_date(offer_id).await {
            Ok(timestamp) => timestamp,
            Err(status) => {
                FreshnessEvent::check(offer_id, None, Some(status.to_string()));
                return Err(status);
            }
        };

        // Re-read, the record may have changed while the request was out.
        let mut record = self.records.read(offer_id).await?.unwrap_or_default();
        record.observe(timestamp);
        self.records.write(offer_id, &record).await?;

        FreshnessEvent::check(offer_id, Some(timestamp), None);
        Ok(timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cache::testing::FakeCatalogApi, documents::FreshnessRecord, storage::MemoryStore,
    };
    use futures::FutureExt;

    fn resolver(api: &Arc<FakeCatalogApi>) -> (FreshnessResolver, FreshnessRecords) {
        let records = FreshnessRecords::new(Arc::new(MemoryStore::new()));
        let resolver = FreshnessResolver::new(api.clone(), records.clone());
        (resolver, records)
    }

    fn fresh_record(timestamp: i64) -> FreshnessRecord {
        let mut record = FreshnessRecord::default();
        record.observe(timestamp);
        record.mark_fetched(timestamp);
        record
    }

    #[tokio::test]
    async fn missing_record_checks_metadata() {
        let api = Arc::new(FakeCatalogApi::new());
        api.set_updated_date("OFR-1", 1000);
        let (resolver, records) = resolver(&api);

        assert_eq!(resolver.resolve("OFR-1").await, Ok(1000));
        assert_eq!(api.metadata_calls(), 1);

        let record = records.read("OFR-1").await.unwrap().unwrap();
        assert_eq!(
            record,
            FreshnessRecord {
                last_known_server_timestamp: 0,
                last_observed_server_timestamp: 1000,
                dirty: true,
            }
        );
    }

    #[tokio::test]
    async fn dirty_record_always_checks_metadata() {
        let api = Arc::new(FakeCatalogApi::new());
        api.set_updated_date("OFR-1", 1000);
        let (resolver, records) = resolver(&api);
        let mut record = fresh_record(1000);
        record.mark_dirty();
        records.write("OFR-1", &record).await.unwrap();

        for _ in 0..3 {
            assert_eq!(resolver.resolve("OFR-1").await, Ok(1000));
        }
        assert_eq!(api.metadata_calls(), 3);
        assert!(records.read("OFR-1").await.unwrap().unwrap().dirty);
    }

    #[tokio::test]
    async fn clean_record_short_circuits() {
        let api = Arc::new(FakeCatalogApi::new());
        let (resolver, records) = resolver(&api);
        records.write("OFR-2", &fresh_record(1000)).await.unwrap();

        // Completes on first poll: nothing is awaited on the network.
        let timestamp = resolver.resolve("OFR-2").now_or_never();
        assert_eq!(timestamp, Some(Ok(1000)));
        assert_eq!(api.metadata_calls(), 0);
    }

    #[tokio::test]
    async fn metadata_failure_writes_nothing() {
        let api = Arc::new(FakeCatalogApi::new());
        api.fail_updated_date("OFR-1", Status::internal("metadata down"));
        let (resolver, records) = resolver(&api);

        assert_eq!(
            resolver.resolve("OFR-1").await,
            Err(Status::internal("metadata down"))
        );
        assert_eq!(records.read("OFR-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn newer_observation_keeps_known_timestamp() {
        let api = Arc::new(FakeCatalogApi::new());
        api.set_updated_date("OFR-1", 2000);
        let (resolver, records) = resolver(&api);
        let mut record = fresh_record(1000);
        record.mark_dirty();
        records.write("OFR-1", &record).await.unwrap();

        assert_eq!(resolver.resolve("OFR-1").await, Ok(2000));
        let record = records.read("OFR-1").await.unwrap().unwrap();
        assert_eq!(record.last_known_server_timestamp, 1000);
        assert_eq!(record.last_observed_server_timestamp, 2000);
        assert!(record.dirty);
    }

    #[tokio::test]
    async fn invalid_offer_id_is_rejected_before_network() {
        let api = Arc::new(FakeCatalogApi::new());
        let (resolver, _) = resolver(&api);

        assert!(matches!(
            resolver.resolve("").await,
            Err(Status::InvalidArgument(_))
        ));
        assert_eq!(api.metadata_calls(), 0);
    }
}
