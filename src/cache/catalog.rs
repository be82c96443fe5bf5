use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, PoisonError, RwLock,
    },
};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{BulkMergeReport, BulkSeedMerger, CatalogFetcher, Coalescer, DescriptorCache};
use crate::{
    documents::{BulkOffer, OfferDescriptor},
    logging::CatalogEvent,
    storage::FreshnessRecords,
    traits::{AuthProvider, CatalogApi, FreshnessStore},
    util::validation::{validate_locale, validate_offer_id},
    Status,
};

/// Identifies one in-flight fetch. Extra content fetched on behalf of a
/// parent offer does not share a fetch with an unscoped request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub offer_id: String,
    pub parent_offer_id: Option<String>,
    pub locale: String,
}

impl Display for FetchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.parent_offer_id {
            Some(parent) => write!(f, "{}/{} ({})", parent, self.offer_id, self.locale),
            None => write!(f, "{} ({})", self.offer_id, self.locale),
        }
    }
}

/// Cache state of a single offer as seen by callers.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferState {
    /// Nothing cached.
    Absent,
    /// Descriptor from a bulk snapshot that was never validated.
    Seeded,
    /// Descriptor validated against the latest observed server timestamp.
    Fresh,
    /// Descriptor cached but its record is dirty.
    Stale,
}

/// Entry point for offer lookups. Owns the descriptor cache, freshness
/// records and the single-flight registry for one session.
pub struct OfferCatalog {
    locale: RwLock<String>,
    online: AtomicBool,

    api: Arc<dyn CatalogApi>,
    records: FreshnessRecords,
    descriptors: Arc<DescriptorCache>,
    fetcher: Arc<CatalogFetcher>,
    coalescer: Coalescer<FetchKey, OfferDescriptor>,
    merger: BulkSeedMerger,
}

impl OfferCatalog {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        store: Arc<dyn FreshnessStore>,
        auth: Arc<dyn AuthProvider>,
        locale: &str,
        default_pack_art: &str,
    ) -> Result<Self, Status> {
        validate_locale(locale)?;

        let records = FreshnessRecords::new(store);
        let descriptors = Arc::new(DescriptorCache::new());
        Ok(OfferCatalog {
            locale: RwLock::new(locale.to_owned()),
            online: AtomicBool::new(false),
            fetcher: Arc::new(CatalogFetcher::new(
                Arc::clone(&api),
                auth,
                records.clone(),
                Arc::clone(&descriptors),
            )),
            merger: BulkSeedMerger::new(Arc::clone(&descriptors), default_pack_art),
            coalescer: Coalescer::new(),
            api,
            records,
            descriptors,
        })
    }

    /// Marks every persisted freshness record dirty if `online`, so that
    /// everything cached by a previous process is re-validated.
    #[instrument(name = "catalog::start", level = "info", skip(self))]
    pub async fn start(&self, online: bool) -> Result<(), Status> {
        self.online.store(online, Ordering::SeqCst);
        if online {
            let count = self.records.invalidate_all().await?;
            info!("catalog started online, {count} offers marked for re-validation");
        }
        Ok(())
    }

    /// Updates connectivity. Regaining connectivity marks every record dirty.
    /// Returns the number of records that were invalidated.
    #[instrument(name = "catalog::set_online", level = "info", skip(self))]
    pub async fn set_online(&self, online: bool) -> Result<usize, Status> {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        if online && !was_online {
            return self.records.invalidate_all().await;
        }
        Ok(0)
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn locale(&self) -> String {
        self.locale
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Switches the catalog locale. Descriptors are locale specific so a
    /// change drops everything cached. Returns whether the locale changed.
    pub async fn set_locale(&self, locale: &str) -> Result<bool, Status> {
        validate_locale(locale)?;
        {
            let mut current = self.locale.write().unwrap_or_else(PoisonError::into_inner);
            if *current == locale {
                return Ok(false);
            }
            *current = locale.to_owned();
        }
        self.clear().await?;
        Ok(true)
    }

    /// Drops all cached descriptors and freshness records.
    #[instrument(name = "catalog::clear", level = "info", skip(self))]
    pub async fn clear(&self) -> Result<(), Status> {
        self.descriptors.clear();
        self.records.clear().await
    }

    pub fn cached_offer_ids(&self) -> Vec<String> {
        self.descriptors.offer_ids()
    }

    /// Returns the cached descriptor without any freshness check.
    pub fn cached(&self, offer_id: &str) -> Option<OfferDescriptor> {
        self.descriptors.get(offer_id)
    }

    pub async fn state(&self, offer_id: &str) -> Result<OfferState, Status> {
        if !self.descriptors.contains(offer_id) {
            return Ok(OfferState::Absent);
        }
        Ok(match self.records.read(offer_id).await? {
            Some(record) if record.is_fresh() => OfferState::Fresh,
            Some(record) if record.last_known_server_timestamp != 0 => OfferState::Stale,
            _ => OfferState::Seeded,
        })
    }

    pub async fn get_offer(&self, offer_id: &str) -> Result<OfferDescriptor, Status> {
        self.get_scoped_offer(offer_id, None).await
    }

    /// Returns the cached descriptor if it is fresh. Otherwise joins or
    /// starts the fetch for (`offer_id`, `parent_offer_id`, locale).
    #[instrument(name = "catalog::get_offer", level = "info", skip(self))]
    pub async fn get_scoped_offer(
        &self,
        offer_id: &str,
        parent_offer_id: Option<&str>,
    ) -> Result<OfferDescriptor, Status> {
        validate_offer_id(offer_id)?;

        if let Some(descriptor) = self.descriptors.get(offer_id) {
            if let Some(record) = self.records.read(offer_id).await? {
                if record.is_fresh() {
                    CatalogEvent::cache_hit(offer_id);
                    return Ok(descriptor);
                }
            }
        }

        let key = FetchKey {
            offer_id: offer_id.to_owned(),
            parent_offer_id: parent_offer_id.map(|id| id.to_owned()),
            locale: self.locale(),
        };
        let fetcher = Arc::clone(&self.fetcher);
        let request = key.clone();
        self.coalescer
            .fetch_once(key, move || async move {
                fetcher
                    .fetch(
                        &request.offer_id,
                        &request.locale,
                        request.parent_offer_id.as_deref(),
                    )
                    .await
            })
            .await
    }

    /// Fetches `parent_offer_id` and then each of its extra content offers
    /// concurrently. A failing child does not fail the others.
    #[instrument(name = "catalog::get_extra_content", level = "info", skip(self))]
    pub async fn get_extra_content(
        &self,
        parent_offer_id: &str,
    ) -> Result<Vec<(String, Result<OfferDescriptor, Status>)>, Status> {
        let parent = self.get_offer(parent_offer_id).await?;

        let children = join_all(
            parent
                .extra_content
                .iter()
                .map(|offer_id| self.get_scoped_offer(offer_id, Some(parent_offer_id))),
        )
        .await;

        Ok(parent.extra_content.into_iter().zip(children).collect())
    }

    pub async fn get_offers(
        &self,
        offer_ids: &[String],
    ) -> Vec<(String, Result<OfferDescriptor, Status>)> {
        let results = join_all(offer_ids.iter().map(|offer_id| self.get_offer(offer_id))).await;
        offer_ids.iter().cloned().zip(results).collect()
    }

    /// Marks `offer_id` for re-validation on its next lookup. The cached
    /// descriptor stays available through `cached()`.
    #[instrument(name = "catalog::invalidate", level = "info", skip(self))]
    pub async fn invalidate(&self, offer_id: &str) -> Result<bool, Status> {
        validate_offer_id(offer_id)?;
        self.records.invalidate(offer_id).await
    }

    /// Downloads the critical catalog for the current locale and seeds every
    /// offer that is not cached yet.
    #[instrument(name = "catalog::seed", level = "info", skip(self))]
    pub async fn seed_critical_catalog(&self) -> Result<BulkMergeReport, Status> {
        let locale = self.locale();
        let generation = self.descriptors.generation();
        let entries = self.api.critical_catalog(&locale).await?;
        Ok(self
            .merger
            .merge_snapshot_entries(generation, &locale, entries))
    }

    pub fn merge_bulk_snapshot(&self, offers: Vec<BulkOffer>) -> BulkMergeReport {
        self.merger.merge_bulk_snapshot(&self.locale(), offers)
    }

    pub fn merge_snapshot_entries(&self, entries: Vec<serde_json::Value>) -> BulkMergeReport {
        self.merger
            .merge_snapshot_entries(self.descriptors.generation(), &self.locale(), entries)
    }

    pub fn pending_fetches(&self) -> usize {
        self.coalescer.len()
    }
}
