use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::{DescriptorCache, FreshnessResolver};
use crate::{
    documents::{CatalogOffer, OfferDescriptor},
    logging::{counter, error_counter, offer_description, CatalogEvent, Endpoint, FreshnessEvent},
    storage::FreshnessRecords,
    traits::{AuthProvider, CatalogApi},
    util::validation::{validate_locale, validate_offer_id},
    Status,
};

/// Performs full descriptor fetches and records their freshness.
pub struct CatalogFetcher {
    api: Arc<dyn CatalogApi>,
    auth: Arc<dyn AuthProvider>,
    resolver: FreshnessResolver,
    records: FreshnessRecords,
    descriptors: Arc<DescriptorCache>,
}

impl CatalogFetcher {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        auth: Arc<dyn AuthProvider>,
        records: FreshnessRecords,
        descriptors: Arc<DescriptorCache>,
    ) -> Self {
        CatalogFetcher {
            resolver: FreshnessResolver::new(Arc::clone(&api), records.clone()),
            api,
            auth,
            records,
            descriptors,
        }
    }

    pub fn resolver(&self) -> &FreshnessResolver {
        &self.resolver
    }

    /// Fetches the full descriptor of `offer_id`, caches it and marks its
    /// freshness record clean.
    ///
    /// A public `NotFound` is retried once against the private endpoint,
    /// which requires an access token. Without one the fetch fails with
    /// `AuthRequired` and no private request is made. On any failure the
    /// freshness record keeps its dirty flag and known timestamp.
    #[instrument(name = "catalog::fetch", level = "trace", skip(self))]
    pub async fn fetch(
        &self,
        offer_id: &str,
        locale: &str,
        parent_offer_id: Option<&str>,
    ) -> Result<OfferDescriptor, Status> {
        validate_offer_id(offer_id)?;
        validate_locale(locale)?;
        if let Some(parent_offer_id) = parent_offer_id {
            validate_offer_id(parent_offer_id)?;
        }

        let generation = self.descriptors.generation();
        let lmd = self.resolver.resolve(offer_id).await?;

        let offer = self
            .fetch_document(offer_id, locale, lmd, parent_offer_id)
            .await?;
        let descriptor = match OfferDescriptor::from_catalog(offer_id, offer) {
            Ok(descriptor) => descriptor,
            Err(status) => {
                error_counter("catalog_normalize_fail", offer_id, &status);
                return Err(status);
            }
        };

        if !self.descriptors.insert(generation, descriptor.clone()) {
            debug!("catalog cleared while fetching '{offer_id}', result not cached");
            return Ok(descriptor);
        }
        self.mark_fetched(offer_id, lmd).await?;

        counter("catalog_fetch", &offer_description(&descriptor));
        Ok(descriptor)
    }

    async fn fetch_document(
        &self,
        offer_id: &str,
        locale: &str,
        lmd: i64,
        parent_offer_id: Option<&str>,
    ) -> Result<CatalogOffer, Status> {
        match self.api.public_offer(offer_id, locale, lmd).await {
            Ok(offer) => {
                CatalogEvent::fetch(offer_id, locale, Endpoint::Public, None);
                Ok(offer)
            }
            Err(Status::NotFound(msg)) => {
                CatalogEvent::fetch(offer_id, locale, Endpoint::Public, Some(msg));

                let access_token = match self.auth.access_token() {
                    Some(token) if self.auth.is_logged_in() => token,
                    _ => {
                        let status = Status::auth_required(format!(
                            "offer '{offer_id}' is only served by the private catalog"
                        ));
                        error_counter("catalog_auth_required", offer_id, &status);
                        return Err(status);
                    }
                };

                let result = self
                    .api
                    .private_offer(offer_id, locale, lmd, parent_offer_id, &access_token)
                    .await;
                CatalogEvent::fetch(
                    offer_id,
                    locale,
                    Endpoint::Private,
                    result.as_ref().err().map(|e| e.to_string()),
                );
                if let Err(status) = &result {
                    error_counter("catalog_private_fetch_fail", offer_id, status);
                }
                result
            }
            Err(status) => {
                CatalogEvent::fetch(offer_id, locale, Endpoint::Public, Some(status.to_string()));
                error_counter("catalog_public_fetch_fail", offer_id, &status);
                Err(status)
            }
        }
    }

    async fn mark_fetched(&self, offer_id: &str, lmd: i64) -> Result<(), Status> {
        let mut record = self.records.read(offer_id).await?.unwrap_or_default();
        let fresh = record.mark_fetched(lmd);
        if let Err(status) = self.records.write(offer_id, &record).await {
            warn!("descriptor '{offer_id}' cached but its freshness was not saved: {status}");
            return Err(status);
        }
        FreshnessEvent::mark_fresh(offer_id, lmd, fresh);
        Ok(())
    }
}
