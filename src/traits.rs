use async_trait::async_trait;

use crate::{
    documents::{CatalogOffer, FreshnessRecord},
    Status,
};

/// Remote catalog endpoints consumed by the freshness cache.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Lightweight metadata request returning the offer's last modified
    /// timestamp in epoch millis.
    async fn offer_updated_date(&self, offer_id: &str) -> Result<i64, Status>;

    /// Full offer document from the public endpoint. `lmd` is the cache
    /// validation timestamp.
    async fn public_offer(
        &self,
        offer_id: &str,
        locale: &str,
        lmd: i64,
    ) -> Result<CatalogOffer, Status>;

    /// Full offer document from the authenticated endpoint, optionally
    /// scoped to the parent offer of an extra content item.
    async fn private_offer(
        &self,
        offer_id: &str,
        locale: &str,
        lmd: i64,
        parent_offer_id: Option<&str>,
        access_token: &str,
    ) -> Result<CatalogOffer, Status>;

    /// Abbreviated records of the critical catalog snapshot. Entries are
    /// returned undecoded so one bad record does not fail the snapshot.
    async fn critical_catalog(&self, locale: &str) -> Result<Vec<serde_json::Value>, Status>;
}

/// Persistence of freshness records keyed by string.
#[async_trait]
pub trait FreshnessStore: Send + Sync {
    /// Short backend name used in logs.
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<FreshnessRecord>, Status>;
    async fn set(&self, key: &str, record: &FreshnessRecord) -> Result<(), Status>;
    async fn remove(&self, key: &str) -> Result<(), Status>;
    async fn keys(&self) -> Result<Vec<String>, Status>;
}

/// Login state as seen by the catalog client.
pub trait AuthProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn is_logged_in(&self) -> bool;
}
