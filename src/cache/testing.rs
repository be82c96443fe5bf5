use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    documents::{CatalogI18n, CatalogOffer},
    traits::CatalogApi,
    Status,
};

/// In-memory `CatalogApi` that counts calls. Offers without a configured
/// response answer `NotFound`.
#[derive(Default)]
pub struct FakeCatalogApi {
    updated_dates: Mutex<HashMap<String, Result<i64, Status>>>,
    public: Mutex<HashMap<String, Result<CatalogOffer, Status>>>,
    private: Mutex<HashMap<String, Result<CatalogOffer, Status>>>,
    bulk: Mutex<Vec<serde_json::Value>>,

    /// (offer id, parent offer id, token) of every private request.
    private_requests: Mutex<Vec<(String, Option<String>, String)>>,

    /// Delay applied to full offer requests.
    delay: Option<Duration>,

    metadata_calls: AtomicUsize,
    public_calls: AtomicUsize,
    private_calls: AtomicUsize,
    bulk_calls: AtomicUsize,
}

pub fn catalog_offer(offer_id: &str, name: &str) -> CatalogOffer {
    CatalogOffer {
        offer_id: offer_id.to_owned(),
        i18n: Some(CatalogI18n {
            display_name: Some(name.to_owned()),
            pack_art_large: Some(format!("{offer_id}.jpg")),
            ..Default::default()
        }),
        downloadable: Some(true),
        ..Default::default()
    }
}

impl FakeCatalogApi {
    pub fn new() -> Self {
        FakeCatalogApi::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        FakeCatalogApi {
            delay: Some(delay),
            ..Default::default()
        }
    }

    /// Serves `offer_id` from the public endpoint with last modified date
    /// `timestamp`.
    pub fn add_public_offer(&self, offer: CatalogOffer, timestamp: i64) {
        self.set_updated_date(&offer.offer_id, timestamp);
        self.public
            .lock()
            .unwrap()
            .insert(offer.offer_id.clone(), Ok(offer));
    }

    /// Answers public requests for `offer_id` with `offer`, whatever offer
    /// it describes.
    pub fn serve_public(&self, offer_id: &str, offer: CatalogOffer) {
        self.public
            .lock()
            .unwrap()
            .insert(offer_id.to_owned(), Ok(offer));
    }

    /// Serves `offer_id` only from the private endpoint.
    pub fn add_private_offer(&self, offer: CatalogOffer, timestamp: i64) {
        self.set_updated_date(&offer.offer_id, timestamp);
        self.private
            .lock()
            .unwrap()
            .insert(offer.offer_id.clone(), Ok(offer));
    }

    pub fn set_updated_date(&self, offer_id: &str, timestamp: i64) {
        self.updated_dates
            .lock()
            .unwrap()
            .insert(offer_id.to_owned(), Ok(timestamp));
    }

    pub fn fail_updated_date(&self, offer_id: &str, status: Status) {
        self.updated_dates
            .lock()
            .unwrap()
            .insert(offer_id.to_owned(), Err(status));
    }

    pub fn fail_public_offer(&self, offer_id: &str, status: Status) {
        self.public
            .lock()
            .unwrap()
            .insert(offer_id.to_owned(), Err(status));
    }

    pub fn set_bulk(&self, offers: Vec<serde_json::Value>) {
        *self.bulk.lock().unwrap() = offers;
    }

    pub fn private_requests(&self) -> Vec<(String, Option<String>, String)> {
        self.private_requests.lock().unwrap().clone()
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn public_calls(&self) -> usize {
        self.public_calls.load(Ordering::SeqCst)
    }

    pub fn private_calls(&self) -> usize {
        self.private_calls.load(Ordering::SeqCst)
    }

    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalogApi {
    async fn offer_updated_date(&self, offer_id: &str) -> Result<i64, Status> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        match self.updated_dates.lock().unwrap().get(offer_id) {
            Some(result) => result.clone(),
            None => Err(Status::not_found(format!("no updatedDate for {offer_id}"))),
        }
    }

    async fn public_offer(
        &self,
        offer_id: &str,
        _locale: &str,
        _lmd: i64,
    ) -> Result<CatalogOffer, Status> {
        self.public_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let result = self.public.lock().unwrap().get(offer_id).cloned();
        match result {
            Some(result) => result,
            None => Err(Status::not_found(format!("public offer {offer_id}"))),
        }
    }

    async fn private_offer(
        &self,
        offer_id: &str,
        _locale: &str,
        _lmd: i64,
        parent_offer_id: Option<&str>,
        access_token: &str,
    ) -> Result<CatalogOffer, Status> {
        self.private_calls.fetch_add(1, Ordering::SeqCst);
        self.private_requests.lock().unwrap().push((
            offer_id.to_owned(),
            parent_offer_id.map(|id| id.to_owned()),
            access_token.to_owned(),
        ));
        self.pause().await;
        let result = self.private.lock().unwrap().get(offer_id).cloned();
        match result {
            Some(result) => result,
            None => Err(Status::not_found(format!("private offer {offer_id}"))),
        }
    }

    async fn critical_catalog(&self, _locale: &str) -> Result<Vec<serde_json::Value>, Status> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bulk.lock().unwrap().clone())
    }
}
