use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{api::FirestoreApi, documents::FreshnessRecord, traits::FreshnessStore, Status};

/// Freshness records in a Firestore collection, one document per key.
pub struct FirestoreStore {
    firestore: FirestoreApi,
}

impl FirestoreStore {
    pub fn new(firestore: FirestoreApi) -> Self {
        FirestoreStore { firestore }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct FreshnessDoc {
    key: String,
    last_known_server_timestamp: i64,
    last_observed_server_timestamp: i64,
    dirty: bool,
}

impl FreshnessDoc {
    fn new(key: &str, record: &FreshnessRecord) -> Self {
        FreshnessDoc {
            key: key.to_owned(),
            last_known_server_timestamp: record.last_known_server_timestamp,
            last_observed_server_timestamp: record.last_observed_server_timestamp,
            dirty: record.dirty,
        }
    }
}

impl From<FreshnessDoc> for FreshnessRecord {
    fn from(doc: FreshnessDoc) -> Self {
        FreshnessRecord {
            last_known_server_timestamp: doc.last_known_server_timestamp,
            last_observed_server_timestamp: doc.last_observed_server_timestamp,
            dirty: doc.dirty,
        }
    }
}

#[async_trait]
impl FreshnessStore for FirestoreStore {
    fn backend(&self) -> &'static str {
        "firestore"
    }

    #[instrument(name = "freshness::firestore::get", level = "trace", skip(self))]
    async fn get(&self, key: &str) -> Result<Option<FreshnessRecord>, Status> {
        let doc: Option<FreshnessDoc> = self
            .firestore
            .db()
            .fluent()
            .select()
            .by_id_in(FRESHNESS)
            .obj()
            .one(key)
            .await?;

        Ok(doc.map(FreshnessRecord::from))
    }

    #[instrument(name = "freshness::firestore::set", level = "trace", skip(self, record))]
    async fn set(&self, key: &str, record: &FreshnessRecord) -> Result<(), Status> {
        self.firestore
            .db()
            .fluent()
            .update()
            .in_col(FRESHNESS)
            .document_id(key)
            .object(&FreshnessDoc::new(key, record))
            .execute::<()>()
            .await?;
        Ok(())
    }

    #[instrument(name = "freshness::firestore::remove", level = "trace", skip(self))]
    async fn remove(&self, key: &str) -> Result<(), Status> {
        self.firestore
            .db()
            .fluent()
            .delete()
            .from(FRESHNESS)
            .document_id(key)
            .execute()
            .await?;
        Ok(())
    }

    #[instrument(name = "freshness::firestore::keys", level = "trace", skip(self))]
    async fn keys(&self) -> Result<Vec<String>, Status> {
        let doc_stream: BoxStream<FreshnessDoc> = self
            .firestore
            .db()
            .fluent()
            .list()
            .from(FRESHNESS)
            .obj()
            .stream_all()
            .await?;

        Ok(doc_stream.map(|doc| doc.key).collect().await)
    }
}

const FRESHNESS: &str = "offer_freshness";
