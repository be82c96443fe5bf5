mod file;
mod firestore;
mod memory;
mod records;

pub use file::JsonFileStore;
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use records::{record_key, FreshnessRecords, KEY_PREFIX};

use std::sync::Arc;

use crate::{api::FirestoreApi, traits::FreshnessStore, util::config::StoreConfig, Status};

/// Opens the store backend selected in the config.
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn FreshnessStore>, Status> {
    Ok(match config {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::File { path } => Arc::new(JsonFileStore::open(path).await?),
        StoreConfig::Firestore { project_id } => {
            Arc::new(FirestoreStore::new(FirestoreApi::connect(project_id).await?))
        }
    })
}
