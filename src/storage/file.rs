use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, sync::Mutex};
use tracing::{info, instrument};

use crate::{documents::FreshnessRecord, traits::FreshnessStore, Status};

/// Keeps all records in a single JSON document on disk. Every write
/// rewrites the document through a temporary file so a crash never leaves
/// it half written.
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, FreshnessRecord>>,
}

impl JsonFileStore {
    #[instrument(level = "trace", skip(path))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Status> {
        let path = path.as_ref().to_path_buf();
        let records = match fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                Status::malformed(format!(
                    "freshness store '{}' failed to parse: {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        info!(
            "opened freshness store '{}' with {} records",
            path.display(),
            records.len()
        );

        Ok(JsonFileStore {
            path,
            records: Mutex::new(records),
        })
    }

    async fn flush(&self, records: &BTreeMap<String, FreshnessRecord>) -> Result<(), Status> {
        let text = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl FreshnessStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<FreshnessRecord>, Status> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, record: &FreshnessRecord) -> Result<(), Status> {
        let mut records = self.records.lock().await;
        let previous = records.insert(key.to_owned(), record.clone());
        if let Err(status) = self.flush(&records).await {
            match previous {
                Some(previous) => records.insert(key.to_owned(), previous),
                None => records.remove(key),
            };
            return Err(status);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Status> {
        let mut records = self.records.lock().await;
        if let Some(previous) = records.remove(key) {
            if let Err(status) = self.flush(&records).await {
                records.insert(key.to_owned(), previous);
                return Err(status);
            }
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, Status> {
        Ok(self.records.lock().await.keys().cloned().collect())
    }
}
