use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{BulkEvent, CatalogEvent, FreshnessEvent, StoreEvent};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum LogEvent {
    Freshness(FreshnessEvent),
    Catalog(CatalogEvent),
    Bulk(BulkEvent),
    Store(StoreEvent),
}

impl LogEvent {
    pub fn encode(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                warn!("{}", e);
                String::default()
            }
        }
    }

    pub fn decode(encoded: &str) -> Option<Self> {
        serde_json::from_str(encoded).ok()
    }
}

#[macro_export]
macro_rules! log_event {
    ($event:expr) => {
        ::tracing::debug!(event = $event.encode())
    };
}
