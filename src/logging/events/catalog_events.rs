use serde::{Deserialize, Serialize};

use crate::{log_event, logging::LogEvent};

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct CatalogEvent {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch: Option<Fetch>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coalesced: Option<String>,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct Fetch {
    pub offer_id: String,
    pub locale: String,
    pub endpoint: Endpoint,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq)]
pub enum Endpoint {
    #[default]
    Public,
    Private,
}

impl CatalogEvent {
    pub fn fetch(offer_id: &str, locale: &str, endpoint: Endpoint, error: Option<String>) {
        log_event!(LogEvent::Catalog(CatalogEvent {
            fetch: Some(Fetch {
                offer_id: offer_id.to_owned(),
                locale: locale.to_owned(),
                endpoint,
                error,
            }),
            ..Default::default()
        }));
    }

    pub fn cache_hit(offer_id: &str) {
        log_event!(LogEvent::Catalog(CatalogEvent {
            cache_hit: Some(offer_id.to_owned()),
            ..Default::default()
        }));
    }

    pub fn coalesced(offer_id: &str) {
        log_event!(LogEvent::Catalog(CatalogEvent {
            coalesced: Some(offer_id.to_owned()),
            ..Default::default()
        }));
    }
}
