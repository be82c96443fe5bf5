use crate::{cache::OfferState, documents::OfferDescriptor, Status};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Batch {
    pub offer_ids: Vec<String>,
}

impl std::fmt::Display for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.offer_ids.join(","))
    }
}

/// Login when `access_token` is set, logout otherwise. Logging out also
/// drops everything cached for the session.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Session {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Locale {
    pub locale: String,
}

/// Per-offer outcome of a batch or extra content lookup.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OfferResult {
    pub offer_id: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<OfferDescriptor>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
}

impl OfferResult {
    pub fn new(offer_id: String, result: Result<OfferDescriptor, Status>) -> Self {
        match result {
            Ok(offer) => OfferResult {
                offer_id,
                offer: Some(offer),
                error: None,
            },
            Err(status) => OfferResult {
                offer_id,
                offer: None,
                error: Some(status),
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Invalidated {
    pub offer_id: String,
    pub invalidated: bool,
    pub state: OfferState,
}
