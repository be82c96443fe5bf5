use serde::{Deserialize, Serialize};

use crate::{log_event, logging::LogEvent};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FreshnessEvent {
    pub offer_id: String,
    pub op: FreshnessOp,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum FreshnessOp {
    /// Resolved from a clean record without a network call.
    CacheHit,
    /// Resolved through the metadata endpoint.
    Check,
    /// Record turned clean after a successful fetch.
    MarkFresh,
    /// Fetch completed but a newer timestamp was observed meanwhile.
    Superseded,
    Invalidate,
    InvalidateAll,
}

impl FreshnessEvent {
    pub fn cache_hit(offer_id: &str, timestamp: i64) {
        log_event!(LogEvent::Freshness(FreshnessEvent {
            offer_id: offer_id.to_owned(),
            op: FreshnessOp::CacheHit,
            timestamp: Some(timestamp),
            error: None,
        }));
    }

    pub fn check(offer_id: &str, timestamp: Option<i64>, error: Option<String>) {
        log_event!(LogEvent::Freshness(FreshnessEvent {
            offer_id: offer_id.to_owned(),
            op: FreshnessOp::Check,
            timestamp,
            error,
        }));
    }

    pub fn mark_fresh(offer_id: &str, timestamp: i64, fresh: bool) {
        log_event!(LogEvent::Freshness(FreshnessEvent {
            offer_id: offer_id.to_owned(),
            op: match fresh {
                true => FreshnessOp::MarkFresh,
                false => FreshnessOp::Superseded,
            },
            timestamp: Some(timestamp),
            error: None,
        }));
    }

    pub fn invalidate(offer_id: &str) {
        log_event!(LogEvent::Freshness(FreshnessEvent {
            offer_id: offer_id.to_owned(),
            op: FreshnessOp::Invalidate,
            timestamp: None,
            error: None,
        }));
    }

    pub fn invalidate_all(count: usize) {
        log_event!(LogEvent::Freshness(FreshnessEvent {
            offer_id: String::default(),
            op: FreshnessOp::InvalidateAll,
            timestamp: Some(count as i64),
            error: None,
        }));
    }
}
