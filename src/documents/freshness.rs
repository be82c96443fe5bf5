use serde::{Deserialize, Serialize};

/// Freshness bookkeeping for one offer.
///
/// A clean record (`dirty == false`) always has
/// `last_known_server_timestamp == last_observed_server_timestamp`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FreshnessRecord {
    /// Server timestamp of the descriptor currently held in the cache.
    #[serde(default)]
    pub last_known_server_timestamp: i64,

    /// Most recent server timestamp returned by a metadata check.
    #[serde(default)]
    pub last_observed_server_timestamp: i64,

    #[serde(default = "dirty_default")]
    pub dirty: bool,
}

fn dirty_default() -> bool {
    true
}

impl Default for FreshnessRecord {
    fn default() -> Self {
        FreshnessRecord {
            last_known_server_timestamp: 0,
            last_observed_server_timestamp: 0,
            dirty: true,
        }
    }
}

impl FreshnessRecord {
    pub fn is_fresh(&self) -> bool {
        !self.dirty
    }

    /// Records a timestamp returned by a metadata check. A timestamp that
    /// differs from the cached descriptor's dirties the record.
    pub fn observe(&mut self, timestamp: i64) {
        self.last_observed_server_timestamp = timestamp;
        if timestamp != self.last_known_server_timestamp {
            self.dirty = true;
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Records that the descriptor fetched for `timestamp` is now cached.
    ///
    /// The record only turns clean if no newer timestamp was observed while
    /// the fetch was in flight. Returns whether the record is clean.
    pub fn mark_fetched(&mut self, timestamp: i64) -> bool {
        self.last_known_server_timestamp = timestamp;
        if self.last_observed_server_timestamp == timestamp {
            self.dirty = false;
        }
        !self.dirty
    }
}
