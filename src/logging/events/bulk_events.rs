use serde::{Deserialize, Serialize};

use crate::{log_event, logging::LogEvent};

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct BulkEvent {
    pub locale: String,
    pub seeded: usize,
    pub skipped: usize,
    pub invalid: usize,
}

impl BulkEvent {
    pub fn merge(locale: &str, seeded: usize, skipped: usize, invalid: usize) {
        log_event!(LogEvent::Bulk(BulkEvent {
            locale: locale.to_owned(),
            seeded,
            skipped,
            invalid,
        }));
    }
}
