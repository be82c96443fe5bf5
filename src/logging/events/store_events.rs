use serde::{Deserialize, Serialize};

use crate::{log_event, logging::LogEvent};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StoreEvent {
    op: Op,
    backend: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
enum Op {
    Read(ReadStats),
    Write,
    Delete,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct ReadStats {
    read: usize,
    not_found: usize,
}

impl StoreEvent {
    pub fn read(backend: &str, key: &str, found: bool, error: Option<String>) {
        log_event!(LogEvent::Store(StoreEvent {
            op: Op::Read(ReadStats {
                read: 1,
                not_found: if found { 0 } else { 1 },
            }),
            backend: backend.to_owned(),
            key: Some(key.to_owned()),
            errors: error.into_iter().collect(),
        }));
    }

    pub fn list(backend: &str, num: usize, error: Option<String>) {
        log_event!(LogEvent::Store(StoreEvent {
            op: Op::Read(ReadStats {
                read: num,
                not_found: 0,
            }),
            backend: backend.to_owned(),
            key: None,
            errors: error.into_iter().collect(),
        }));
    }

    pub fn write(backend: &str, key: &str, error: Option<String>) {
        log_event!(LogEvent::Store(StoreEvent {
            op: Op::Write,
            backend: backend.to_owned(),
            key: Some(key.to_owned()),
            errors: error.into_iter().collect(),
        }));
    }

    pub fn delete(backend: &str, key: &str, error: Option<String>) {
        log_event!(LogEvent::Store(StoreEvent {
            op: Op::Delete,
            backend: backend.to_owned(),
            key: Some(key.to_owned()),
            errors: error.into_iter().collect(),
        }));
    }

    /// Folds the stats of `other` into this event when both refer to the
    /// same backend operation.
    pub fn merge(&mut self, other: StoreEvent) -> bool {
        if self.backend != other.backend {
            return false;
        }
        match (&mut self.op, other.op) {
            (Op::Read(stats), Op::Read(other_stats)) => {
                stats.read += other_stats.read;
                stats.not_found += other_stats.not_found;
                self.key = None;
                self.errors.extend(other.errors);
                true
            }
            _ => false,
        }
    }
}
