use serde::{Deserialize, Serialize};

use super::LogEvent;

/// Events and latency collected for one span, along with its child spans.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct EventSpan {
    pub name: String,

    #[serde(default)]
    pub latency: u64,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<LogEvent>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EventSpan>,
}

impl EventSpan {
    pub fn new(name: &str) -> Self {
        EventSpan {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Store reads on the same backend are folded into a single entry.
    pub fn add(&mut self, event: LogEvent) {
        if let LogEvent::Store(store_event) = event {
            for existing in self.events.iter_mut() {
                if let LogEvent::Store(existing) = existing {
                    if existing.merge(store_event.clone()) {
                        return;
                    }
                }
            }
            self.events.push(LogEvent::Store(store_event));
        } else {
            self.events.push(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.children.is_empty()
    }
}
