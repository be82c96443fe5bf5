use tracing::info;

use crate::{documents::OfferDescriptor, Status};

pub fn counter(name: &str, description: &str) {
    info!(
        labels.log_type = "counters",
        labels.counter = name,
        description
    );
}

pub fn error_counter(name: &str, description: &str, status: &Status) {
    info!(
        labels.log_type = "counters",
        labels.counter_type = "error",
        labels.status = status.to_string(),
        labels.counter = name,
        description
    );
}

pub fn offer_description(descriptor: &OfferDescriptor) -> String {
    format!(
        "'{}', offer: {}, master title: {}",
        descriptor.display_name.as_deref().unwrap_or("untitled"),
        descriptor.offer_id,
        descriptor.master_title_id.as_deref().unwrap_or("none"),
    )
}
