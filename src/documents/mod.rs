mod catalog_data;
mod freshness;
mod offer;

pub use catalog_data::*;
pub use freshness::FreshnessRecord;
pub use offer::{OfferDescriptor, PlatformWindow};
