mod bulk_events;
mod catalog_events;
mod freshness_events;
mod store_events;

pub use bulk_events::*;
pub use catalog_events::*;
pub use freshness_events::*;
pub use store_events::*;
