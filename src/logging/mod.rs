mod catalog_layer;
mod counters;
mod event_span;
mod events;
mod log_event;

pub use catalog_layer::CatalogLogsLayer;
pub use counters::*;
pub use event_span::EventSpan;
pub use events::*;
pub use log_event::*;
