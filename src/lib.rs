pub mod api;
pub mod cache;
pub mod documents;
pub mod http;
pub mod logging;
pub mod storage;
pub mod traits;
pub mod util;

mod status;
pub use status::Status;

mod tracing;
pub use crate::tracing::Tracing;
