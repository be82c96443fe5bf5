mod bulk;
mod catalog;
mod coalescer;
mod descriptors;
mod fetcher;
mod resolver;

#[cfg(test)]
pub mod testing;

pub use bulk::{BulkMergeReport, BulkSeedMerger};
pub use catalog::{FetchKey, OfferCatalog, OfferState};
pub use coalescer::{Coalescer, SharedFetch};
pub use descriptors::{DescriptorCache, SeedOutcome};
pub use fetcher::CatalogFetcher;
pub use resolver::FreshnessResolver;
