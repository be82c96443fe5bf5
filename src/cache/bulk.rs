use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::{descriptors::SeedOutcome, DescriptorCache};
use crate::{
    documents::{BulkOffer, OfferDescriptor},
    logging::BulkEvent,
    Status,
};

/// Seeds the descriptor cache from a critical catalog snapshot.
///
/// Offers already cached are left alone, whether they came from a full
/// fetch or an earlier snapshot. Freshness records are never touched, so a
/// seeded offer is still validated on its first individual fetch.
pub struct BulkSeedMerger {
    descriptors: Arc<DescriptorCache>,
    default_pack_art: String,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct BulkMergeReport {
    pub seeded: usize,
    pub skipped: usize,
    pub invalid: usize,
}

impl BulkSeedMerger {
    pub fn new(descriptors: Arc<DescriptorCache>, default_pack_art: &str) -> Self {
        BulkSeedMerger {
            descriptors,
            default_pack_art: default_pack_art.to_owned(),
        }
    }

    pub fn merge_bulk_snapshot(&self, locale: &str, offers: Vec<BulkOffer>) -> BulkMergeReport {
        self.merge_for_generation(self.descriptors.generation(), locale, offers)
    }

    /// Same as `merge_bulk_snapshot` but drops the whole snapshot if the
    /// cache was cleared after `generation`.
    pub fn merge_for_generation(
        &self,
        generation: u64,
        locale: &str,
        offers: Vec<BulkOffer>,
    ) -> BulkMergeReport {
        self.merge(generation, locale, offers.into_iter().map(Ok))
    }

    /// Merges raw snapshot entries as served by the critical catalog. An
    /// entry that does not decode is counted as invalid and the rest of the
    /// snapshot is still merged.
    pub fn merge_snapshot_entries(
        &self,
        generation: u64,
        locale: &str,
        entries: Vec<serde_json::Value>,
    ) -> BulkMergeReport {
        self.merge(
            generation,
            locale,
            entries
                .into_iter()
                .map(|entry| serde_json::from_value::<BulkOffer>(entry).map_err(Status::from)),
        )
    }

    #[instrument(name = "bulk::merge", level = "trace", skip(self, offers))]
    fn merge(
        &self,
        generation: u64,
        locale: &str,
        offers: impl Iterator<Item = Result<BulkOffer, Status>>,
    ) -> BulkMergeReport {
        let mut report = BulkMergeReport::default();

        for offer in offers {
            let offer = match offer {
                Ok(offer) => offer,
                Err(status) => {
                    warn!("skipping undecodable bulk offer: {status}");
                    report.invalid += 1;
                    continue;
                }
            };

            if self.descriptors.contains(&offer.offer_id) {
                report.skipped += 1;
                continue;
            }

            let descriptor = match OfferDescriptor::from_bulk(offer, &self.default_pack_art) {
                Ok(descriptor) => descriptor,
                Err(status) => {
                    warn!("skipping bulk offer: {status}");
                    report.invalid += 1;
                    continue;
                }
            };

            match self.descriptors.seed(generation, descriptor) {
                SeedOutcome::Seeded => report.seeded += 1,
                SeedOutcome::Present => report.skipped += 1,
                SeedOutcome::Stale => {
                    warn!("catalog cleared during bulk merge, dropping snapshot");
                    break;
                }
            }
        }

        BulkEvent::merge(locale, report.seeded, report.skipped, report.invalid);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bulk_offers(value: serde_json::Value) -> Vec<BulkOffer> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn seeds_absent_offers() {
        let descriptors = Arc::new(DescriptorCache::new());
        let merger = BulkSeedMerger::new(descriptors.clone(), "/default.jpg");

        let report = merger.merge_bulk_snapshot(
            "en_US",
            bulk_offers(json!([
                {"offerId": "OFR-5", "displayName": "X", "isDownloadable": "True"},
            ])),
        );

        assert_eq!(
            report,
            BulkMergeReport {
                seeded: 1,
                skipped: 0,
                invalid: 0
            }
        );
        let descriptor = descriptors.get("OFR-5").unwrap();
        assert_eq!(descriptor.downloadable, Some(true));
        assert_eq!(descriptor.display_name.as_deref(), Some("X"));
        assert_eq!(descriptor.pack_art.as_deref(), Some("/default.jpg"));
    }

    #[test]
    fn never_clobbers_cached_descriptor() {
        let descriptors = Arc::new(DescriptorCache::new());
        let fetched = OfferDescriptor {
            offer_id: "OFR-1".to_owned(),
            display_name: Some("Full Game".to_owned()),
            downloadable: Some(true),
            extra_content: vec!["OFR-1-DLC".to_owned()],
            ..Default::default()
        };
        descriptors.insert(descriptors.generation(), fetched.clone());
        let before = serde_json::to_vec(&fetched).unwrap();

        let merger = BulkSeedMerger::new(descriptors.clone(), "/default.jpg");
        let report = merger.merge_bulk_snapshot(
            "en_US",
            bulk_offers(json!([
                {"offerId": "OFR-1", "displayName": "Abbreviated", "isDownloadable": "False"},
                {"offerId": "OFR-2", "displayName": "Other"},
            ])),
        );

        assert_eq!(report.seeded, 1);
        assert_eq!(report.skipped, 1);
        let after = serde_json::to_vec(&descriptors.get("OFR-1").unwrap()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn duplicate_offers_in_snapshot_seed_once() {
        let descriptors = Arc::new(DescriptorCache::new());
        let merger = BulkSeedMerger::new(descriptors.clone(), "/default.jpg");

        let report = merger.merge_bulk_snapshot(
            "en_US",
            bulk_offers(json!([
                {"offerId": "OFR-1", "displayName": "First"},
                {"offerId": "OFR-1", "displayName": "Second"},
            ])),
        );

        assert_eq!(report.seeded, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            descriptors.get("OFR-1").unwrap().display_name.as_deref(),
            Some("First")
        );
    }

    #[test]
    fn offers_without_id_are_invalid() {
        let descriptors = Arc::new(DescriptorCache::new());
        let merger = BulkSeedMerger::new(descriptors.clone(), "/default.jpg");

        let report = merger.merge_bulk_snapshot(
            "en_US",
            bulk_offers(json!([{"displayName": "No id"}])),
        );

        assert_eq!(report.invalid, 1);
        assert!(descriptors.is_empty());
    }

    #[test]
    fn undecodable_entry_does_not_drop_snapshot() {
        let descriptors = Arc::new(DescriptorCache::new());
        let merger = BulkSeedMerger::new(descriptors.clone(), "/default.jpg");

        let entries = vec![
            json!({"offerId": "OFR-1", "displayName": "Good", "isDownloadable": "True"}),
            json!({"offerId": "OFR-2", "isDownloadable": "yes"}),
            json!({"offerId": 42}),
            json!({"offerId": "OFR-3"}),
        ];
        let report = merger.merge_snapshot_entries(descriptors.generation(), "en_US", entries);

        assert_eq!(
            report,
            BulkMergeReport {
                seeded: 2,
                skipped: 0,
                invalid: 2
            }
        );
        assert!(descriptors.contains("OFR-1"));
        assert!(!descriptors.contains("OFR-2"));
        assert!(descriptors.contains("OFR-3"));
    }

    #[test]
    fn stale_generation_drops_snapshot() {
        let descriptors = Arc::new(DescriptorCache::new());
        let merger = BulkSeedMerger::new(descriptors.clone(), "/default.jpg");
        let generation = descriptors.generation();
        descriptors.clear();

        let report = merger.merge_for_generation(
            generation,
            "en_US",
            bulk_offers(json!([{"offerId": "OFR-1"}])),
        );

        assert_eq!(report.seeded, 0);
        assert!(descriptors.is_empty());
    }
}
