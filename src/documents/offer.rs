use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{parse_timestamp, BulkOffer, CatalogOffer, CatalogPlatform};
use crate::Status;

/// Normalized representation of one purchasable or ownable content unit.
///
/// A refresh replaces the whole descriptor. Fields are never merged across
/// sources.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct OfferDescriptor {
    pub offer_id: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_art: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_title_id: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_display_type: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloadable: Option<bool>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchasable: Option<bool>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial: Option<bool>,

    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub platforms: BTreeMap<String, PlatformWindow>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_content: Vec<String>,
}

/// Per-platform release and download window. Timestamps are unix seconds.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct PlatformWindow {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<i64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_start_date: Option<i64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_end_date: Option<i64>,
}

impl OfferDescriptor {
    /// Builds a descriptor from a full catalog document that was requested
    /// for `offer_id`.
    pub fn from_catalog(offer_id: &str, offer: CatalogOffer) -> Result<Self, Status> {
        if offer.offer_id != offer_id {
            return Err(Status::malformed(format!(
                "catalog returned offer '{}' for requested offer '{offer_id}'",
                offer.offer_id
            )));
        }

        let mut platforms = BTreeMap::new();
        for platform in &offer.platforms {
            if platform.platform.is_empty() {
                return Err(Status::malformed(format!(
                    "offer '{offer_id}' has a platform entry without a name"
                )));
            }
            platforms.insert(
                platform.platform.clone(),
                PlatformWindow::from_catalog(offer_id, platform)?,
            );
        }

        let (display_name, pack_art) = match &offer.i18n {
            Some(i18n) => (i18n.display_name.clone(), i18n.pack_art()),
            None => (None, None),
        };

        Ok(OfferDescriptor {
            offer_id: offer.offer_id,
            display_name,
            pack_art,
            master_title_id: offer.master_title_id,
            origin_display_type: offer.origin_display_type,
            downloadable: offer.downloadable,
            purchasable: offer.purchasable,
            trial: offer.trial,
            platforms,
            extra_content: offer.extra_content,
        })
    }

    /// Builds a provisional descriptor from an abbreviated bulk record. Only
    /// the box art falls back to a default when missing.
    pub fn from_bulk(offer: BulkOffer, default_pack_art: &str) -> Result<Self, Status> {
        if offer.offer_id.is_empty() {
            return Err(Status::malformed("bulk offer without offerId"));
        }

        Ok(OfferDescriptor {
            offer_id: offer.offer_id,
            display_name: offer.display_name,
            pack_art: Some(
                offer
                    .pack_art
                    .filter(|art| !art.is_empty())
                    .unwrap_or_else(|| default_pack_art.to_owned()),
            ),
            master_title_id: offer.master_title_id,
            origin_display_type: offer.origin_display_type,
            downloadable: offer.is_downloadable,
            purchasable: offer.is_purchasable,
            trial: offer.is_trial,
            ..Default::default()
        })
    }
}

impl PlatformWindow {
    fn from_catalog(offer_id: &str, platform: &CatalogPlatform) -> Result<Self, Status> {
        let parse = |date: &Option<String>| match date {
            Some(date) => match parse_timestamp(date) {
                Some(timestamp) => Ok(Some(timestamp)),
                None => Err(Status::malformed(format!(
                    "offer '{offer_id}' platform '{}' has invalid date '{date}'",
                    platform.platform
                ))),
            },
            None => Ok(None),
        };

        Ok(PlatformWindow {
            release_date: parse(&platform.release_date)?,
            download_start_date: parse(&platform.download_start_date)?,
            use_end_date: parse(&platform.use_end_date)?,
        })
    }
}
