use chrono::{DateTime, NaiveDateTime};
use serde::{de::Error, Deserialize, Deserializer, Serialize};

/// Full offer document as returned by the public and private catalog
/// endpoints.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOffer {
    #[serde(default)]
    pub offer_id: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i18n: Option<CatalogI18n>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_title_id: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_display_type: Option<String>,

    #[serde(default, deserialize_with = "flexible_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloadable: Option<bool>,

    #[serde(default, deserialize_with = "flexible_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchasable: Option<bool>,

    #[serde(default, deserialize_with = "flexible_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial: Option<bool>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<CatalogPlatform>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_content: Vec<String>,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CatalogI18n {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_art_small: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_art_medium: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_art_large: Option<String>,
}

impl CatalogI18n {
    /// Largest available box art.
    pub fn pack_art(&self) -> Option<String> {
        self.pack_art_large
            .clone()
            .or_else(|| self.pack_art_medium.clone())
            .or_else(|| self.pack_art_small.clone())
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPlatform {
    pub platform: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_start_date: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_end_date: Option<String>,
}

/// Abbreviated offer record of the critical catalog snapshot.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BulkOffer {
    #[serde(default)]
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

    #[serde(default, deserialize_with = "flexible_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_downloadable: Option<bool>,

    #[serde(default, deserialize_with = "flexible_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_purchasable: Option<bool>,

    #[serde(default, deserialize_with = "flexible_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_trial: Option<bool>,
}

/// Metadata-only response carrying the offer's last modified date.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OfferUpdatedDate {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<String>,

    pub updated_date: ServerTimestamp,
}

/// The metadata endpoint has been observed returning both epoch millis and
/// ISO-8601 strings.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum ServerTimestamp {
    Millis(i64),
    Date(String),
}

impl ServerTimestamp {
    pub fn millis(&self) -> Option<i64> {
        match self {
            ServerTimestamp::Millis(millis) => Some(*millis),
            ServerTimestamp::Date(date) => parse_timestamp(date).map(|secs| secs * 1000),
        }
    }
}

/// Parses catalog dates into a UTC unix timestamp in seconds.
pub fn parse_timestamp(date: &str) -> Option<i64> {
    match DateTime::parse_from_rfc3339(date) {
        Ok(date) => Some(date.timestamp()),
        Err(_) => match NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S") {
            Ok(date) => Some(date.and_utc().timestamp()),
            Err(_) => None,
        },
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    String(String),
}

/// Accepts JSON booleans as well as the "True"/"False" strings used by the
/// bulk catalog.
fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(value)) => Ok(Some(value)),
        Some(BoolOrString::String(value)) => match value.to_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            "" => Ok(None),
            other => Err(D::Error::custom(format!("invalid boolean '{other}'"))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bulk_offer_string_booleans() {
        let offer: BulkOffer = serde_json::from_value(json!({
            "offerId": "OFR-5",
            "displayName": "X",
            "isDownloadable": "True",
            "isPurchasable": "false",
        }))
        .unwrap();

        assert_eq!(offer.is_downloadable, Some(true));
        assert_eq!(offer.is_purchasable, Some(false));
        assert_eq!(offer.is_trial, None);
    }

    #[test]
    fn bulk_offer_rejects_garbage_boolean() {
        let offer = serde_json::from_value::<BulkOffer>(json!({
            "offerId": "OFR-5",
            "isDownloadable": "maybe",
        }));
        assert!(offer.is_err());
    }

    #[test]
    fn catalog_offer_native_booleans() {
        let offer: CatalogOffer = serde_json::from_value(json!({
            "offerId": "OFR-1",
            "downloadable": true,
            "purchasable": null,
        }))
        .unwrap();

        assert_eq!(offer.downloadable, Some(true));
        assert_eq!(offer.purchasable, None);
    }

    #[test]
    fn updated_date_as_millis() {
        let updated: OfferUpdatedDate =
            serde_json::from_value(json!({"offerId": "OFR-1", "updatedDate": 1000})).unwrap();
        assert_eq!(updated.updated_date.millis(), Some(1000));
    }

    #[test]
    fn updated_date_as_string() {
        let updated: OfferUpdatedDate =
            serde_json::from_value(json!({"updatedDate": "1970-01-01T00:00:02Z"})).unwrap();
        assert_eq!(updated.updated_date.millis(), Some(2000));
    }

    #[test]
    fn parse_timestamp_without_offset() {
        assert_eq!(parse_timestamp("1970-01-01T00:01:00"), Some(60));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn pack_art_prefers_largest() {
        let i18n = CatalogI18n {
            pack_art_small: Some("small.jpg".to_owned()),
            pack_art_medium: Some("medium.jpg".to_owned()),
            ..Default::default()
        };
        assert_eq!(i18n.pack_art(), Some("medium.jpg".to_owned()));
    }
}
