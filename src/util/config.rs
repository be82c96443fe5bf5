use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::Status;

/// Service configuration loaded from a JSON file.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub catalog: CatalogHosts,

    #[serde(default = "default_locale")]
    pub locale: String,

    /// Box art used for bulk seeded offers that carry none.
    #[serde(default = "default_pack_art")]
    pub default_pack_art: String,

    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CatalogHosts {
    /// Host of the lightweight last-modified-date endpoint.
    pub metadata_host: String,

    pub public_host: String,
    pub private_host: String,

    /// Host serving the critical catalog snapshot. Defaults to the public
    /// host.
    #[serde(default)]
    pub bulk_host: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    #[default]
    Memory,
    File {
        path: String,
    },
    Firestore {
        project_id: String,
    },
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Status> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Status::invalid_argument(format!(
                "failed to read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, Status> {
        let config: Config = serde_json::from_str(text)?;
        if config.catalog.metadata_host.is_empty()
            || config.catalog.public_host.is_empty()
            || config.catalog.private_host.is_empty()
        {
            return Err(Status::invalid_argument(
                "config catalog hosts must not be empty",
            ));
        }
        Ok(config)
    }
}

fn default_locale() -> String {
    String::from("en_US")
}

fn default_pack_art() -> String {
    String::from(DEFAULT_PACK_ART)
}

pub const DEFAULT_PACK_ART: &str = "/images/packart-placeholder.jpg";
