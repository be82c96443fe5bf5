use clap::Parser;
use itertools::Itertools;
use offer_catalog::{
    api::{HttpCatalogApi, SessionAuth},
    cache::OfferCatalog,
    storage,
    util::config::Config,
    Tracing,
};
use std::sync::Arc;

/// Critical catalog seeding utility.
#[derive(Parser)]
struct Opts {
    /// JSON file containing catalog hosts and store configuration.
    #[clap(long, default_value = "config.json")]
    config: String,

    /// Overrides the locale from the config file.
    #[clap(long)]
    locale: Option<String>,

    /// Merge a snapshot read from a local JSON file instead of downloading
    /// the critical catalog.
    #[clap(long)]
    snapshot: Option<String>,
}

/// Seeds the descriptor cache from the critical catalog and reports what
/// was merged.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    Tracing::setup("utils/seed_catalog")?;

    let opts: Opts = Opts::parse();
    let config = Config::from_file(&opts.config)?;

    let catalog = OfferCatalog::new(
        Arc::new(HttpCatalogApi::new(config.catalog)),
        storage::open(&config.store).await?,
        Arc::new(SessionAuth::new()),
        opts.locale.as_deref().unwrap_or(&config.locale),
        &config.default_pack_art,
    )?;

    let report = match &opts.snapshot {
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            let entries: Vec<serde_json::Value> = serde_json::from_str(&text)?;
            catalog.merge_snapshot_entries(entries)
        }
        None => catalog.seed_critical_catalog().await?,
    };

    println!(
        "seeded: {}, skipped: {}, invalid: {}",
        report.seeded, report.skipped, report.invalid
    );
    println!("{}", catalog.cached_offer_ids().iter().sorted().join(", "));

    Ok(())
}
