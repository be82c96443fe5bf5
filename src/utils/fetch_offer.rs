use clap::Parser;
use offer_catalog::{
    api::{HttpCatalogApi, SessionAuth},
    cache::OfferCatalog,
    storage,
    util::config::Config,
    Tracing,
};
use std::sync::Arc;

/// Catalog lookup utility.
#[derive(Parser)]
struct Opts {
    /// Offer ids to look up.
    #[clap(required = true)]
    offer_ids: Vec<String>,

    /// JSON file containing catalog hosts and store configuration.
    #[clap(long, default_value = "config.json")]
    config: String,

    /// Overrides the locale from the config file.
    #[clap(long)]
    locale: Option<String>,

    /// Access token used for offers only served by the private catalog.
    #[clap(long)]
    token: Option<String>,

    /// Also fetch the extra content of each offer.
    #[clap(long)]
    extra: bool,

    /// Force re-validation of offers cached by previous runs.
    #[clap(long)]
    revalidate: bool,
}

/// Resolves offers through the freshness cache and prints their descriptors.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    Tracing::setup("utils/fetch_offer")?;

    let opts: Opts = Opts::parse();
    let config = Config::from_file(&opts.config)?;

    let auth = Arc::new(match &opts.token {
        Some(token) => SessionAuth::with_token(token),
        None => SessionAuth::new(),
    });
    let catalog = OfferCatalog::new(
        Arc::new(HttpCatalogApi::new(config.catalog)),
        storage::open(&config.store).await?,
        auth,
        opts.locale.as_deref().unwrap_or(&config.locale),
        &config.default_pack_art,
    )?;
    catalog.start(opts.revalidate).await?;

    for (offer_id, result) in catalog.get_offers(&opts.offer_ids).await {
        match result {
            Ok(offer) => println!("{}", serde_json::to_string_pretty(&offer)?),
            Err(status) => eprintln!("{offer_id}: {status}"),
        }

        if opts.extra {
            for (child_id, result) in catalog.get_extra_content(&offer_id).await? {
                match result {
                    Ok(offer) => println!("{}", serde_json::to_string_pretty(&offer)?),
                    Err(status) => eprintln!("{offer_id}/{child_id}: {status}"),
                }
            }
        }
    }

    Ok(())
}
