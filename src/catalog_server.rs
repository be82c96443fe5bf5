use clap::Parser;
use offer_catalog::{
    api::{HttpCatalogApi, SessionAuth},
    cache::OfferCatalog,
    http, storage,
    util::config::Config,
    Status, Tracing,
};
use std::{env, sync::Arc};
use tracing::info;
use warp::{self, Filter};

#[derive(Parser)]
struct Opts {
    /// Port number to use for listening to HTTP requests.
    #[clap(short, long, default_value = "8080")]
    port: u16,

    /// JSON file containing catalog hosts and store configuration.
    #[clap(long, default_value = "config.json")]
    config: String,

    /// Start with connectivity marked as unavailable. Cached offers are then
    /// not forced through re-validation until connectivity is restored.
    #[clap(long)]
    offline: bool,

    /// GCP project used for trace export when running in production.
    #[clap(long)]
    prod_tracing: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Status> {
    let opts: Opts = Opts::parse();

    match &opts.prod_tracing {
        None => Tracing::setup("catalog-server")?,
        Some(project_id) => Tracing::setup_prod(project_id)?,
    }

    // Let ENV VAR override flag.
    let port: u16 = match env::var("PORT") {
        Ok(port) => match port.parse::<u16>() {
            Ok(port) => port,
            Err(_) => opts.port,
        },
        Err(_) => opts.port,
    };

    let config = Config::from_file(&opts.config)?;
    let store = storage::open(&config.store).await?;
    let auth = Arc::new(SessionAuth::new());
    let catalog = Arc::new(OfferCatalog::new(
        Arc::new(HttpCatalogApi::new(config.catalog)),
        store,
        auth.clone(),
        &config.locale,
        &config.default_pack_art,
    )?);
    catalog.start(!opts.offline).await?;

    info!("catalog server started on port {port}");

    warp::serve(
        http::routes::routes(catalog, auth).with(
            warp::cors()
                .allow_methods(vec!["GET", "POST"])
                .allow_headers(vec!["Content-Type", "Authorization"])
                .allow_any_origin(),
        ),
    )
    .run(([0, 0, 0, 0], port))
    .await;

    Ok(())
}
