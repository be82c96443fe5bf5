use crate::{api::SessionAuth, cache::OfferCatalog};
use std::sync::Arc;
use tracing::warn;
use warp::{self, Filter};

use super::{handlers, models, resources::*};

/// Returns a Filter with all available routes.
pub fn routes(
    catalog: Arc<OfferCatalog>,
    auth: Arc<SessionAuth>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    home()
        .or(get_offer(Arc::clone(&catalog)))
        .or(get_extra_content(Arc::clone(&catalog)))
        .or(post_batch(Arc::clone(&catalog)))
        .or(post_invalidate(Arc::clone(&catalog)))
        .or(post_seed(Arc::clone(&catalog)))
        .or(post_session(auth, Arc::clone(&catalog)))
        .or(post_locale(catalog))
        .or_else(|e| async {
            warn! {"Rejected route: {:?}", e};
            Err(e)
        })
}

/// GET /
fn home() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!().and(warp::get()).and_then(handlers::welcome)
}

/// GET /offers/{offer_id}
fn get_offer(
    catalog: Arc<OfferCatalog>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("offers" / String)
        .and(warp::get())
        .and(with_catalog(catalog))
        .and_then(handlers::get_offer)
}

/// GET /offers/{offer_id}/extra
fn get_extra_content(
    catalog: Arc<OfferCatalog>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("offers" / String / "extra")
        .and(warp::get())
        .and(with_catalog(catalog))
        .and_then(handlers::get_extra_content)
}

/// POST /offers/batch
fn post_batch(
    catalog: Arc<OfferCatalog>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("offers" / "batch")
        .and(warp::post())
        .and(json_body::<models::Batch>())
        .and(with_catalog(catalog))
        .and_then(handlers::post_batch)
}

/// POST /offers/{offer_id}/invalidate
fn post_invalidate(
    catalog: Arc<OfferCatalog>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("offers" / String / "invalidate")
        .and(warp::post())
        .and(with_catalog(catalog))
        .and_then(handlers::post_invalidate)
}

/// POST /catalog/seed
fn post_seed(
    catalog: Arc<OfferCatalog>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("catalog" / "seed")
        .and(warp::post())
        .and(with_catalog(catalog))
        .and_then(handlers::post_seed)
}

/// POST /session
fn post_session(
    auth: Arc<SessionAuth>,
    catalog: Arc<OfferCatalog>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("session")
        .and(warp::post())
        .and(json_body::<models::Session>())
        .and(with_auth(auth))
        .and(with_catalog(catalog))
        .and_then(handlers::post_session)
}

/// POST /locale
fn post_locale(
    catalog: Arc<OfferCatalog>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("locale")
        .and(warp::post())
        .and(json_body::<models::Locale>())
        .and(with_catalog(catalog))
        .and_then(handlers::post_locale)
}

fn json_body<T: serde::de::DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(16 * 1024).and(warp::body::json())
}
