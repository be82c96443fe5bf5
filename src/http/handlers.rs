use crate::{
    api::SessionAuth,
    cache::OfferCatalog,
    http::models,
    Status,
};
use std::{convert::Infallible, sync::Arc};
use tracing::{info, instrument};
use warp::http::StatusCode;

use super::query_logs::*;

#[instrument(level = "info")]
pub async fn welcome() -> Result<impl warp::Reply, Infallible> {
    info!(
        http_request.request_method = "GET",
        http_request.request_url = "/",
        labels.log_type = "query_logs",
        labels.handler = "welcome",
        "welcome"
    );
    Ok("welcome")
}

#[instrument(level = "info", skip(catalog))]
pub async fn get_offer(
    offer_id: String,
    catalog: Arc<OfferCatalog>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = RequestEvent::new("GET", format!("/offers/{offer_id}"), "get_offer");
    match catalog.get_offer(&offer_id).await {
        Ok(offer) => {
            event.log();
            Ok(Box::new(warp::reply::json(&offer)))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

#[instrument(level = "info", skip(catalog))]
pub async fn get_extra_content(
    offer_id: String,
    catalog: Arc<OfferCatalog>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = RequestEvent::new("GET", format!("/offers/{offer_id}/extra"), "extra_content");
    match catalog.get_extra_content(&offer_id).await {
        Ok(children) => {
            event.log();
            let children = children
                .into_iter()
                .map(|(offer_id, result)| models::OfferResult::new(offer_id, result))
                .collect::<Vec<_>>();
            Ok(Box::new(warp::reply::json(&children)))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

#[instrument(level = "info", skip(catalog))]
pub async fn post_batch(
    batch: models::Batch,
    catalog: Arc<OfferCatalog>,
) -> Result<impl warp::Reply, Infallible> {
    let event = RequestEvent::new("POST", "/offers/batch", "batch");
    let results = catalog
        .get_offers(&batch.offer_ids)
        .await
        .into_iter()
        .map(|(offer_id, result)| models::OfferResult::new(offer_id, result))
        .collect::<Vec<_>>();
    event.log();
    Ok(warp::reply::json(&results))
}

#[instrument(level = "info", skip(catalog))]
pub async fn post_invalidate(
    offer_id: String,
    catalog: Arc<OfferCatalog>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = RequestEvent::new("POST", format!("/offers/{offer_id}/invalidate"), "invalidate");
    let result = match catalog.invalidate(&offer_id).await {
        Ok(invalidated) => catalog
            .state(&offer_id)
            .await
            .map(|state| models::Invalidated {
                offer_id,
                invalidated,
                state,
            }),
        Err(status) => Err(status),
    };
    match result {
        Ok(response) => {
            event.log();
            Ok(Box::new(warp::reply::json(&response)))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

#[instrument(level = "info", skip(catalog))]
pub async fn post_seed(catalog: Arc<OfferCatalog>) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = RequestEvent::new("POST", "/catalog/seed", "seed");
    match catalog.seed_critical_catalog().await {
        Ok(report) => {
            event.log();
            Ok(Box::new(warp::reply::json(&report)))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

#[instrument(level = "info", skip(session, auth, catalog))]
pub async fn post_session(
    session: models::Session,
    auth: Arc<SessionAuth>,
    catalog: Arc<OfferCatalog>,
) -> Result<impl warp::Reply, Infallible> {
    let event = RequestEvent::new("POST", "/session", "session");
    match session.access_token {
        Some(token) if !token.is_empty() => {
            auth.login(&token);
            event.log();
            Ok(StatusCode::OK)
        }
        _ => {
            auth.logout();
            match catalog.clear().await {
                Ok(()) => {
                    event.log();
                    Ok(StatusCode::OK)
                }
                Err(status) => {
                    event.log_error(&status);
                    Ok(status_code(&status))
                }
            }
        }
    }
}

#[instrument(level = "info", skip(catalog))]
pub async fn post_locale(
    locale: models::Locale,
    catalog: Arc<OfferCatalog>,
) -> Result<impl warp::Reply, Infallible> {
    let event = RequestEvent::new("POST", "/locale", "locale");
    match catalog.set_locale(&locale.locale).await {
        Ok(_) => {
            event.log();
            Ok(StatusCode::OK)
        }
        Err(status) => {
            event.log_error(&status);
            Ok(status_code(&status))
        }
    }
}

fn status_code(status: &Status) -> StatusCode {
    match status {
        Status::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        // The catalog answered with a document that could not be used.
        Status::Malformed(_) => StatusCode::BAD_GATEWAY,
        Status::NotFound(_) => StatusCode::NOT_FOUND,
        Status::AuthRequired(_) => StatusCode::UNAUTHORIZED,
        Status::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
