use crate::{
    documents::{CatalogOffer, OfferUpdatedDate},
    traits::CatalogApi,
    util::config::CatalogHosts,
    Status,
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// `CatalogApi` over the catalog HTTP JSON endpoints.
pub struct HttpCatalogApi {
    hosts: CatalogHosts,
    client: reqwest::Client,
}

impl HttpCatalogApi {
    pub fn new(hosts: CatalogHosts) -> Self {
        HttpCatalogApi {
            hosts,
            client: reqwest::Client::new(),
        }
    }

    fn bulk_host(&self) -> &str {
        match &self.hosts.bulk_host {
            Some(host) => host,
            None => &self.hosts.public_host,
        }
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    #[instrument(level = "trace", skip(self))]
    async fn offer_updated_date(&self, offer_id: &str) -> Result<i64, Status> {
        let url = format!(
            "{}/offer/{offer_id}/{LMD_SERVICE}",
            self.hosts.metadata_host
        );

        let resp: OfferUpdatedDate = get(self.client.get(&url), &url).await?;
        match resp.updated_date.millis() {
            Some(millis) => Ok(millis),
            None => Err(Status::malformed(format!(
                "({offer_id}) unparseable updatedDate: {:?}",
                resp.updated_date
            ))),
        }
    }

    #[instrument(level = "trace", skip(self))]
    async fn public_offer(
        &self,
        offer_id: &str,
        locale: &str,
        lmd: i64,
    ) -> Result<CatalogOffer, Status> {
        let url = format!(
            "{}/{SUPERCAT_SERVICE}/{locale}/offer/{offer_id}",
            self.hosts.public_host
        );

        get(self.client.get(&url).query(&[("lmd", lmd)]), &url).await
    }

    #[instrument(level = "trace", skip(self, access_token))]
    async fn private_offer(
        &self,
        offer_id: &str,
        locale: &str,
        lmd: i64,
        parent_offer_id: Option<&str>,
        access_token: &str,
    ) -> Result<CatalogOffer, Status> {
        let url = format!(
            "{}/{PRIVATE_SERVICE}/{offer_id}/{locale}",
            self.hosts.private_host
        );

        let mut request = self
            .client
            .get(&url)
            .header(AUTH_HEADER, access_token)
            .query(&[("lmd", lmd.to_string())]);
        if let Some(parent_offer_id) = parent_offer_id {
            request = request.query(&[("parentOfferId", parent_offer_id)]);
        }

        get(request, &url).await
    }

    #[instrument(level = "trace", skip(self))]
    async fn critical_catalog(&self, locale: &str) -> Result<Vec<serde_json::Value>, Status> {
        let url = format!(
            "{}/{SUPERCAT_SERVICE}/{locale}/{CRITICAL_CATALOG}",
            self.bulk_host()
        );

        let offers: Vec<serde_json::Value> = get(self.client.get(&url), &url).await?;
        debug!("critical catalog offers: {}", offers.len());
        Ok(offers)
    }
}

async fn get<R: DeserializeOwned>(request: RequestBuilder, url: &str) -> Result<R, Status> {
    let resp = match request.send().await {
        Ok(resp) => resp,
        Err(e) => {
            let status = Status::internal(format!("Request failed: {e}\nurl: {url}"));
            return Err(status);
        }
    };

    match resp.status() {
        StatusCode::NOT_FOUND => return Err(Status::not_found(format!("url: {url}"))),
        status if !status.is_success() => {
            return Err(Status::internal(format!(
                "Request failed with status {status}\nurl: {url}"
            )))
        }
        _ => {}
    }

    let text = resp.text().await?;
    match serde_json::from_str::<R>(&text) {
        Ok(resp) => Ok(resp),
        Err(e) => {
            let status = Status::malformed(format!(
                "Failed to parse response: {e}\nresponse: {text}\nurl: {url}"
            ));
            Err(status)
        }
    }
}

const LMD_SERVICE: &str = "updatedDate";
const SUPERCAT_SERVICE: &str = "supercat";
const PRIVATE_SERVICE: &str = "ecommerce2/private";
const CRITICAL_CATALOG: &str = "critical-catalog.json";
const AUTH_HEADER: &str = "AuthToken";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use warp::{http::StatusCode as HttpStatus, Filter, Reply};

    /// Serves a small catalog on an ephemeral local port.
    fn catalog_server() -> HttpCatalogApi {
        let updated_date =
            warp::path!("offer" / String / "updatedDate").map(|offer_id: String| {
                match offer_id.as_str() {
                    "OFR-1" => {
                        warp::reply::json(&json!({"offerId": "OFR-1", "updatedDate": 1000}))
                            .into_response()
                    }
                    _ => HttpStatus::NOT_FOUND.into_response(),
                }
            });

        let public = warp::path!("supercat" / String / "offer" / String)
            .and(warp::query::<HashMap<String, String>>())
            .map(
                |locale: String, offer_id: String, query: HashMap<String, String>| {
                    match offer_id.as_str() {
                        "OFR-1" => warp::reply::json(&json!({
                            "offerId": "OFR-1",
                            "i18n": {
                                "displayName": format!(
                                    "{locale} lmd={}",
                                    query.get("lmd").cloned().unwrap_or_default()
                                ),
                            },
                        }))
                        .into_response(),
                        "OFR-500" => {
                            warp::reply::with_status("boom", HttpStatus::INTERNAL_SERVER_ERROR)
                                .into_response()
                        }
                        "OFR-BAD" => "not json".into_response(),
                        _ => HttpStatus::NOT_FOUND.into_response(),
                    }
                },
            );

        let private = warp::path!("ecommerce2" / "private" / String / String)
            .and(warp::header::<String>("AuthToken"))
            .and(warp::query::<HashMap<String, String>>())
            .map(
                |offer_id: String,
                 _locale: String,
                 token: String,
                 query: HashMap<String, String>| {
                    warp::reply::json(&json!({
                        "offerId": offer_id,
                        "i18n": {
                            "displayName": format!(
                                "{token} parent={}",
                                query.get("parentOfferId").cloned().unwrap_or_default()
                            ),
                        },
                    }))
                    .into_response()
                },
            );

        let bulk = warp::path!("supercat" / String / "critical-catalog.json").map(|_: String| {
            warp::reply::json(&json!([
                {"offerId": "OFR-5", "isDownloadable": "True"},
                {"offerId": "OFR-6", "isDownloadable": "yes"},
            ]))
            .into_response()
        });

        let routes = updated_date
            .or(bulk)
            .unify()
            .or(public)
            .unify()
            .or(private)
            .unify();
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let host = format!("http://{addr}");
        HttpCatalogApi::new(CatalogHosts {
            metadata_host: host.clone(),
            public_host: host.clone(),
            private_host: host,
            bulk_host: None,
        })
    }

    #[tokio::test]
    async fn updated_date() {
        let api = catalog_server();

        assert_eq!(api.offer_updated_date("OFR-1").await, Ok(1000));
        assert!(matches!(
            api.offer_updated_date("OFR-2").await,
            Err(Status::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn public_offer_carries_locale_and_lmd() {
        let api = catalog_server();

        let offer = api.public_offer("OFR-1", "en_US", 1000).await.unwrap();
        assert_eq!(offer.offer_id, "OFR-1");
        assert_eq!(
            offer.i18n.unwrap().display_name.as_deref(),
            Some("en_US lmd=1000")
        );
    }

    #[tokio::test]
    async fn public_offer_errors() {
        let api = catalog_server();

        assert!(matches!(
            api.public_offer("OFR-404", "en_US", 0).await,
            Err(Status::NotFound(_))
        ));
        assert!(matches!(
            api.public_offer("OFR-500", "en_US", 0).await,
            Err(Status::Internal(_))
        ));
        assert!(matches!(
            api.public_offer("OFR-BAD", "en_US", 0).await,
            Err(Status::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn private_offer_sends_token_and_parent() {
        let api = catalog_server();

        let offer = api
            .private_offer("DLC-1", "en_US", 1000, Some("OFR-1"), "T")
            .await
            .unwrap();
        assert_eq!(offer.offer_id, "DLC-1");
        assert_eq!(
            offer.i18n.unwrap().display_name.as_deref(),
            Some("T parent=OFR-1")
        );

        let offer = api
            .private_offer("OFR-3", "en_US", 1000, None, "T")
            .await
            .unwrap();
        assert_eq!(offer.i18n.unwrap().display_name.as_deref(), Some("T parent="));
    }

    #[tokio::test]
    async fn critical_catalog_returns_raw_entries() {
        let api = catalog_server();

        let entries = api.critical_catalog("en_US").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["isDownloadable"], "yes");
    }
}
