use crate::{api::SessionAuth, cache::OfferCatalog};
use std::{convert::Infallible, sync::Arc};
use warp::{self, Filter};

pub fn with_catalog(
    catalog: Arc<OfferCatalog>,
) -> impl Filter<Extract = (Arc<OfferCatalog>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&catalog))
}

pub fn with_auth(
    auth: Arc<SessionAuth>,
) -> impl Filter<Extract = (Arc<SessionAuth>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&auth))
}
