use lazy_static::lazy_static;
use regex::Regex;

use crate::Status;

/// Rejects offer ids that could not have come from the catalog before any
/// request is made with them.
pub fn validate_offer_id(offer_id: &str) -> Result<(), Status> {
    lazy_static! {
        static ref OFFER_ID: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._:\-]*$").unwrap();
    }

    match OFFER_ID.is_match(offer_id) {
        true => Ok(()),
        false => Err(Status::invalid_argument(format!(
            "invalid offer id '{offer_id}'"
        ))),
    }
}

pub fn validate_locale(locale: &str) -> Result<(), Status> {
    lazy_static! {
        static ref LOCALE: Regex = Regex::new(r"^[a-z]{2}_[A-Z]{2}$").unwrap();
    }

    match LOCALE.is_match(locale) {
        true => Ok(()),
        false => Err(Status::invalid_argument(format!(
            "invalid locale '{locale}'"
        ))),
    }
}
