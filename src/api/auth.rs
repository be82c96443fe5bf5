use std::sync::{PoisonError, RwLock};

use tracing::info;

use crate::traits::AuthProvider;

/// In-process login state, updated by whoever owns the login flow.
#[derive(Default)]
pub struct SessionAuth {
    access_token: RwLock<Option<String>>,
}

impl SessionAuth {
    pub fn new() -> Self {
        SessionAuth::default()
    }

    pub fn with_token(token: &str) -> Self {
        SessionAuth {
            access_token: RwLock::new(Some(token.to_owned())),
        }
    }

    pub fn login(&self, token: &str) {
        info!("session login");
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
    }

    pub fn logout(&self) {
        info!("session logout");
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl AuthProvider for SessionAuth {
    fn access_token(&self) -> Option<String> {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|token| !token.is_empty())
    }

    fn is_logged_in(&self) -> bool {
        self.access_token().is_some()
    }
}
