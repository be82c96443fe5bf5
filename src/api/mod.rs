mod auth;
mod catalog;
mod firestore;

pub use auth::SessionAuth;
pub use catalog::HttpCatalogApi;
pub use firestore::FirestoreApi;
