pub mod handlers;
pub mod models;
pub mod query_logs;
pub mod resources;
pub mod routes;
