use std::time::Instant;

use tracing::{error, info};

use crate::Status;

/// One structured log line per handled request.
pub struct RequestEvent {
    method: &'static str,
    url: String,
    handler: &'static str,
    start: Instant,
}

impl RequestEvent {
    pub fn new(method: &'static str, url: impl Into<String>, handler: &'static str) -> Self {
        Self {
            method,
            url: url.into(),
            handler,
            start: Instant::now(),
        }
    }

    pub fn log(self) {
        info!(
            http_request.request_method = self.method,
            http_request.request_url = self.url,
            labels.log_type = QUERY_LOGS,
            labels.handler = self.handler,
            request.latency = self.start.elapsed().as_millis(),
            "{} {}",
            self.method,
            self.url
        )
    }

    pub fn log_error(self, status: &Status) {
        error!(
            http_request.request_method = self.method,
            http_request.request_url = self.url,
            labels.log_type = QUERY_LOGS,
            labels.handler = self.handler,
            labels.status = status.to_string(),
            request.latency = self.start.elapsed().as_millis(),
            "{} {}",
            self.method,
            self.url
        )
    }
}

const QUERY_LOGS: &str = "query_logs";
