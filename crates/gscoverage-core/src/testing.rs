//! In-memory transport for catalog tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::catalog::Catalog;
use crate::config::GeoServerConfig;
use crate::error::GeoServerResult;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

pub(crate) const BASE: &str = "http://gs/geoserver/rest";

/// Answers from a fixed route table and records every request.
/// Unrouted requests get a 404.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    routes: HashMap<(Method, String), HttpResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(mut self, method: Method, url: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert((method, url.to_owned()), HttpResponse::new(status, body.as_bytes()));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn count(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> GeoServerResult<HttpResponse> {
        let response = self
            .routes
            .get(&(request.method, request.url.clone()))
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, "not found"));
        self.requests.lock().push(request);
        Ok(response)
    }
}

pub(crate) fn catalog(transport: MockTransport) -> Catalog<MockTransport> {
    let config = GeoServerConfig::builder()
        .service_url(BASE)
        .cache_ttl_secs(60)
        .build();
    Catalog::new(config, transport)
}
