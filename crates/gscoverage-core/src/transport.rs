//! The HTTP seam between the catalog and GeoServer.
//!
//! [`Transport`] is the only place requests leave the process. The catalog
//! works against the trait so tests can substitute an in-memory server.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::GeoServerConfig;
use crate::error::GeoServerResult;
use crate::url::append_query;

/// Status codes retried by [`ReqwestTransport`].
pub const RETRY_STATUSES: [u16; 3] = [502, 503, 504];

/// Content type of every request body.
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// HTTP methods used against the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether repeating the request is safe. `POST` is never retried.
    #[must_use]
    pub fn is_idempotent(self) -> bool {
        !matches!(self, Self::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// A request to the REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// XML body, if any.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// A `GET` request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    /// A `POST` request carrying an XML body.
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }

    /// A `PUT` request carrying an XML body.
    pub fn put(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Put,
            url: url.into(),
            body: Some(body),
        }
    }

    /// A `DELETE` request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            url: url.into(),
            body: None,
        }
    }
}

/// A response from the REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Sends requests to GeoServer.
///
/// Implementations report any received response as `Ok`, whatever its status;
/// status interpretation belongs to the caller. `Err` means no response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the final response.
    async fn send(&self, request: HttpRequest) -> GeoServerResult<HttpResponse>;
}

#[derive(Debug, Clone)]
enum Auth {
    Basic { username: String, password: String },
    Bearer(String),
}

/// [`Transport`] over `reqwest` with authentication and retry.
///
/// Idempotent requests that come back `502`/`503`/`504`, or that fail to
/// connect or time out, are retried up to `max_retries` times with exponential
/// backoff.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    auth: Auth,
    config: GeoServerConfig,
}

impl ReqwestTransport {
    /// Build a client from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GeoServerError::Http`] if the client cannot be built.
    pub fn new(config: &GeoServerConfig) -> GeoServerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        let auth = match &config.access_token {
            Some(token) => Auth::Bearer(token.clone()),
            None => Auth::Basic {
                username: config.username.clone(),
                password: config.password.clone(),
            },
        };

        Ok(Self {
            client,
            auth,
            config: config.clone(),
        })
    }

    fn build(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        let (url, builder) = match &self.auth {
            Auth::Bearer(token) => {
                let url = append_query(&request.url, &[("access_token", token.as_str())]);
                let builder = self
                    .client
                    .request(request.method.into(), url.as_str())
                    .bearer_auth(token);
                (url, builder)
            }
            Auth::Basic { username, password } => {
                let builder = self
                    .client
                    .request(request.method.into(), request.url.as_str())
                    .basic_auth(username, Some(password));
                (request.url.clone(), builder)
            }
        };
        debug!(method = %request.method, url = %url, "sending request");

        let builder = builder.header(reqwest::header::ACCEPT, XML_CONTENT_TYPE);
        match &request.body {
            Some(body) => builder
                .header(reqwest::header::CONTENT_TYPE, XML_CONTENT_TYPE)
                .body(body.clone()),
            None => builder,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> GeoServerResult<HttpResponse> {
        let max_retries = if request.method.is_idempotent() {
            self.config.max_retries
        } else {
            0
        };
        let mut retry = 0;

        loop {
            match self.build(&request).send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if RETRY_STATUSES.contains(&status) && retry < max_retries {
                        retry += 1;
                        let delay = self.config.backoff_delay(retry);
                        warn!(
                            method = %request.method,
                            url = %request.url,
                            status,
                            retry,
                            max_retries,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            "transient server error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    let body = resp.bytes().await?.to_vec();
                    return Ok(HttpResponse { status, body });
                }
                Err(e) if (e.is_connect() || e.is_timeout()) && retry < max_retries => {
                    retry += 1;
                    let delay = self.config.backoff_delay(retry);
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        error = %e,
                        retry,
                        max_retries,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
