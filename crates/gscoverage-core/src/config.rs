//! Client configuration.
//!
//! Provides [`GeoServerConfig`] for connecting to a GeoServer REST endpoint.
//! Values are loaded from environment variables, falling back to the stock
//! GeoServer defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default REST service root.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080/geoserver/rest";

/// GeoServer client configuration.
///
/// # Examples
///
/// ```
/// use gscoverage_core::config::GeoServerConfig;
///
/// let config = GeoServerConfig::default();
/// assert_eq!(config.service_url, "http://localhost:8080/geoserver/rest");
/// assert_eq!(config.max_retries, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GeoServerConfig {
    /// REST service root, e.g. `http://localhost:8080/geoserver/rest`.
    #[builder(default = String::from(DEFAULT_SERVICE_URL), setter(into))]
    pub service_url: String,

    /// Basic-auth user.
    #[builder(default = String::from("admin"), setter(into))]
    pub username: String,

    /// Basic-auth password.
    #[builder(default = String::from("geoserver"), setter(into))]
    pub password: String,

    /// Bearer token. Replaces basic auth when set and is also sent as the
    /// `access_token` query parameter.
    #[builder(default, setter(into, strip_option))]
    pub access_token: Option<String>,

    /// Whether to validate the server's TLS certificate.
    #[builder(default = true)]
    pub verify_tls: bool,

    /// Freshness window of cached GET responses, in seconds.
    #[builder(default = 5)]
    pub cache_ttl_secs: u64,

    /// Retry bound for transient server errors.
    #[builder(default = 6)]
    pub max_retries: u32,

    /// Base retry delay in seconds; retry `n` waits `factor * 2^(n-1)`.
    #[builder(default = 0.9)]
    pub backoff_factor: f64,

    /// Per-request timeout, in seconds.
    #[builder(default = 30)]
    pub timeout_secs: u64,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"), setter(into))]
    pub log_level: String,
}

impl Default for GeoServerConfig {
    fn default() -> Self {
        Self {
            service_url: String::from(DEFAULT_SERVICE_URL),
            username: String::from("admin"),
            password: String::from("geoserver"),
            access_token: None,
            verify_tls: true,
            cache_ttl_secs: 5,
            max_retries: 6,
            backoff_factor: 0.9,
            timeout_secs: 30,
            log_level: String::from("info"),
        }
    }
}

impl GeoServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GEOSERVER_URL` | `http://localhost:8080/geoserver/rest` |
    /// | `GEOSERVER_USER` | `admin` |
    /// | `GEOSERVER_PASSWORD` | `geoserver` |
    /// | `GEOSERVER_ACCESS_TOKEN` | unset |
    /// | `GEOSERVER_VERIFY_TLS` | `true` |
    /// | `GEOSERVER_CACHE_TTL_SECS` | `5` |
    /// | `GEOSERVER_MAX_RETRIES` | `6` |
    /// | `GEOSERVER_BACKOFF_FACTOR` | `0.9` |
    /// | `GEOSERVER_TIMEOUT_SECS` | `30` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Unparseable numbers keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GeoServerConfig::from_env`] over an arbitrary source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("GEOSERVER_URL") {
            config.service_url = v;
        }
        if let Some(v) = lookup("GEOSERVER_USER") {
            config.username = v;
        }
        if let Some(v) = lookup("GEOSERVER_PASSWORD") {
            config.password = v;
        }
        if let Some(v) = lookup("GEOSERVER_ACCESS_TOKEN") {
            if !v.is_empty() {
                config.access_token = Some(v);
            }
        }
        if let Some(v) = lookup("GEOSERVER_VERIFY_TLS") {
            config.verify_tls = parse_bool(&v);
        }
        if let Some(v) = lookup("GEOSERVER_CACHE_TTL_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.cache_ttl_secs = n;
            }
        }
        if let Some(v) = lookup("GEOSERVER_MAX_RETRIES") {
            if let Ok(n) = v.parse::<u32>() {
                config.max_retries = n;
            }
        }
        if let Some(v) = lookup("GEOSERVER_BACKOFF_FACTOR") {
            if let Ok(f) = v.parse::<f64>() {
                if f.is_finite() && f >= 0.0 {
                    config.backoff_factor = f;
                }
            }
        }
        if let Some(v) = lookup("GEOSERVER_TIMEOUT_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.timeout_secs = n;
            }
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Freshness window of cached GET responses.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.backoff_factor * 2f64.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
