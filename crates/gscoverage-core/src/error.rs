//! Error types for the GeoServer client.

use gscoverage_model::SchemaError;
use gscoverage_xml::XmlError;

use crate::transport::Method;

/// Errors raised while talking to GeoServer or preparing a request for it.
#[derive(Debug, thiserror::Error)]
pub enum GeoServerError {
    /// A request body could not be written or a response could not be parsed.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// A descriptor was malformed or incomplete.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The server answered with a status the operation does not accept.
    /// Carries the raw status and body.
    #[error("{method} {url} failed with status {status}: {body}")]
    Transport {
        /// Request method.
        method: Method,
        /// Request URL.
        url: String,
        /// Response status code.
        status: u16,
        /// Response body as text.
        body: String,
    },

    /// The named item already exists in the catalog.
    #[error("{kind} `{name}` already exists")]
    Conflict {
        /// Catalog item kind, e.g. `layer`.
        kind: &'static str,
        /// Item name.
        name: String,
    },

    /// A catalog item the operation depends on does not exist.
    #[error("{kind} `{name}` not found")]
    NotFound {
        /// Catalog item kind.
        kind: &'static str,
        /// Item name.
        name: String,
    },

    /// More than one catalog item matched a lookup that must be unique.
    #[error("multiple {kind} items match `{name}`")]
    Ambiguous {
        /// Catalog item kind.
        kind: &'static str,
        /// Item name.
        name: String,
    },

    /// The HTTP client failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The caller passed an argument the operation cannot use.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GeoServerError {
    /// Status code of a [`GeoServerError::Transport`] error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience result type for GeoServer operations.
pub type GeoServerResult<T> = Result<T, GeoServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_render_transport_error_with_status_and_body() {
        let err = GeoServerError::Transport {
            method: Method::Post,
            url: "http://h/rest/reload".to_owned(),
            status: 500,
            body: "boom".to_owned(),
        };
        assert_eq!(err.to_string(), "POST http://h/rest/reload failed with status 500: boom");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_should_pass_schema_error_through() {
        let err = GeoServerError::from(SchemaError::missing("metadata[0].key"));
        assert!(err.to_string().contains("metadata[0].key"));
        assert_eq!(err.status(), None);
    }
}
