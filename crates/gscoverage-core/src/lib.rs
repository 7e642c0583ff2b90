//! GeoServer REST client for publishing NetCDF coverage views.
//!
//! The crate ties the descriptor model and its XML form to a running
//! GeoServer:
//!
//! - [`url::build_url`] joins the service root with encoded path segments
//! - [`transport::Transport`] is the HTTP seam, implemented over `reqwest`
//!   with retry on transient gateway errors
//! - [`catalog::Catalog`] discovers workspaces, stores, layers and styles
//!   through a short-lived response cache, and performs the mutating calls
//! - [`publisher::CoverageViewPublisher`] publishes a multi-band coverage view
//!   and binds its default style

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod publisher;
pub mod transport;
pub mod url;

#[cfg(test)]
mod testing;

pub use catalog::Catalog;
pub use config::GeoServerConfig;
pub use error::{GeoServerError, GeoServerResult};
pub use publisher::{CoverageViewPublisher, CoverageViewRequest};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
