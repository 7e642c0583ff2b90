//! Integration tests against a live GeoServer.
//!
//! These tests require a GeoServer at `GEOSERVER_URL` (default
//! `http://localhost:8080/geoserver/rest`) with the stock admin account.
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p gscoverage-integration -- --ignored
//! ```
//!
//! Publishing tests additionally need `GEOSERVER_NETCDF_PATH`, a NetCDF file
//! path as seen by the server, and `GEOSERVER_NETCDF_BANDS`, a comma-separated
//! list of its variables.

use std::sync::Once;

use gscoverage_core::{Catalog, GeoServerConfig};

mod test_catalog;
mod test_publish;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A catalog for the server configured in the environment.
#[must_use]
pub fn catalog() -> Catalog {
    init_tracing();
    Catalog::from_config(GeoServerConfig::from_env()).expect("build GeoServer client")
}

/// Generate a unique catalog name for a test.
#[must_use]
pub fn test_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_owned();
    format!("test_{prefix}_{id}")
}

/// Create a workspace with a unique name.
pub async fn create_test_workspace(catalog: &Catalog, prefix: &str) -> String {
    let name = test_name(prefix);
    catalog
        .create_workspace(&name, &format!("http://{name}.example.org"))
        .await
        .expect("create workspace");
    name
}

/// Delete a workspace and everything in it.
pub async fn cleanup_workspace(catalog: &Catalog, name: &str) {
    let url = catalog.url(&["workspaces", name], &[]);
    let _ = catalog.delete(&url, None, true).await;
}
