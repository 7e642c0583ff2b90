//! gscoverage-publish - publish NetCDF coverage views to GeoServer.
//!
//! Either publishes a coverage described by a JSON file, or builds a
//! coverage view from a list of NetCDF variables.
//!
//! # Usage
//!
//! ```text
//! gscoverage-publish --workspace my_test_2 --store nmefc --descriptor coverage.json
//! gscoverage-publish --workspace my_test_2 --store nmefc --layer wind \
//!     --band x_wind_10m --band y_wind_10m --style my_test_2:wind
//! ```
//!
//! `--dry-run` prints the `<coverage>` document instead of sending it.
//! `--strict` rejects unrecognized descriptor fields and duplicate band
//! indices.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GEOSERVER_URL` | `http://localhost:8080/geoserver/rest` | REST service root |
//! | `GEOSERVER_USER` | `admin` | Basic-auth user |
//! | `GEOSERVER_PASSWORD` | `geoserver` | Basic-auth password |
//! | `GEOSERVER_ACCESS_TOKEN` | *(unset)* | Bearer token, replaces basic auth |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use gscoverage_core::{Catalog, CoverageViewPublisher, CoverageViewRequest, GeoServerConfig};
use gscoverage_model::{CoverageDocument, SampleType};
use gscoverage_xml::{SerializeOptions, coverage_to_string};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gscoverage-publish", version)]
#[command(about = "Publish NetCDF coverage views to GeoServer")]
#[command(group(ArgGroup::new("source").required(true).args(["descriptor", "layer"])))]
struct Args {
    /// Target workspace
    #[arg(long)]
    workspace: String,

    /// Coverage store holding the NetCDF file
    #[arg(long)]
    store: String,

    /// JSON coverage descriptor to publish as-is
    #[arg(long)]
    descriptor: Option<PathBuf>,

    /// Layer name of a coverage view built from --band variables
    #[arg(long, requires = "bands")]
    layer: Option<String>,

    /// NetCDF variable to include in the view (repeatable, in band order)
    #[arg(long = "band", requires = "layer")]
    bands: Vec<String>,

    /// Default style for the view, `ws:style` for a workspace style
    #[arg(long, requires = "layer")]
    style: Option<String>,

    /// Print the <coverage> document instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Reject unrecognized descriptor fields and duplicate band indices
    #[arg(long)]
    strict: bool,
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn load_descriptor(path: &Path) -> Result<CoverageDocument> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read descriptor {}", path.display()))?;
    CoverageDocument::from_json_str(&json)
        .with_context(|| format!("invalid descriptor {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = GeoServerConfig::from_env();

    init_tracing(&config.log_level)?;

    let options = if args.strict {
        SerializeOptions::strict()
    } else {
        SerializeOptions::default()
    };

    let (document, view) = if let Some(path) = &args.descriptor {
        (load_descriptor(path).await?, None)
    } else {
        let layer = args.layer.clone().context("--layer is required")?;
        let request = CoverageViewRequest {
            workspace: args.workspace.clone(),
            store: args.store.clone(),
            layer,
            bands: args.bands.clone(),
            style: args.style.clone(),
            title: None,
            dir_name: None,
            sample_type: SampleType::default(),
        };
        (request.to_descriptor()?.to_document(), Some(request))
    };

    if args.dry_run {
        let xml = coverage_to_string(&document, &options).context("cannot serialize coverage")?;
        println!("{xml}");
        return Ok(());
    }

    info!(
        service_url = %config.service_url,
        workspace = %args.workspace,
        store = %args.store,
        "publishing coverage",
    );

    let catalog = Catalog::from_config(config).context("cannot build GeoServer client")?;
    let version = catalog.version().await.context("GeoServer is unreachable")?;
    info!(%version, "connected to GeoServer");

    match view {
        Some(request) => {
            CoverageViewPublisher::new(&catalog)
                .with_options(options)
                .publish(&request)
                .await
                .context("cannot publish coverage view")?;
        }
        None => {
            catalog
                .publish_coverage(&args.workspace, &args.store, &document, &options)
                .await
                .context("cannot publish coverage")?;
        }
    }

    Ok(())
}
