//! Publishing a NetCDF coverage view in one call.
//!
//! A [`CoverageViewRequest`] names the workspace, the store holding the NetCDF
//! file, the layer to create and the variables that become its bands. The
//! publisher turns it into a full coverage descriptor, posts it, and binds the
//! default style.

use gscoverage_model::{
    CoverageDescriptor, CoverageView, DimensionDescriptor, MetadataEntry, Namespace, SampleType,
    StoreDescriptor, StoreReference,
};
use gscoverage_xml::SerializeOptions;
use tracing::info;
use typed_builder::TypedBuilder;

use crate::catalog::Catalog;
use crate::error::{GeoServerError, GeoServerResult};
use crate::transport::Transport;

/// SRS declared for published NetCDF coverages.
pub const DEFAULT_SRS: &str = "EPSG:4326";

/// Interpolation GeoServer applies when resampling.
pub const DEFAULT_INTERPOLATION: &str = "nearest neighbor";

/// Description attached to generated coverages.
pub const DEFAULT_DESCRIPTION: &str = "Generated from NetCDF";

/// What to publish.
///
/// # Examples
///
/// ```
/// use gscoverage_core::publisher::CoverageViewRequest;
///
/// let request = CoverageViewRequest::builder()
///     .workspace("my_test_2")
///     .store("nmefc_2016072112_opdr")
///     .layer("wind")
///     .bands(vec!["x_wind_10m".into(), "y_wind_10m".into()])
///     .style("my_test_2:wind")
///     .build();
/// let descriptor = request.to_descriptor().unwrap();
/// assert_eq!(descriptor.dimensions.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct CoverageViewRequest {
    /// Target workspace.
    #[builder(setter(into))]
    pub workspace: String,
    /// Existing coverage store holding the NetCDF file.
    #[builder(setter(into))]
    pub store: String,
    /// Name of the coverage, coverage view and layer.
    #[builder(setter(into))]
    pub layer: String,
    /// NetCDF variables, one band each, in channel order.
    pub bands: Vec<String>,
    /// Default style, optionally `workspace:style`.
    #[builder(default, setter(into, strip_option))]
    pub style: Option<String>,
    /// Title; the layer name when unset.
    #[builder(default, setter(into, strip_option))]
    pub title: Option<String>,
    /// `dirName` metadata; `{store}_{layer}` when unset.
    #[builder(default, setter(into, strip_option))]
    pub dir_name: Option<String>,
    /// Sample type of every band.
    #[builder(default)]
    pub sample_type: SampleType,
}

impl CoverageViewRequest {
    /// Build the coverage descriptor for this request.
    ///
    /// Every call builds new values; nothing is shared between requests.
    ///
    /// # Errors
    ///
    /// Returns [`GeoServerError::InvalidArgument`] when no band is given or a
    /// band name is empty.
    pub fn to_descriptor(&self) -> GeoServerResult<CoverageDescriptor> {
        if self.bands.is_empty() {
            return Err(GeoServerError::InvalidArgument(format!(
                "coverage view `{}` needs at least one band",
                self.layer
            )));
        }
        if self.bands.iter().any(String::is_empty) {
            return Err(GeoServerError::InvalidArgument(format!(
                "coverage view `{}` has an empty band name",
                self.layer
            )));
        }

        let view = CoverageView::with_bands(self.layer.as_str(), &self.bands);
        let dir_name = self
            .dir_name
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.store, self.layer));
        let dimensions = self
            .bands
            .iter()
            .map(|band| DimensionDescriptor::unbounded(band.as_str(), self.sample_type.clone()))
            .collect();

        Ok(CoverageDescriptor::builder()
            .name(self.layer.as_str())
            .native_name(self.layer.as_str())
            .namespace(Namespace::new(self.workspace.as_str(), self.workspace.as_str()))
            .title(self.title.clone().unwrap_or_else(|| self.layer.clone()))
            .description(DEFAULT_DESCRIPTION)
            .enabled(true)
            .metadata(vec![
                MetadataEntry::coverage_view(view),
                MetadataEntry::caching_enabled(false),
                MetadataEntry::dir_name(dir_name),
            ])
            .store(StoreReference::coverage_store(&self.workspace, &self.store))
            .native_format(StoreDescriptor::NETCDF)
            .default_interpolation_method(DEFAULT_INTERPOLATION)
            .dimensions(dimensions)
            .request_srs(vec![DEFAULT_SRS.to_owned()])
            .response_srs(vec![DEFAULT_SRS.to_owned()])
            .native_coverage_name(self.layer.as_str())
            .build())
    }
}

/// Publishes coverage views through a [`Catalog`].
#[derive(Debug)]
pub struct CoverageViewPublisher<'a, T> {
    catalog: &'a Catalog<T>,
    options: SerializeOptions,
}

impl<'a, T: Transport> CoverageViewPublisher<'a, T> {
    /// A publisher with lenient serialization.
    pub fn new(catalog: &'a Catalog<T>) -> Self {
        Self {
            catalog,
            options: SerializeOptions::default(),
        }
    }

    /// Use the given serializer options.
    #[must_use]
    pub fn with_options(mut self, options: SerializeOptions) -> Self {
        self.options = options;
        self
    }

    /// Publish the coverage view, then bind its style if one was requested.
    ///
    /// Returns the descriptor that was sent.
    pub async fn publish(&self, request: &CoverageViewRequest) -> GeoServerResult<CoverageDescriptor> {
        let descriptor = request.to_descriptor()?;
        self.catalog
            .publish_coverage(
                &request.workspace,
                &request.store,
                &descriptor.to_document(),
                &self.options,
            )
            .await?;

        if let Some(style) = &request.style {
            self.catalog.bind_layer_style(&request.layer, style).await?;
        }
        info!(
            workspace = %request.workspace,
            layer = %request.layer,
            bands = request.bands.len(),
            "coverage view published"
        );
        Ok(descriptor)
    }
}
