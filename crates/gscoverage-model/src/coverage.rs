//! Coverage descriptor types.
//!
//! These mirror GeoServer's `<coverage>` REST body. Every value is built fresh
//! per publish request and never mutated after it is handed to the serializer.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::field::{CoverageDocument, CoverageField};
use crate::types::{EnvelopeCompositionType, SampleType};

/// The `class` attribute GeoServer expects on a coverage's `<store>` element.
pub const COVERAGE_STORE_CLASS: &str = "coverageStore";

/// Metadata key whose value is an embedded coverage view.
pub const COVERAGE_VIEW_KEY: &str = "COVERAGE_VIEW";

/// Metadata key toggling tile caching.
pub const CACHING_ENABLED_KEY: &str = "cachingEnabled";

/// Metadata key naming the coverage's directory on the server.
pub const DIR_NAME_KEY: &str = "dirName";

/// Element name used for metadata entries.
pub const DEFAULT_ENTRY_NAME: &str = "entry";

/// Root entity serialized as a `<coverage>` document.
///
/// # Examples
///
/// ```
/// use gscoverage_model::{CoverageDescriptor, Namespace, StoreReference};
///
/// let coverage = CoverageDescriptor::builder()
///     .name("ceshi_coverage_01")
///     .namespace(Namespace::new("my_test_2", "ceshi"))
///     .store(StoreReference::coverage_store("my_test_2", "nmefc_2016072112_opdr"))
///     .build();
/// assert_eq!(coverage.name, "ceshi_coverage_01");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct CoverageDescriptor {
    /// Published coverage name; must be non-empty.
    #[builder(setter(into))]
    pub name: String,

    /// Native name; defaults to `name` on the server.
    #[builder(default, setter(into, strip_option))]
    pub native_name: Option<String>,

    /// Owning namespace. Required before serialization.
    #[builder(default, setter(strip_option))]
    pub namespace: Option<Namespace>,

    /// Human-readable title.
    #[builder(default, setter(into, strip_option))]
    pub title: Option<String>,

    /// Free-text abstract.
    #[builder(default, setter(into, strip_option))]
    pub description: Option<String>,

    /// Keywords, written as `<string>` children.
    #[builder(default)]
    pub keywords: Vec<String>,

    /// Declared SRS, e.g. `EPSG:4326`.
    #[builder(default, setter(into, strip_option))]
    pub srs: Option<String>,

    /// Projection policy, e.g. `REPROJECT_TO_DECLARED`.
    #[builder(default, setter(into, strip_option))]
    pub projection_policy: Option<String>,

    /// GeoServer disables the layer when `<enabled>` is absent, so publishers
    /// should always set this.
    #[builder(default, setter(strip_option))]
    pub enabled: Option<bool>,

    /// Ordered metadata entries.
    #[builder(default)]
    pub metadata: Vec<MetadataEntry>,

    /// Store reference. Required before serialization.
    #[builder(default, setter(strip_option))]
    pub store: Option<StoreReference>,

    /// Native format, e.g. `NetCDF`.
    #[builder(default, setter(into, strip_option))]
    pub native_format: Option<String>,

    /// Interpolation GeoServer applies when resampling.
    #[builder(default, setter(into, strip_option))]
    pub default_interpolation_method: Option<String>,

    /// Sample dimensions. Always emitted, even when empty.
    #[builder(default)]
    pub dimensions: Vec<DimensionDescriptor>,

    /// SRS codes accepted in requests.
    #[serde(rename = "requestSRS")]
    #[builder(default)]
    pub request_srs: Vec<String>,

    /// SRS codes offered in responses.
    #[serde(rename = "responseSRS")]
    #[builder(default)]
    pub response_srs: Vec<String>,

    /// Name of the coverage inside the store, e.g. the NetCDF variable.
    #[builder(default, setter(into, strip_option))]
    pub native_coverage_name: Option<String>,
}

impl CoverageDescriptor {
    /// Lower this descriptor into the ordered field list the serializer walks.
    ///
    /// Fields follow GeoServer's own document order. Unset optional scalars and
    /// empty string lists are left out; `dimensions` is always present.
    #[must_use]
    pub fn to_document(&self) -> CoverageDocument {
        let mut fields = vec![CoverageField::Name(self.name.clone())];

        if let Some(v) = &self.native_name {
            fields.push(CoverageField::NativeName(v.clone()));
        }
        if let Some(ns) = &self.namespace {
            fields.push(CoverageField::Namespace(ns.clone()));
        }
        if let Some(v) = &self.title {
            fields.push(CoverageField::Title(v.clone()));
        }
        if let Some(v) = &self.description {
            fields.push(CoverageField::Description(v.clone()));
        }
        if !self.keywords.is_empty() {
            fields.push(CoverageField::Keywords(self.keywords.clone()));
        }
        if let Some(v) = &self.srs {
            fields.push(CoverageField::Srs(v.clone()));
        }
        if let Some(v) = &self.projection_policy {
            fields.push(CoverageField::ProjectionPolicy(v.clone()));
        }
        if let Some(v) = self.enabled {
            fields.push(CoverageField::Enabled(v));
        }
        if !self.metadata.is_empty() {
            fields.push(CoverageField::Metadata(self.metadata.clone()));
        }
        if let Some(store) = &self.store {
            fields.push(CoverageField::Store(store.clone()));
        }
        if let Some(v) = &self.native_format {
            fields.push(CoverageField::NativeFormat(v.clone()));
        }
        if let Some(v) = &self.default_interpolation_method {
            fields.push(CoverageField::DefaultInterpolationMethod(v.clone()));
        }
        fields.push(CoverageField::Dimensions(self.dimensions.clone()));
        if !self.request_srs.is_empty() {
            fields.push(CoverageField::RequestSrs(self.request_srs.clone()));
        }
        if !self.response_srs.is_empty() {
            fields.push(CoverageField::ResponseSrs(self.response_srs.clone()));
        }
        if let Some(v) = &self.native_coverage_name {
            fields.push(CoverageField::NativeCoverageName(v.clone()));
        }

        CoverageDocument::new(fields)
    }
}

impl From<&CoverageDescriptor> for CoverageDocument {
    fn from(descriptor: &CoverageDescriptor) -> Self {
        descriptor.to_document()
    }
}

/// Namespace of a coverage. `atom` is a plain scalar in this schema, not an
/// ATOM link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Workspace name.
    pub name: String,
    /// Namespace atom scalar.
    pub atom: String,
}

impl Namespace {
    /// Create a namespace reference.
    pub fn new(name: impl Into<String>, atom: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            atom: atom.into(),
        }
    }
}

/// Reference from a coverage to the store that backs it.
///
/// The `<store>` element is only written when `classname` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReference {
    /// `class` attribute, normally `coverageStore`.
    pub classname: Option<String>,
    /// Qualified `workspace:store` name.
    pub name: String,
}

impl StoreReference {
    /// Reference a coverage store as `workspace:store`.
    pub fn coverage_store(workspace: &str, store: &str) -> Self {
        Self {
            classname: Some(COVERAGE_STORE_CLASS.to_owned()),
            name: format!("{workspace}:{store}"),
        }
    }

    /// A reference without a class; serializes to nothing.
    pub fn unclassified(name: impl Into<String>) -> Self {
        Self {
            classname: None,
            name: name.into(),
        }
    }
}

/// One `<entry key="...">` in a coverage's `<metadata>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Value of the `key` attribute.
    pub key: String,
    /// Element name, `entry` in every GeoServer document seen so far.
    pub name: String,
    /// Opaque tag carried by mapping input; not serialized.
    pub tag: String,
    /// Entry body.
    pub val: MetadataValue,
}

impl MetadataEntry {
    /// A scalar entry.
    pub fn text(key: impl Into<String>, val: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: DEFAULT_ENTRY_NAME.to_owned(),
            tag: String::new(),
            val: MetadataValue::Text(val.into()),
        }
    }

    /// The `COVERAGE_VIEW` entry embedding a coverage view.
    #[must_use]
    pub fn coverage_view(view: CoverageView) -> Self {
        Self {
            key: COVERAGE_VIEW_KEY.to_owned(),
            name: DEFAULT_ENTRY_NAME.to_owned(),
            tag: String::new(),
            val: MetadataValue::CoverageView(view),
        }
    }

    /// The `cachingEnabled` entry.
    #[must_use]
    pub fn caching_enabled(enabled: bool) -> Self {
        Self::text(CACHING_ENABLED_KEY, if enabled { "true" } else { "false" })
    }

    /// The `dirName` entry.
    pub fn dir_name(dir: impl Into<String>) -> Self {
        Self::text(DIR_NAME_KEY, dir)
    }

    /// Whether this entry's key selects the coverage-view body.
    #[must_use]
    pub fn is_coverage_view_key(&self) -> bool {
        self.key.eq_ignore_ascii_case(COVERAGE_VIEW_KEY)
    }
}

/// Body of a metadata entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    /// Nested `<coverageView>`; only valid under `COVERAGE_VIEW`.
    CoverageView(CoverageView),
    /// Literal text content.
    Text(String),
}

/// A virtual coverage composed from bands of underlying coverages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageView {
    /// View name.
    pub name: String,
    /// How the view envelope is derived from its inputs.
    pub envelope_composition_type: EnvelopeCompositionType,
    /// Resolution policy, e.g. `BEST`.
    pub selected_resolution: String,
    /// Index of the selected resolution; `-1` means none.
    pub selected_resolution_index: i32,
    /// Band id to band, in registration order. The order is the raster
    /// channel order and is emitted as-is.
    pub coverage_bands: Vec<(String, BandDescriptor)>,
}

impl CoverageView {
    /// Prefix of generated band ids.
    pub const BAND_ID_PREFIX: &'static str = "coverageband";

    /// An empty view using the best available resolution.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            envelope_composition_type: EnvelopeCompositionType::Intersection,
            selected_resolution: "BEST".to_owned(),
            selected_resolution_index: -1,
            coverage_bands: Vec::new(),
        }
    }

    /// Build a view selecting one band per NetCDF variable, in the given order.
    ///
    /// Band ids are `coverageband_{i}` and indices are zero-based positions.
    ///
    /// # Examples
    ///
    /// ```
    /// use gscoverage_model::CoverageView;
    ///
    /// let view = CoverageView::with_bands("wind", ["x_wind_10m", "y_wind_10m"]);
    /// let ids: Vec<_> = view.coverage_bands.iter().map(|(id, _)| id.as_str()).collect();
    /// assert_eq!(ids, ["coverageband_0", "coverageband_1"]);
    /// assert_eq!(view.coverage_bands[1].1.index, 1);
    /// ```
    pub fn with_bands<I, S>(name: impl Into<String>, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        variables
            .into_iter()
            .enumerate()
            .fold(Self::new(name), |view, (i, var)| {
                let index = u32::try_from(i).unwrap_or(u32::MAX);
                view.band(
                    format!("{}_{i}", Self::BAND_ID_PREFIX),
                    BandDescriptor::from_variable(var.as_ref(), index),
                )
            })
    }

    /// Register a band after the ones already present.
    #[must_use]
    pub fn band(mut self, id: impl Into<String>, band: BandDescriptor) -> Self {
        self.coverage_bands.push((id.into(), band));
        self
    }

    /// Iterate the bands in registration order.
    pub fn bands(&self) -> impl Iterator<Item = &BandDescriptor> {
        self.coverage_bands.iter().map(|(_, b)| b)
    }
}

/// One output band of a coverage view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandDescriptor {
    /// Output band name.
    pub definition: String,
    /// Zero-based position. Callers assign it; the serializer does not.
    pub index: u32,
    /// Source bands feeding this band.
    pub input_coverage_bands: Vec<InputCoverageBand>,
    /// e.g. `BAND_SELECT`.
    pub composition_type: Option<String>,
}

impl BandDescriptor {
    /// A band with no input coverage bands yet.
    pub fn new(definition: impl Into<String>, index: u32) -> Self {
        Self {
            definition: definition.into(),
            index,
            input_coverage_bands: Vec::new(),
            composition_type: None,
        }
    }

    /// A band reading the NetCDF variable of the same name.
    #[must_use]
    pub fn from_variable(variable: &str, index: u32) -> Self {
        Self::new(variable, index).input(variable)
    }

    /// Add an input coverage band.
    #[must_use]
    pub fn input(mut self, coverage_name: impl Into<String>) -> Self {
        self.input_coverage_bands.push(InputCoverageBand {
            coverage_name: coverage_name.into(),
        });
        self
    }

    /// Set the composition type.
    #[must_use]
    pub fn composition_type(mut self, composition_type: impl Into<String>) -> Self {
        self.composition_type = Some(composition_type.into());
        self
    }
}

/// A source band of a coverage view band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputCoverageBand {
    /// Name of the source coverage (band).
    pub coverage_name: String,
}

/// A `<coverageDimension>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDescriptor {
    /// Dimension name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// `(min, max)`, conventionally `("-inf", "inf")`.
    pub range: (String, String),
    /// Sample type of the dimension.
    #[serde(rename = "type")]
    pub dimension_type: SampleType,
}

impl DimensionDescriptor {
    /// Description GeoServer reports for an unbounded sample dimension.
    pub const UNBOUNDED_DESCRIPTION: &'static str = "GridSampleDimension[-Infinity,Infinity]";

    /// Create a dimension.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        range: (impl Into<String>, impl Into<String>),
        dimension_type: SampleType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            range: (range.0.into(), range.1.into()),
            dimension_type,
        }
    }

    /// A dimension with an infinite value range.
    pub fn unbounded(name: impl Into<String>, dimension_type: SampleType) -> Self {
        Self::new(
            name,
            Self::UNBOUNDED_DESCRIPTION,
            ("-inf", "inf"),
            dimension_type,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_qualify_store_name_with_workspace() {
        let store = StoreReference::coverage_store("my_test_2", "nmefc_2016072112_opdr");
        assert_eq!(store.classname.as_deref(), Some("coverageStore"));
        assert_eq!(store.name, "my_test_2:nmefc_2016072112_opdr");
    }

    #[test]
    fn test_should_keep_band_registration_order() {
        let view = CoverageView::new("wind")
            .band("b", BandDescriptor::from_variable("y_wind_10m", 1))
            .band("a", BandDescriptor::from_variable("x_wind_10m", 0));
        let defs: Vec<_> = view.bands().map(|b| b.definition.as_str()).collect();
        assert_eq!(defs, ["y_wind_10m", "x_wind_10m"]);
    }

    #[test]
    fn test_should_always_lower_dimensions_field() {
        let doc = CoverageDescriptor::builder().name("c").build().to_document();
        assert!(
            doc.fields()
                .iter()
                .any(|f| matches!(f, CoverageField::Dimensions(d) if d.is_empty()))
        );
    }

    #[test]
    fn test_should_lower_fields_in_document_order() {
        let doc = CoverageDescriptor::builder()
            .name("c")
            .native_coverage_name("c")
            .enabled(true)
            .namespace(Namespace::new("ws", "ws"))
            .store(StoreReference::coverage_store("ws", "s"))
            .build()
            .to_document();
        let names: Vec<_> = doc.fields().iter().map(CoverageField::element_name).collect();
        assert_eq!(
            names,
            [
                "name",
                "namespace",
                "enabled",
                "store",
                "dimensions",
                "nativeCoverageName"
            ]
        );
    }

    #[test]
    fn test_should_recognize_coverage_view_key_case_insensitively() {
        let mut entry = MetadataEntry::coverage_view(CoverageView::new("v"));
        entry.key = "coverage_view".to_owned();
        assert!(entry.is_coverage_view_key());
        assert!(!MetadataEntry::dir_name("d").is_coverage_view_key());
    }

    #[test]
    fn test_should_build_unbounded_dimension() {
        let dim = DimensionDescriptor::unbounded("x_wind_10m", SampleType::Real32Bits);
        assert_eq!(dim.range, ("-inf".to_owned(), "inf".to_owned()));
        assert_eq!(dim.description, "GridSampleDimension[-Infinity,Infinity]");
    }
}
