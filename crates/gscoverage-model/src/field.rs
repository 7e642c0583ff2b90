//! Top-level coverage fields as a closed tagged union.
//!
//! GeoServer grows its coverage schema by adding elements over time, so a
//! caller-supplied mapping may contain names this crate does not know. Those
//! are kept as [`CoverageField::Unknown`] rather than discarded here; whether
//! they are dropped or rejected is decided by the serializer's policy.

use crate::coverage::{DimensionDescriptor, MetadataEntry, Namespace, StoreReference};

/// A recognized top-level field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `<name>`
    Name,
    /// `<nativeName>`
    NativeName,
    /// `<title>`
    Title,
    /// `<description>`
    Description,
    /// `<nativeCoverageName>`
    NativeCoverageName,
    /// `<srs>`
    Srs,
    /// `<projectionPolicy>`
    ProjectionPolicy,
    /// `<enabled>`
    Enabled,
    /// `<nativeFormat>`
    NativeFormat,
    /// `<defaultInterpolationMethod>`
    DefaultInterpolationMethod,
    /// `<keywords>`
    Keywords,
    /// `<requestSRS>`
    RequestSrs,
    /// `<responseSRS>`
    ResponseSrs,
    /// `<namespace>`
    Namespace,
    /// `<store>`
    Store,
    /// `<metadata>`
    Metadata,
    /// `<dimensions>`
    Dimensions,
}

impl FieldKind {
    /// Every recognized field.
    pub const ALL: [Self; 17] = [
        Self::Name,
        Self::NativeName,
        Self::Title,
        Self::Description,
        Self::NativeCoverageName,
        Self::Srs,
        Self::ProjectionPolicy,
        Self::Enabled,
        Self::NativeFormat,
        Self::DefaultInterpolationMethod,
        Self::Keywords,
        Self::RequestSrs,
        Self::ResponseSrs,
        Self::Namespace,
        Self::Store,
        Self::Metadata,
        Self::Dimensions,
    ];

    /// Canonical element name, with the exact casing GeoServer expects.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::NativeName => "nativeName",
            Self::Title => "title",
            Self::Description => "description",
            Self::NativeCoverageName => "nativeCoverageName",
            Self::Srs => "srs",
            Self::ProjectionPolicy => "projectionPolicy",
            Self::Enabled => "enabled",
            Self::NativeFormat => "nativeFormat",
            Self::DefaultInterpolationMethod => "defaultInterpolationMethod",
            Self::Keywords => "keywords",
            Self::RequestSrs => "requestSRS",
            Self::ResponseSrs => "responseSRS",
            Self::Namespace => "namespace",
            Self::Store => "store",
            Self::Metadata => "metadata",
            Self::Dimensions => "dimensions",
        }
    }

    /// Match a caller-supplied key case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use gscoverage_model::FieldKind;
    ///
    /// assert_eq!(FieldKind::from_key("NATIVENAME"), Some(FieldKind::NativeName));
    /// assert_eq!(FieldKind::from_key("nmae"), None);
    /// ```
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(key))
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One top-level child of `<coverage>`.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageField {
    /// `<name>`
    Name(String),
    /// `<nativeName>`
    NativeName(String),
    /// `<title>`
    Title(String),
    /// `<description>`
    Description(String),
    /// `<nativeCoverageName>`
    NativeCoverageName(String),
    /// `<srs>`
    Srs(String),
    /// `<projectionPolicy>`
    ProjectionPolicy(String),
    /// `<enabled>`
    Enabled(bool),
    /// `<nativeFormat>`
    NativeFormat(String),
    /// `<defaultInterpolationMethod>`
    DefaultInterpolationMethod(String),
    /// `<keywords>`
    Keywords(Vec<String>),
    /// `<requestSRS>`
    RequestSrs(Vec<String>),
    /// `<responseSRS>`
    ResponseSrs(Vec<String>),
    /// `<namespace>`
    Namespace(Namespace),
    /// `<store>`
    Store(StoreReference),
    /// `<metadata>`
    Metadata(Vec<MetadataEntry>),
    /// `<dimensions>`
    Dimensions(Vec<DimensionDescriptor>),
    /// A field outside the recognized set, kept with its raw value.
    Unknown {
        name: String,
        value: serde_json::Value,
    },
}

impl CoverageField {
    /// The recognized kind, or `None` for [`CoverageField::Unknown`].
    #[must_use]
    pub fn kind(&self) -> Option<FieldKind> {
        Some(match self {
            Self::Name(_) => FieldKind::Name,
            Self::NativeName(_) => FieldKind::NativeName,
            Self::Title(_) => FieldKind::Title,
            Self::Description(_) => FieldKind::Description,
            Self::NativeCoverageName(_) => FieldKind::NativeCoverageName,
            Self::Srs(_) => FieldKind::Srs,
            Self::ProjectionPolicy(_) => FieldKind::ProjectionPolicy,
            Self::Enabled(_) => FieldKind::Enabled,
            Self::NativeFormat(_) => FieldKind::NativeFormat,
            Self::DefaultInterpolationMethod(_) => FieldKind::DefaultInterpolationMethod,
            Self::Keywords(_) => FieldKind::Keywords,
            Self::RequestSrs(_) => FieldKind::RequestSrs,
            Self::ResponseSrs(_) => FieldKind::ResponseSrs,
            Self::Namespace(_) => FieldKind::Namespace,
            Self::Store(_) => FieldKind::Store,
            Self::Metadata(_) => FieldKind::Metadata,
            Self::Dimensions(_) => FieldKind::Dimensions,
            Self::Unknown { .. } => return None,
        })
    }

    /// Element name this field serializes to; the raw name for unknown fields.
    #[must_use]
    pub fn element_name(&self) -> &str {
        match self {
            Self::Unknown { name, .. } => name.as_str(),
            other => other.kind().map_or("", |k| k.as_str()),
        }
    }
}

/// An ordered list of coverage fields, in the order they will be emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageDocument {
    fields: Vec<CoverageField>,
}

impl CoverageDocument {
    /// Wrap an ordered field list.
    #[must_use]
    pub fn new(fields: Vec<CoverageField>) -> Self {
        Self { fields }
    }

    /// The fields in emission order.
    #[must_use]
    pub fn fields(&self) -> &[CoverageField] {
        &self.fields
    }

    /// First field of the given kind.
    #[must_use]
    pub fn find(&self, kind: FieldKind) -> Option<&CoverageField> {
        self.fields.iter().find(|f| f.kind() == Some(kind))
    }

    /// The `name` value, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self.find(FieldKind::Name) {
            Some(CoverageField::Name(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Fields outside the recognized set.
    pub fn unknown_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|f| match f {
            CoverageField::Unknown { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

impl From<Vec<CoverageField>> for CoverageDocument {
    fn from(fields: Vec<CoverageField>) -> Self {
        Self::new(fields)
    }
}
