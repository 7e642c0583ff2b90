//! Typed descriptors for GeoServer coverages and coverage views.
//!
//! This crate models the payloads that the GeoServer REST configuration API
//! accepts for raster publishing: a [`CoverageDescriptor`] with its
//! namespace, store reference, metadata entries (including an embedded
//! [`CoverageView`] with ordered bands) and sample dimensions, plus the
//! smaller store, layer-style and workspace bodies.
//!
//! Two entry points exist for building a coverage:
//!
//! - [`CoverageDescriptor::builder`] for strongly-typed construction
//! - [`CoverageDocument::from_value`] for a loosely-cased nested JSON mapping,
//!   where field names are matched case-insensitively against a closed set and
//!   anything else is kept as [`CoverageField::Unknown`]
//!
//! Both produce a [`CoverageDocument`], the ordered field list the XML layer
//! dispatches on.

pub mod coverage;
pub mod error;
pub mod field;
pub mod mapping;
pub mod resource;
pub mod types;

pub use coverage::{
    BandDescriptor, COVERAGE_STORE_CLASS, CoverageDescriptor, CoverageView, DimensionDescriptor,
    InputCoverageBand, MetadataEntry, MetadataValue, Namespace, StoreReference,
};
pub use error::SchemaError;
pub use field::{CoverageDocument, CoverageField, FieldKind};
pub use resource::{LayerStyle, StoreDescriptor, WorkspaceDescriptor};
pub use types::{EnvelopeCompositionType, SampleType};
