//! GeoServer XML serialization/deserialization.
//!
//! This crate provides the XML layer for the GeoServer REST configuration API,
//! converting `gscoverage-model` descriptors into request bodies and parsing
//! the catalog listings GeoServer returns.
//!
//! # Key components
//!
//! - [`serialize_coverage`] and [`coverage_to_xml`] for `<coverage>` documents,
//!   including embedded coverage views
//! - [`GsSerialize`] trait and [`to_xml`] for the smaller store, layer-style
//!   and workspace bodies
//! - [`GsDeserialize`] trait and [`from_xml`] for workspace/store/style/layer
//!   listings and the `about/version` resource
//!
//! # GeoServer XML conventions
//!
//! - No namespace on configuration bodies
//! - Element names are case-sensitive and use GeoServer's exact casing
//!   (`coverageBands`, `inputCoverageBands`, `requestSRS`, ...)
//! - Booleans: lowercase `true`/`false`
//! - String lists are wrapped as `<string>` children

pub mod coverage;
pub mod deserialize;
pub mod error;
pub mod serialize;

pub use coverage::{
    COVERAGE_ELEMENT, SerializeOptions, UnknownFieldPolicy, coverage_to_string, coverage_to_xml,
    serialize_coverage, validate,
};
pub use deserialize::{
    AboutInfo, CatalogEntry, CatalogListing, GsDeserialize, LayerInfo, ResourceRef, from_xml,
};
pub use error::XmlError;
pub use serialize::{GsSerialize, to_xml, to_xml_document};
