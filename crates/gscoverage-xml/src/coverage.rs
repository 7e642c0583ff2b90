//! The `<coverage>` document writer.
//!
//! A [`CoverageDocument`] is validated first and then written field by field
//! in the order the fields were given. Element names use GeoServer's exact
//! casing regardless of how the caller spelled the keys.

use std::collections::HashSet;
use std::io::{self, Write};

use gscoverage_model::{
    CoverageDescriptor, CoverageDocument, CoverageField, CoverageView, FieldKind, MetadataValue,
    SchemaError,
};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, Event};
use typed_builder::TypedBuilder;

use crate::error::XmlError;
use crate::serialize::{GsSerialize, write_bool_element, write_string_list, write_text_element};

/// Root element of a coverage document.
pub const COVERAGE_ELEMENT: &str = "coverage";

/// What to do with fields outside the recognized set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    /// Drop the field and log a warning.
    #[default]
    Lenient,
    /// Reject the document. Duplicate band indices are rejected as well.
    Strict,
}

/// Options for [`coverage_to_xml`].
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct SerializeOptions {
    /// Handling of unrecognized top-level fields.
    #[builder(default)]
    pub unknown_fields: UnknownFieldPolicy,
    /// Prefix the output with `<?xml version="1.0" encoding="UTF-8"?>`.
    #[builder(default)]
    pub xml_declaration: bool,
}

impl SerializeOptions {
    /// Strict options: unknown fields and duplicate band indices are errors.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Strict,
            xml_declaration: false,
        }
    }

    fn is_strict(&self) -> bool {
        self.unknown_fields == UnknownFieldPolicy::Strict
    }
}

/// Check a document before it is written.
///
/// Always checked: a non-empty `name`, presence of `namespace` and `store`,
/// non-empty metadata keys, `COVERAGE_VIEW` entries carrying a view, and
/// unique band ids within a view. Strict options additionally reject unknown
/// fields and duplicate band indices.
///
/// # Errors
///
/// Returns a [`SchemaError`] naming the first offending field path.
pub fn validate(doc: &CoverageDocument, options: &SerializeOptions) -> Result<(), SchemaError> {
    match doc.name() {
        None => return Err(SchemaError::missing(FieldKind::Name.as_str())),
        Some("") => {
            return Err(SchemaError::new(FieldKind::Name.as_str(), "must be non-empty"));
        }
        Some(_) => {}
    }
    for required in [FieldKind::Namespace, FieldKind::Store] {
        if doc.find(required).is_none() {
            return Err(SchemaError::missing(required.as_str()));
        }
    }

    for field in doc.fields() {
        match field {
            CoverageField::Metadata(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    let path = format!("metadata[{i}]");
                    if entry.key.is_empty() {
                        return Err(SchemaError::new(format!("{path}.key"), "must be non-empty"));
                    }
                    match &entry.val {
                        MetadataValue::CoverageView(view) => {
                            validate_view(view, &format!("{path}.coverageView"), options)?;
                        }
                        MetadataValue::Text(_) if entry.is_coverage_view_key() => {
                            return Err(SchemaError::new(
                                format!("{path}.val"),
                                "COVERAGE_VIEW entry must carry a coverage view",
                            ));
                        }
                        MetadataValue::Text(_) => {}
                    }
                }
            }
            CoverageField::Unknown { name, .. } if options.is_strict() => {
                return Err(SchemaError::new(name.as_str(), "unrecognized coverage field"));
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_view(
    view: &CoverageView,
    path: &str,
    options: &SerializeOptions,
) -> Result<(), SchemaError> {
    let mut ids = HashSet::new();
    let mut indices = HashSet::new();
    for (id, band) in &view.coverage_bands {
        let band_path = format!("{path}.coverageBands.{id}");
        if !ids.insert(id.as_str()) {
            return Err(SchemaError::new(band_path, "duplicate band id"));
        }
        if options.is_strict() && !indices.insert(band.index) {
            return Err(SchemaError::new(
                format!("{band_path}.index"),
                format!("duplicate band index {}", band.index),
            ));
        }
    }
    Ok(())
}

impl GsSerialize for CoverageField {
    /// Unknown fields write nothing.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let tag = self.element_name();
        match self {
            Self::Name(text)
            | Self::NativeName(text)
            | Self::Title(text)
            | Self::Description(text)
            | Self::NativeCoverageName(text)
            | Self::Srs(text)
            | Self::ProjectionPolicy(text)
            | Self::NativeFormat(text)
            | Self::DefaultInterpolationMethod(text) => write_text_element(writer, tag, text),
            Self::Enabled(value) => write_bool_element(writer, tag, *value),
            Self::Keywords(values) | Self::RequestSrs(values) | Self::ResponseSrs(values) => {
                write_string_list(writer, tag, values)
            }
            Self::Namespace(namespace) => namespace.serialize_xml(writer),
            Self::Store(store) => store.serialize_xml(writer),
            Self::Metadata(entries) => {
                writer.create_element(tag).write_inner_content(|w| {
                    for entry in entries {
                        entry.serialize_xml(w)?;
                    }
                    Ok(())
                })?;
                Ok(())
            }
            Self::Dimensions(dimensions) => {
                writer.create_element(tag).write_inner_content(|w| {
                    for dimension in dimensions {
                        dimension.serialize_xml(w)?;
                    }
                    Ok(())
                })?;
                Ok(())
            }
            Self::Unknown { .. } => Ok(()),
        }
    }
}

/// Serialize a coverage document to XML bytes.
///
/// # Errors
///
/// Returns [`XmlError::Schema`] if validation fails, or an I/O error from the
/// writer.
pub fn coverage_to_xml(
    doc: &CoverageDocument,
    options: &SerializeOptions,
) -> Result<Vec<u8>, XmlError> {
    validate(doc, options)?;
    for name in doc.unknown_fields() {
        tracing::warn!(field = %name, "dropping unrecognized coverage field");
    }

    let mut buf = Vec::with_capacity(2048);
    let mut writer = Writer::new(&mut buf);
    if options.xml_declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    }
    writer
        .create_element(COVERAGE_ELEMENT)
        .write_inner_content(|w| {
            for field in doc.fields() {
                field.serialize_xml(w)?;
            }
            Ok(())
        })?;
    Ok(buf)
}

/// Serialize a coverage document to a `String`.
///
/// # Errors
///
/// Same as [`coverage_to_xml`].
pub fn coverage_to_string(
    doc: &CoverageDocument,
    options: &SerializeOptions,
) -> Result<String, XmlError> {
    let bytes = coverage_to_xml(doc, options)?;
    String::from_utf8(bytes).map_err(|e| XmlError::ParseError(e.to_string()))
}

/// Serialize a typed descriptor with default (lenient) options.
///
/// # Errors
///
/// Same as [`coverage_to_xml`].
pub fn serialize_coverage(descriptor: &CoverageDescriptor) -> Result<Vec<u8>, XmlError> {
    coverage_to_xml(&descriptor.to_document(), &SerializeOptions::default())
}

#[cfg(test)]
mod tests {
    use gscoverage_model::{
        BandDescriptor, DimensionDescriptor, MetadataEntry, Namespace, SampleType,
        StoreReference,
    };
    use serde_json::{Value, json};

    use super::*;

    fn scenario() -> Value {
        json!({
            "name": "ceshi_coverage_01",
            "namespace": {"name": "my_test_2", "atom": "ceshi"},
            "store": {"classname": "coverageStore", "name": "my_test_2:nmefc_2016072112_opdr"},
            "dimensions": [{
                "name": "x_wind_10m",
                "description": "GridSampleDimension[-Infinity,Infinity]",
                "range": ["-inf", "inf"],
                "type": "REAL_32BITS"
            }]
        })
    }

    fn render(value: &Value, options: &SerializeOptions) -> Result<String, XmlError> {
        let doc = CoverageDocument::from_value(value).expect("valid mapping");
        coverage_to_string(&doc, options)
    }

    fn lenient(value: &Value) -> String {
        render(value, &SerializeOptions::default()).expect("serialize")
    }

    fn wind_view() -> Value {
        json!({
            "key": "COVERAGE_VIEW",
            "val": {
                "coverageView": {
                    "coverageBands": {
                        "coverageband_0": {
                            "inputCoverageBands": {"inputCoverageBand": {"coverageName": "x_wind_10m"}},
                            "definition": "x_wind_10m",
                            "index": 0
                        },
                        "coverageband_1": {
                            "inputCoverageBands": {"inputCoverageBand": {"coverageName": "y_wind_10m"}},
                            "definition": "y_wind_10m",
                            "index": 1
                        }
                    },
                    "name": "wind",
                    "envelopeCompositionType": "INTERSECTION",
                    "selectedResolution": "BEST",
                    "selectedResolutionIndex": -1
                }
            }
        })
    }

    fn with_metadata(entries: Value) -> Value {
        let mut value = scenario();
        value["metadata"] = entries;
        value
    }

    #[test]
    fn test_should_serialize_end_to_end_scenario() {
        let xml = lenient(&scenario());
        assert_eq!(
            xml,
            "<coverage><name>ceshi_coverage_01</name>\
             <namespace><name>my_test_2</name><atom>ceshi</atom></namespace>\
             <store class=\"coverageStore\"><name>my_test_2:nmefc_2016072112_opdr</name></store>\
             <dimensions><coverageDimension><name>x_wind_10m</name>\
             <description>GridSampleDimension[-Infinity,Infinity]</description>\
             <dimensionType><name>REAL_32BITS</name></dimensionType>\
             <range><min>-inf</min><max>inf</max></range></coverageDimension></dimensions>\
             </coverage>"
        );
    }

    #[test]
    fn test_should_emit_one_view_and_one_band_per_registered_band() {
        let xml = lenient(&with_metadata(json!([
            wind_view(),
            {"key": "cachingEnabled", "val": false},
            {"key": "dirName", "val": "nmefc_wind"}
        ])));
        assert_eq!(xml.matches("<coverageView>").count(), 1);
        assert_eq!(xml.matches("<coverageBand>").count(), 2);
        assert!(xml.contains("<entry key=\"cachingEnabled\">false</entry>"));
        assert!(xml.contains("<entry key=\"dirName\">nmefc_wind</entry>"));
    }

    #[test]
    fn test_should_emit_one_view_per_coverage_view_entry() {
        let current = json!({
            "key": "COVERAGE_VIEW",
            "name": "current",
            "val": {"coverageView": {
                "name": "current",
                "coverageBands": {
                    "coverageband_0": {"definition": "u", "index": 0},
                    "coverageband_1": {"definition": "v", "index": 1},
                    "coverageband_2": {"definition": "w", "index": 2}
                }
            }}
        });
        let xml = lenient(&with_metadata(json!([wind_view(), current])));
        assert_eq!(xml.matches("<coverageView>").count(), 2);
        assert_eq!(xml.matches("<coverageBand>").count(), 5);
        assert!(xml.contains("<current key=\"COVERAGE_VIEW\"><coverageView>"));
    }

    #[test]
    fn test_should_preserve_band_registration_order() {
        let xml = lenient(&with_metadata(json!([wind_view()])));
        let x = xml.find("<definition>x_wind_10m</definition>").expect("x band");
        let y = xml.find("<definition>y_wind_10m</definition>").expect("y band");
        assert!(x < y);
    }

    #[test]
    fn test_should_omit_store_without_classname() {
        let mut value = scenario();
        value["store"] = json!({"name": "my_test_2:nmefc_2016072112_opdr"});
        let xml = lenient(&value);
        assert_eq!(xml.matches("<store").count(), 0);
    }

    #[test]
    fn test_should_serialize_identically_twice() {
        let doc = CoverageDocument::from_value(&with_metadata(json!([wind_view()])))
            .expect("valid mapping");
        let options = SerializeOptions::default();
        let first = coverage_to_xml(&doc, &options).expect("serialize");
        let second = coverage_to_xml(&doc, &options).expect("serialize");
        assert_eq!(first, second);
    }

    #[test]
    fn test_should_emit_empty_dimensions_element() {
        let mut value = scenario();
        value["dimensions"] = json!([]);
        let xml = lenient(&value);
        assert!(xml.contains("<dimensions></dimensions>"));
    }

    #[test]
    fn test_should_pass_duplicate_band_indices_through_when_lenient() {
        let mut view = wind_view();
        view["val"]["coverageView"]["coverageBands"]["coverageband_1"]["index"] = json!(0);
        let xml = lenient(&with_metadata(json!([view])));
        assert_eq!(xml.matches("<index>0</index>").count(), 2);
    }

    #[test]
    fn test_should_reject_duplicate_band_indices_when_strict() {
        let mut view = wind_view();
        view["val"]["coverageView"]["coverageBands"]["coverageband_1"]["index"] = json!(0);
        let err = render(&with_metadata(json!([view])), &SerializeOptions::strict())
            .expect_err("duplicate index");
        let schema = err.as_schema().expect("schema error");
        assert_eq!(
            schema.path,
            "metadata[0].coverageView.coverageBands.coverageband_1.index"
        );
    }

    #[test]
    fn test_should_drop_unknown_fields_when_lenient() {
        let mut value = scenario();
        value["nativeCRS"] = json!("EPSG:4326");
        let xml = lenient(&value);
        assert!(!xml.contains("nativeCRS"));
    }

    #[test]
    fn test_should_reject_unknown_fields_when_strict() {
        let mut value = scenario();
        value["nmae"] = json!("typo");
        let err = render(&value, &SerializeOptions::strict()).expect_err("unknown field");
        assert_eq!(err.as_schema().map(|e| e.path.as_str()), Some("nmae"));
    }

    #[test]
    fn test_should_match_field_names_case_insensitively() {
        let value = json!({
            "NAME": "c",
            "NameSpace": {"name": "ws", "atom": "a"},
            "Store": {"classname": "coverageStore", "name": "ws:s"},
            "requestsrs": ["EPSG:4326"],
            "ENABLED": true
        });
        let xml = lenient(&value);
        assert!(xml.contains("<requestSRS><string>EPSG:4326</string></requestSRS>"));
        assert!(xml.contains("<enabled>true</enabled>"));
        assert!(xml.starts_with("<coverage><name>c</name>"));
    }

    #[test]
    fn test_should_require_name_namespace_and_store() {
        let options = SerializeOptions::default();
        for (field, path) in [("name", "name"), ("namespace", "namespace"), ("store", "store")] {
            let mut value = scenario();
            value
                .as_object_mut()
                .expect("object")
                .remove(field);
            let err = render(&value, &options).expect_err("missing field");
            assert_eq!(err.as_schema().map(|e| e.path.as_str()), Some(path));
        }
    }

    #[test]
    fn test_should_reject_coverage_view_entry_with_scalar_value() {
        let entry = MetadataEntry::text("COVERAGE_VIEW", "oops");
        let descriptor = CoverageDescriptor::builder()
            .name("c")
            .namespace(Namespace::new("ws", "a"))
            .store(StoreReference::coverage_store("ws", "s"))
            .metadata(vec![entry])
            .build();
        let err = serialize_coverage(&descriptor).expect_err("scalar view");
        assert_eq!(
            err.as_schema().map(|e| e.path.as_str()),
            Some("metadata[0].val")
        );
    }

    #[test]
    fn test_should_reject_duplicate_band_ids() {
        let view = CoverageView::new("wind")
            .band("b", BandDescriptor::from_variable("x", 0))
            .band("b", BandDescriptor::from_variable("y", 1));
        let descriptor = CoverageDescriptor::builder()
            .name("c")
            .namespace(Namespace::new("ws", "a"))
            .store(StoreReference::coverage_store("ws", "s"))
            .metadata(vec![MetadataEntry::coverage_view(view)])
            .build();
        assert!(serialize_coverage(&descriptor).is_err());
    }

    #[test]
    fn test_should_serialize_typed_descriptor_in_canonical_order() {
        let descriptor = CoverageDescriptor::builder()
            .name("wind")
            .native_name("wind")
            .namespace(Namespace::new("my_test_2", "ceshi"))
            .enabled(true)
            .metadata(vec![
                MetadataEntry::coverage_view(CoverageView::with_bands(
                    "wind",
                    ["x_wind_10m", "y_wind_10m"],
                )),
                MetadataEntry::caching_enabled(false),
            ])
            .store(StoreReference::coverage_store("my_test_2", "nmefc"))
            .native_format("NetCDF")
            .dimensions(vec![DimensionDescriptor::unbounded(
                "x_wind_10m",
                SampleType::Real32Bits,
            )])
            .request_srs(vec!["EPSG:4326".to_owned()])
            .build();
        let xml = String::from_utf8(serialize_coverage(&descriptor).expect("serialize"))
            .expect("valid UTF-8");
        let positions: Vec<usize> = [
            "<nativeName>",
            "<namespace>",
            "<enabled>",
            "<metadata>",
            "<store ",
            "<nativeFormat>",
            "<dimensions>",
            "<requestSRS>",
        ]
        .iter()
        .map(|tag| xml.find(tag).expect("element present"))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_should_prefix_declaration_when_requested() {
        let options = SerializeOptions::builder().xml_declaration(true).build();
        let xml = render(&scenario(), &options).expect("serialize");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?><coverage>"));
    }
}
