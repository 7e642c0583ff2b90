//! Building a [`CoverageDocument`] from a loosely-cased nested mapping.
//!
//! Keys are matched case-insensitively. Entry order of the source object is
//! kept (`serde_json` is built with `preserve_order`), so bands and fields come
//! out in the order the caller wrote them.

use serde_json::{Map, Value};

use crate::coverage::{
    BandDescriptor, CoverageView, DEFAULT_ENTRY_NAME, DimensionDescriptor, InputCoverageBand,
    MetadataEntry, MetadataValue, Namespace, StoreReference,
};
use crate::error::SchemaError;
use crate::field::{CoverageDocument, CoverageField, FieldKind};
use crate::types::{EnvelopeCompositionType, SampleType};

impl CoverageDocument {
    /// Parse a nested mapping into an ordered field list.
    ///
    /// Unrecognized top-level keys are kept as [`CoverageField::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] naming the offending path when a recognized
    /// field has the wrong shape or a required key is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use gscoverage_model::CoverageDocument;
    ///
    /// let doc = CoverageDocument::from_value(&serde_json::json!({
    ///     "Name": "ceshi_coverage_01",
    ///     "nativename": "ceshi_coverage_01",
    /// }))
    /// .unwrap();
    /// assert_eq!(doc.name(), Some("ceshi_coverage_01"));
    /// ```
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let object = value
            .as_object()
            .ok_or_else(|| SchemaError::new("$", "coverage descriptor must be a mapping"))?;

        let mut fields = Vec::with_capacity(object.len());
        for (key, v) in object {
            let field = match FieldKind::from_key(key) {
                Some(kind) => parse_field(kind, v)?,
                None => CoverageField::Unknown {
                    name: key.clone(),
                    value: v.clone(),
                },
            };
            fields.push(field);
        }
        Ok(Self::new(fields))
    }

    /// Parse a JSON document; see [`CoverageDocument::from_value`].
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the text is not JSON or does not describe a
    /// coverage.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| SchemaError::new("$", e.to_string()))?;
        Self::from_value(&value)
    }
}

fn parse_field(kind: FieldKind, value: &Value) -> Result<CoverageField, SchemaError> {
    let path = kind.as_str();
    Ok(match kind {
        FieldKind::Name => CoverageField::Name(scalar(value, path)?),
        FieldKind::NativeName => CoverageField::NativeName(scalar(value, path)?),
        FieldKind::Title => CoverageField::Title(scalar(value, path)?),
        FieldKind::Description => CoverageField::Description(scalar(value, path)?),
        FieldKind::NativeCoverageName => CoverageField::NativeCoverageName(scalar(value, path)?),
        FieldKind::Srs => CoverageField::Srs(scalar(value, path)?),
        FieldKind::ProjectionPolicy => CoverageField::ProjectionPolicy(scalar(value, path)?),
        FieldKind::Enabled => CoverageField::Enabled(boolean(value, path)?),
        FieldKind::NativeFormat => CoverageField::NativeFormat(scalar(value, path)?),
        FieldKind::DefaultInterpolationMethod => {
            CoverageField::DefaultInterpolationMethod(scalar(value, path)?)
        }
        FieldKind::Keywords => CoverageField::Keywords(string_list(value, path)?),
        FieldKind::RequestSrs => CoverageField::RequestSrs(string_list(value, path)?),
        FieldKind::ResponseSrs => CoverageField::ResponseSrs(string_list(value, path)?),
        FieldKind::Namespace => CoverageField::Namespace(namespace(value, path)?),
        FieldKind::Store => CoverageField::Store(store(value, path)?),
        FieldKind::Metadata => CoverageField::Metadata(metadata(value, path)?),
        FieldKind::Dimensions => CoverageField::Dimensions(dimensions(value, path)?),
    })
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// Case-insensitive key lookup.
fn get_ci<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::new(path, "expected a mapping"))
}

/// Render a scalar as text. `null` becomes the empty string.
fn scalar(value: &Value, path: &str) -> Result<String, SchemaError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(SchemaError::new(path, "expected a scalar")),
    }
}

fn optional_scalar(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, SchemaError> {
    get_ci(object, key)
        .map(|v| scalar(v, &format!("{path}.{key}")))
        .transpose()
}

fn required_scalar(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<String, SchemaError> {
    let field_path = format!("{path}.{key}");
    match get_ci(object, key) {
        None | Some(Value::Null) => Err(SchemaError::missing(field_path)),
        Some(v) => scalar(v, &field_path),
    }
}

fn boolean(value: &Value, path: &str) -> Result<bool, SchemaError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "1" || s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false") => {
            Ok(false)
        }
        _ => Err(SchemaError::new(path, "expected a boolean")),
    }
}

fn index(value: &Value, path: &str) -> Result<u32, SchemaError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| SchemaError::new(path, "expected a non-negative integer"))
}

/// A list of strings given as a list, a single string, or a mapping whose
/// values are the strings.
fn string_list(value: &Value, path: &str) -> Result<Vec<String>, SchemaError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| scalar(v, &format!("{path}[{i}]")))
            .collect(),
        Value::Object(object) => object
            .iter()
            .map(|(k, v)| scalar(v, &format!("{path}.{k}")))
            .collect(),
        other => Ok(vec![scalar(other, path)?]),
    }
}

// ---------------------------------------------------------------------------
// Structured fields
// ---------------------------------------------------------------------------

fn namespace(value: &Value, path: &str) -> Result<Namespace, SchemaError> {
    let object = as_object(value, path)?;
    Ok(Namespace {
        name: optional_scalar(object, "name", path)?.unwrap_or_default(),
        atom: optional_scalar(object, "atom", path)?.unwrap_or_default(),
    })
}

fn store(value: &Value, path: &str) -> Result<StoreReference, SchemaError> {
    match value {
        Value::Null => Ok(StoreReference::unclassified("")),
        Value::String(s) => Ok(StoreReference::unclassified(s.clone())),
        other => {
            let object = as_object(other, path)?;
            Ok(StoreReference {
                classname: optional_scalar(object, "classname", path)?.filter(|c| !c.is_empty()),
                name: optional_scalar(object, "name", path)?.unwrap_or_default(),
            })
        }
    }
}

fn metadata(value: &Value, path: &str) -> Result<Vec<MetadataEntry>, SchemaError> {
    let items = value
        .as_array()
        .ok_or_else(|| SchemaError::new(path, "expected a list of entries"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| metadata_entry(item, &format!("{path}[{i}]")))
        .collect()
}

fn metadata_entry(value: &Value, path: &str) -> Result<MetadataEntry, SchemaError> {
    let object = as_object(value, path)?;
    let key = required_scalar(object, "key", path)?;
    if key.is_empty() {
        return Err(SchemaError::new(format!("{path}.key"), "must be non-empty"));
    }

    let name = optional_scalar(object, "name", path)?
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_ENTRY_NAME.to_owned());
    let tag = optional_scalar(object, "tag", path)?.unwrap_or_default();

    let val_path = format!("{path}.val");
    let raw = get_ci(object, "val").unwrap_or(&Value::Null);
    let val = if key.eq_ignore_ascii_case(crate::coverage::COVERAGE_VIEW_KEY) {
        MetadataValue::CoverageView(coverage_view(raw, &val_path)?)
    } else {
        MetadataValue::Text(scalar(raw, &val_path)?)
    };

    Ok(MetadataEntry {
        key,
        name,
        tag,
        val,
    })
}

fn coverage_view(value: &Value, path: &str) -> Result<CoverageView, SchemaError> {
    let mut object = as_object(value, path)?;
    let mut path = path.to_owned();
    // Accept `{"coverageView": {...}}` as well as the bare view. Siblings of
    // the wrapper are ignored.
    if let Some(inner) = get_ci(object, "coverageView") {
        path = format!("{path}.coverageView");
        object = as_object(inner, &path)?;
    }
    let path = path.as_str();

    let mut view = CoverageView::new(optional_scalar(object, "name", path)?.unwrap_or_default());
    if let Some(t) = optional_scalar(object, "envelopeCompositionType", path)? {
        view.envelope_composition_type = EnvelopeCompositionType::from_name(&t).ok_or_else(|| {
            SchemaError::new(
                format!("{path}.envelopeCompositionType"),
                format!("unknown envelope composition type `{t}`"),
            )
        })?;
    }
    if let Some(r) = optional_scalar(object, "selectedResolution", path)? {
        view.selected_resolution = r;
    }
    if let Some(raw) = get_ci(object, "selectedResolutionIndex") {
        let idx_path = format!("{path}.selectedResolutionIndex");
        let text = scalar(raw, &idx_path)?;
        view.selected_resolution_index = text
            .trim()
            .parse::<i32>()
            .map_err(|_| SchemaError::new(idx_path, "expected an integer"))?;
    }

    let bands_path = format!("{path}.coverageBands");
    match get_ci(object, "coverageBands") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                let band = band(item, &format!("{bands_path}[{i}]"))?;
                view.coverage_bands
                    .push((format!("{}_{i}", CoverageView::BAND_ID_PREFIX), band));
            }
        }
        Some(Value::Object(bands)) => {
            for (id, item) in bands {
                let band = band(item, &format!("{bands_path}.{id}"))?;
                view.coverage_bands.push((id.clone(), band));
            }
        }
        Some(_) => {
            return Err(SchemaError::new(bands_path, "expected a mapping of bands"));
        }
    }

    Ok(view)
}

fn band(value: &Value, path: &str) -> Result<BandDescriptor, SchemaError> {
    let object = as_object(value, path)?;
    let definition = required_scalar(object, "definition", path)?;
    let index_path = format!("{path}.index");
    let index = match get_ci(object, "index") {
        None | Some(Value::Null) => return Err(SchemaError::missing(index_path)),
        Some(v) => index(v, &index_path)?,
    };

    let mut band = BandDescriptor::new(definition, index);
    if let Some(inputs) = get_ci(object, "inputCoverageBands") {
        band.input_coverage_bands = input_coverage_bands(inputs, &format!("{path}.inputCoverageBands"))?;
    }
    band.composition_type = optional_scalar(object, "compositionType", path)?;
    Ok(band)
}

/// `{"inputCoverageBand": {...}}`, `{"inputCoverageBand": [...]}` or a bare list.
fn input_coverage_bands(value: &Value, path: &str) -> Result<Vec<InputCoverageBand>, SchemaError> {
    let single = |v: &Value, p: &str| -> Result<InputCoverageBand, SchemaError> {
        let object = as_object(v, p)?;
        Ok(InputCoverageBand {
            coverage_name: optional_scalar(object, "coverageName", p)?.unwrap_or_default(),
        })
    };

    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| single(v, &format!("{path}[{i}]")))
            .collect(),
        other => {
            let object = as_object(other, path)?;
            let inner_path = format!("{path}.inputCoverageBand");
            match get_ci(object, "inputCoverageBand") {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(Value::Array(items)) => items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| single(v, &format!("{inner_path}[{i}]")))
                    .collect(),
                Some(v) => Ok(vec![single(v, &inner_path)?]),
            }
        }
    }
}

/// Dimensions as a list, or as a mapping of `coverageDimension_*` entries.
fn dimensions(value: &Value, path: &str) -> Result<Vec<DimensionDescriptor>, SchemaError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| dimension(v, &format!("{path}[{i}]")))
            .collect(),
        Value::Object(object) => object
            .iter()
            .map(|(k, v)| dimension(v, &format!("{path}.{k}")))
            .collect(),
        _ => Err(SchemaError::new(path, "expected a list of dimensions")),
    }
}

fn dimension(value: &Value, path: &str) -> Result<DimensionDescriptor, SchemaError> {
    let object = as_object(value, path)?;
    let name = required_scalar(object, "name", path)?;
    let description = optional_scalar(object, "description", path)?.unwrap_or_default();

    let range_path = format!("{path}.range");
    let range = match get_ci(object, "range") {
        None | Some(Value::Null) => ("-inf".to_owned(), "inf".to_owned()),
        Some(Value::Array(bounds)) if bounds.len() == 2 => (
            scalar(&bounds[0], &format!("{range_path}[0]"))?,
            scalar(&bounds[1], &format!("{range_path}[1]"))?,
        ),
        Some(Value::Object(bounds)) => (
            optional_scalar(bounds, "min", &range_path)?.unwrap_or_else(|| "-inf".to_owned()),
            optional_scalar(bounds, "max", &range_path)?.unwrap_or_else(|| "inf".to_owned()),
        ),
        Some(_) => {
            return Err(SchemaError::new(range_path, "expected a (min, max) pair"));
        }
    };

    // `type` is the flat form; `dimensionType: {name}` mirrors the XML.
    let dimension_type = match (get_ci(object, "type"), get_ci(object, "dimensionType")) {
        (Some(t), _) => SampleType::from(scalar(t, &format!("{path}.type"))?.as_str()),
        (None, Some(Value::Object(dt))) => SampleType::from(
            required_scalar(dt, "name", &format!("{path}.dimensionType"))?.as_str(),
        ),
        (None, Some(t)) => SampleType::from(scalar(t, &format!("{path}.dimensionType"))?.as_str()),
        (None, None) => SampleType::default(),
    };

    Ok(DimensionDescriptor {
        name,
        description,
        range,
        dimension_type,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

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

    #[test]
    fn test_should_parse_end_to_end_scenario() {
        let doc = CoverageDocument::from_value(&scenario()).expect("valid descriptor");
        assert_eq!(doc.name(), Some("ceshi_coverage_01"));
        assert_eq!(doc.fields().len(), 4);
        match doc.find(FieldKind::Store) {
            Some(CoverageField::Store(store)) => {
                assert_eq!(store.classname.as_deref(), Some("coverageStore"));
                assert_eq!(store.name, "my_test_2:nmefc_2016072112_opdr");
            }
            other => panic!("unexpected store field: {other:?}"),
        }
        match doc.find(FieldKind::Dimensions) {
            Some(CoverageField::Dimensions(dims)) => {
                assert_eq!(dims.len(), 1);
                assert_eq!(dims[0].dimension_type, SampleType::Real32Bits);
            }
            other => panic!("unexpected dimensions field: {other:?}"),
        }
    }

    #[test]
    fn test_should_match_field_names_case_insensitively() {
        let doc = CoverageDocument::from_value(&json!({
            "NAME": "a",
            "nativecoveragename": "b",
            "requestsrs": ["EPSG:4326"],
        }))
        .expect("valid descriptor");
        let names: Vec<_> = doc.fields().iter().map(CoverageField::element_name).collect();
        assert_eq!(names, ["name", "nativeCoverageName", "requestSRS"]);
    }

    #[test]
    fn test_should_keep_unrecognized_fields_as_unknown() {
        let doc = CoverageDocument::from_value(&json!({"name": "a", "tilte": "typo"}))
            .expect("valid descriptor");
        assert_eq!(doc.unknown_fields().collect::<Vec<_>>(), ["tilte"]);
    }

    #[test]
    fn test_should_name_path_of_metadata_entry_without_key() {
        let err = CoverageDocument::from_value(&json!({
            "name": "a",
            "metadata": [
                {"key": "cachingEnabled", "val": "false"},
                {"name": "entry", "val": "x"}
            ]
        }))
        .unwrap_err();
        assert_eq!(err.path, "metadata[1].key");
    }

    #[test]
    fn test_should_parse_wrapped_coverage_view_with_ordered_bands() {
        let doc = CoverageDocument::from_value(&json!({
            "name": "a",
            "metadata": [{
                "key": "COVERAGE_VIEW",
                "name": "entry",
                "tag": "",
                "val": {"coverageview": {
                    "name": "wind",
                    "envelopeCompositionType": "INTERSECTION",
                    "selectedResolution": "",
                    "selectedResolutionIndex": "-1",
                    "coveragebands": {
                        "coverageband_1": {
                            "definition": "x_wind_10m",
                            "index": 0,
                            "inputcoveragebands": {"inputcoverageband": {"coverageName": "x_wind_10m"}}
                        },
                        "coverageband_2": {
                            "definition": "y_wind_10m",
                            "index": 1,
                            "inputcoveragebands": {"inputcoverageband": {"coverageName": "y_wind_10m"}}
                        }
                    }
                }}
            }]
        }))
        .expect("valid descriptor");

        let Some(CoverageField::Metadata(entries)) = doc.find(FieldKind::Metadata) else {
            panic!("metadata missing");
        };
        let MetadataValue::CoverageView(view) = &entries[0].val else {
            panic!("expected a coverage view");
        };
        assert_eq!(view.name, "wind");
        assert_eq!(view.selected_resolution, "");
        assert_eq!(view.selected_resolution_index, -1);
        let defs: Vec<_> = view.bands().map(|b| b.definition.as_str()).collect();
        assert_eq!(defs, ["x_wind_10m", "y_wind_10m"]);
        assert_eq!(
            view.coverage_bands[1].1.input_coverage_bands[0].coverage_name,
            "y_wind_10m"
        );
    }

    #[test]
    fn test_should_unwrap_coverage_view_next_to_sibling_keys() {
        let doc = CoverageDocument::from_value(&json!({
            "name": "a",
            "metadata": [{
                "key": "COVERAGE_VIEW",
                "val": {
                    "coverageView": {
                        "name": "wind",
                        "coverageBands": {"b0": {"definition": "x", "index": 0}}
                    },
                    "comment": "x"
                }
            }]
        }))
        .expect("valid descriptor");

        let Some(CoverageField::Metadata(entries)) = doc.find(FieldKind::Metadata) else {
            panic!("metadata missing");
        };
        let MetadataValue::CoverageView(view) = &entries[0].val else {
            panic!("expected a coverage view");
        };
        assert_eq!(view.name, "wind");
        assert_eq!(view.coverage_bands.len(), 1);
        assert_eq!(view.coverage_bands[0].0, "b0");
    }

    #[test]
    fn test_should_reject_unknown_envelope_composition_type() {
        let err = CoverageDocument::from_value(&json!({
            "name": "a",
            "metadata": [{
                "key": "COVERAGE_VIEW",
                "val": {"coverageView": {"name": "wind", "envelopeCompositionType": "UNOIN"}}
            }]
        }))
        .unwrap_err();
        assert_eq!(
            err.path,
            "metadata[0].val.coverageView.envelopeCompositionType"
        );
    }

    #[test]
    fn test_should_reject_band_without_index() {
        let err = CoverageDocument::from_value(&json!({
            "name": "a",
            "metadata": [{
                "key": "COVERAGE_VIEW",
                "val": {"coverageBands": {"b0": {"definition": "x"}}}
            }]
        }))
        .unwrap_err();
        assert_eq!(err.path, "metadata[0].val.coverageBands.b0.index");
    }

    #[test]
    fn test_should_accept_dimension_mapping_and_nested_type() {
        let doc = CoverageDocument::from_value(&json!({
            "dimensions": {
                "coverageDimension_1": {
                    "name": "x",
                    "range": {"min": "0", "max": "10"},
                    "dimensionType": {"name": "REAL_64BITS"}
                }
            }
        }))
        .expect("valid descriptor");
        let Some(CoverageField::Dimensions(dims)) = doc.find(FieldKind::Dimensions) else {
            panic!("dimensions missing");
        };
        assert_eq!(dims[0].range, ("0".to_owned(), "10".to_owned()));
        assert_eq!(dims[0].dimension_type, SampleType::Real64Bits);
    }

    #[test]
    fn test_should_treat_blank_store_as_unclassified() {
        let doc = CoverageDocument::from_value(&json!({"store": ""})).expect("valid descriptor");
        assert_eq!(
            doc.find(FieldKind::Store),
            Some(&CoverageField::Store(StoreReference::unclassified("")))
        );
    }

    #[test]
    fn test_should_reject_non_mapping_root() {
        let err = CoverageDocument::from_json_str("[1, 2]").unwrap_err();
        assert_eq!(err.path, "$");
    }
}
