//! GeoServer XML serialization: converting descriptor types to request bodies.
//!
//! Every [`GsSerialize`] implementation writes its own element, so nested
//! types compose by calling each other inside `write_inner_content`.

use std::io::{self, Write};

use gscoverage_model::{
    BandDescriptor, CoverageView, DimensionDescriptor, InputCoverageBand, LayerStyle,
    MetadataEntry, MetadataValue, Namespace, StoreDescriptor, StoreReference,
    WorkspaceDescriptor,
};
use gscoverage_model::coverage::DEFAULT_ENTRY_NAME;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

use crate::error::XmlError;

/// Trait for serializing GeoServer types to XML.
///
/// Uses `io::Result` because `quick_xml::Writer` closures require `io::Result<()>`.
pub trait GsSerialize {
    /// Serialize this value, including its own element, into the writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as a bare XML fragment (no declaration).
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml<T: GsSerialize>(value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);
    value.serialize_xml(&mut writer)?;
    Ok(buf)
}

/// Serialize a value as a complete document with an XML declaration.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml_document<T: GsSerialize>(value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    value.serialize_xml(&mut writer)?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Helper functions for writing common XML patterns
// ---------------------------------------------------------------------------

/// Write a simple `<tag>text</tag>` element.
pub(crate) fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Write `<tag>true</tag>` or `<tag>false</tag>`.
pub(crate) fn write_bool_element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: bool,
) -> io::Result<()> {
    write_text_element(writer, tag, if value { "true" } else { "false" })
}

/// Write `<tag><string>a</string><string>b</string></tag>`, skipping blanks.
pub(crate) fn write_string_list<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    values: &[String],
) -> io::Result<()> {
    writer.create_element(tag).write_inner_content(|w| {
        for value in values.iter().filter(|v| !v.is_empty()) {
            write_text_element(w, "string", value)?;
        }
        Ok(())
    })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Coverage sub-builders
// ---------------------------------------------------------------------------

impl GsSerialize for Namespace {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("namespace").write_inner_content(|w| {
            write_text_element(w, "name", &self.name)?;
            write_text_element(w, "atom", &self.atom)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl GsSerialize for StoreReference {
    /// Writes nothing when no class is set.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let Some(class) = self.classname.as_deref().filter(|c| !c.is_empty()) else {
            return Ok(());
        };
        writer
            .create_element("store")
            .with_attribute(("class", class))
            .write_inner_content(|w| write_text_element(w, "name", &self.name))?;
        Ok(())
    }
}

impl GsSerialize for MetadataEntry {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let element = if self.name.is_empty() {
            DEFAULT_ENTRY_NAME
        } else {
            self.name.as_str()
        };
        let entry = writer
            .create_element(element)
            .with_attribute(("key", self.key.as_str()));
        match &self.val {
            MetadataValue::CoverageView(view) => {
                entry.write_inner_content(|w| view.serialize_xml(w))?;
            }
            MetadataValue::Text(text) => {
                entry.write_text_content(BytesText::new(text))?;
            }
        }
        Ok(())
    }
}

impl GsSerialize for CoverageView {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("coverageView").write_inner_content(|w| {
            w.create_element("coverageBands").write_inner_content(|w| {
                for band in self.bands() {
                    band.serialize_xml(w)?;
                }
                Ok(())
            })?;
            write_text_element(w, "name", &self.name)?;
            write_text_element(
                w,
                "envelopeCompositionType",
                self.envelope_composition_type.as_str(),
            )?;
            write_text_element(w, "selectedResolution", &self.selected_resolution)?;
            write_text_element(
                w,
                "selectedResolutionIndex",
                &self.selected_resolution_index.to_string(),
            )?;
            Ok(())
        })?;
        Ok(())
    }
}

impl GsSerialize for BandDescriptor {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("coverageBand").write_inner_content(|w| {
            w.create_element("inputCoverageBands")
                .write_inner_content(|w| {
                    for input in &self.input_coverage_bands {
                        input.serialize_xml(w)?;
                    }
                    Ok(())
                })?;
            write_text_element(w, "definition", &self.definition)?;
            write_text_element(w, "index", &self.index.to_string())?;
            if let Some(composition) = &self.composition_type {
                write_text_element(w, "compositionType", composition)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl GsSerialize for InputCoverageBand {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer
            .create_element("inputCoverageBand")
            .write_inner_content(|w| write_text_element(w, "coverageName", &self.coverage_name))?;
        Ok(())
    }
}

impl GsSerialize for DimensionDescriptor {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer
            .create_element("coverageDimension")
            .write_inner_content(|w| {
                write_text_element(w, "name", &self.name)?;
                write_text_element(w, "description", &self.description)?;
                w.create_element("dimensionType")
                    .write_inner_content(|w| {
                        write_text_element(w, "name", self.dimension_type.as_str())
                    })?;
                w.create_element("range").write_inner_content(|w| {
                    write_text_element(w, "min", &self.range.0)?;
                    write_text_element(w, "max", &self.range.1)?;
                    Ok(())
                })?;
                Ok(())
            })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Other REST bodies
// ---------------------------------------------------------------------------

impl GsSerialize for StoreDescriptor {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("coverageStore").write_inner_content(|w| {
            write_bool_element(w, "enabled", self.enabled)?;
            write_text_element(w, "name", &self.name)?;
            write_text_element(w, "url", &self.url)?;
            write_text_element(w, "type", &self.store_type)?;
            write_text_element(w, "workspace", &self.workspace)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl GsSerialize for LayerStyle {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("layer").write_inner_content(|w| {
            w.create_element("defaultStyle").write_inner_content(|w| {
                write_text_element(w, "name", &self.style)?;
                if let Some(ws) = &self.workspace {
                    write_text_element(w, "workspace", ws)?;
                }
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    }
}

impl GsSerialize for WorkspaceDescriptor {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("namespace").write_inner_content(|w| {
            write_text_element(w, "prefix", &self.prefix)?;
            write_text_element(w, "uri", &self.uri)?;
            Ok(())
        })?;
        Ok(())
    }
}
