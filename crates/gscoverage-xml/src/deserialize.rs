//! GeoServer XML deserialization: parsing REST responses into Rust types.
//!
//! Only the parts of GeoServer's catalog responses needed for discovery are
//! read. Unknown children are skipped, so newer servers with extra elements
//! still parse.

use quick_xml::Reader;
use quick_xml::events::{BytesRef, BytesStart, BytesText, Event};

use crate::error::XmlError;

/// Trait for deserializing GeoServer types from XML.
///
/// The root element has already been consumed by the caller; the
/// implementation reads child elements until the matching end tag.
pub trait GsDeserialize: Sized {
    /// Deserialize an instance from the given XML reader.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the XML is malformed or required fields are missing.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;

    /// Value for a self-closing root such as `<workspaces/>`, if one is allowed.
    fn from_empty_element() -> Option<Self> {
        None
    }
}

/// Deserialize GeoServer XML into a typed value.
///
/// # Errors
///
/// Returns `XmlError` if the XML is malformed or deserialization fails.
pub fn from_xml<T: GsDeserialize>(xml: &[u8]) -> Result<T, XmlError> {
    // Text is not trimmed per event: an entity reference splits the text
    // around it, and trimming each piece would eat the spaces next to it.
    let mut reader = Reader::from_reader(xml);

    loop {
        match reader.read_event()? {
            Event::Start(_) => return T::deserialize_xml(&mut reader),
            Event::Empty(e) => {
                return T::from_empty_element()
                    .ok_or_else(|| XmlError::MissingElement(local_name(&e).unwrap_or_default()));
            }
            Event::Eof => {
                return Err(XmlError::MissingElement("root element".to_owned()));
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Helper functions for reading common XML patterns
// ---------------------------------------------------------------------------

/// Element name without any namespace prefix (`atom:link` becomes `link`).
fn local_name(e: &BytesStart<'_>) -> Result<String, XmlError> {
    let name = e.local_name();
    std::str::from_utf8(name.as_ref())
        .map(str::to_owned)
        .map_err(|err| XmlError::ParseError(err.to_string()))
}

/// Read an attribute by local name, unescaped.
fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, XmlError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            let raw = std::str::from_utf8(&attr.value)
                .map_err(|err| XmlError::ParseError(err.to_string()))?;
            let value = quick_xml::escape::unescape(raw)
                .map_err(|err| XmlError::ParseError(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// The `href` of an `<atom:link>` element, if `e` is one.
fn link_href(e: &BytesStart<'_>) -> Result<Option<String>, XmlError> {
    if e.local_name().as_ref() == b"link" {
        attribute(e, "href")
    } else {
        Ok(None)
    }
}

/// Read the text content of the current element and consume its end tag.
/// Surrounding whitespace is trimmed.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&decode_text(&e)?),
            Event::GeneralRef(e) => text.push_str(&resolve_entity(&e)?),
            Event::Start(_) => skip_element(reader)?,
            Event::End(_) => return Ok(text.trim().to_owned()),
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

fn decode_text(e: &BytesText<'_>) -> Result<String, XmlError> {
    e.decode()
        .map(std::borrow::Cow::into_owned)
        .map_err(|err| XmlError::ParseError(err.to_string()))
}

/// Resolve `&amp;`-style and `&#38;`-style references.
fn resolve_entity(e: &BytesRef<'_>) -> Result<String, XmlError> {
    if let Some(ch) = e.resolve_char_ref()? {
        return Ok(ch.to_string());
    }
    let name = e
        .decode()
        .map_err(|err| XmlError::ParseError(err.to_string()))?;
    quick_xml::escape::resolve_predefined_entity(&name)
        .map(str::to_owned)
        .ok_or_else(|| XmlError::ParseError(format!("unknown entity `&{name};`")))
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while skipping element".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Parse a boolean from XML text ("true"/"false").
fn parse_bool(s: &str) -> Result<bool, XmlError> {
    match s {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(XmlError::ParseError(format!("invalid boolean: {s}"))),
    }
}

fn eof(context: &str) -> XmlError {
    XmlError::UnexpectedElement(format!("unexpected EOF in {context}"))
}

// ---------------------------------------------------------------------------
// Catalog listings
// ---------------------------------------------------------------------------

/// A named catalog item with its `atom:link` target.
///
/// GeoServer uses this shape for every listing entry (`<workspace>`,
/// `<coverageStore>`, `<style>`, `<layer>`) and for references such as a
/// layer's `<defaultStyle>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Item name.
    pub name: String,
    /// Absolute URL of the item's own resource.
    pub href: Option<String>,
    /// Workspace name, when the entry carries one (styles do).
    pub workspace: Option<String>,
}

impl GsDeserialize for CatalogEntry {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut entry = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match local_name(&e)?.as_str() {
                    "name" => entry.name = read_text_content(reader)?,
                    "workspace" => entry.workspace = Some(read_workspace_name(reader)?),
                    "link" => {
                        entry.href = link_href(&e)?;
                        skip_element(reader)?;
                    }
                    _ => skip_element(reader)?,
                },
                Event::Empty(e) => {
                    if let Some(href) = link_href(&e)? {
                        entry.href = Some(href);
                    }
                }
                Event::End(_) => break,
                Event::Eof => return Err(eof("catalog entry")),
                _ => {}
            }
        }
        Ok(entry)
    }
}

/// `<workspace>` is either plain text or `<workspace><name>..</name>..</workspace>`.
fn read_workspace_name(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    let mut name = None;
    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&decode_text(&e)?),
            Event::GeneralRef(e) => text.push_str(&resolve_entity(&e)?),
            Event::Start(e) => {
                if local_name(&e)? == "name" {
                    name = Some(read_text_content(reader)?);
                } else {
                    skip_element(reader)?;
                }
            }
            Event::End(_) => return Ok(name.unwrap_or_else(|| text.trim().to_owned())),
            Event::Eof => return Err(eof("workspace")),
            _ => {}
        }
    }
}

/// A listing such as `<workspaces>`, `<coverageStores>`, `<styles>` or
/// `<layers>`: every child element is one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogListing {
    /// Entries in document order.
    pub entries: Vec<CatalogEntry>,
}

impl CatalogListing {
    /// Entry names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Consume the listing, keeping entries whose name is in `names`.
    /// An empty `names` keeps everything.
    #[must_use]
    pub fn filter_names(self, names: &[&str]) -> Vec<CatalogEntry> {
        self.entries
            .into_iter()
            .filter(|e| names.is_empty() || names.contains(&e.name.as_str()))
            .collect()
    }
}

impl GsDeserialize for CatalogListing {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut entries = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(_) => entries.push(CatalogEntry::deserialize_xml(reader)?),
                Event::Empty(_) => {}
                Event::End(_) => break,
                Event::Eof => return Err(eof("catalog listing")),
                _ => {}
            }
        }
        Ok(Self { entries })
    }

    fn from_empty_element() -> Option<Self> {
        Some(Self::default())
    }
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// The resource a layer publishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRef {
    /// `class` attribute, e.g. `coverage` or `featureType`.
    pub class: Option<String>,
    /// Qualified resource name, e.g. `my_test_2:wind`.
    pub name: String,
    /// Absolute URL of the resource.
    pub href: Option<String>,
}

/// A `<layer>` resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerInfo {
    /// Layer name.
    pub name: String,
    /// `RASTER`, `VECTOR`, ...
    pub layer_type: Option<String>,
    /// Default style reference.
    pub default_style: Option<CatalogEntry>,
    /// Published resource.
    pub resource: Option<ResourceRef>,
    /// Whether the layer is enabled.
    pub enabled: Option<bool>,
}

impl GsDeserialize for LayerInfo {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut layer = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match local_name(&e)?.as_str() {
                    "name" => layer.name = read_text_content(reader)?,
                    "type" => layer.layer_type = Some(read_text_content(reader)?),
                    "enabled" => layer.enabled = Some(parse_bool(&read_text_content(reader)?)?),
                    "defaultStyle" => {
                        layer.default_style = Some(CatalogEntry::deserialize_xml(reader)?);
                    }
                    "resource" => {
                        let class = attribute(&e, "class")?;
                        let entry = CatalogEntry::deserialize_xml(reader)?;
                        layer.resource = Some(ResourceRef {
                            class,
                            name: entry.name,
                            href: entry.href,
                        });
                    }
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => return Err(eof("layer")),
                _ => {}
            }
        }
        if layer.name.is_empty() {
            return Err(XmlError::MissingElement("layer/name".to_owned()));
        }
        Ok(layer)
    }
}

// ---------------------------------------------------------------------------
// about/version
// ---------------------------------------------------------------------------

/// The `about/version` resource: one `<resource name="..">` per component
/// with its properties as child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AboutInfo {
    /// `(component name, [(property, value)])` in document order.
    pub resources: Vec<(String, Vec<(String, String)>)>,
}

impl AboutInfo {
    /// Component whose version identifies the server.
    pub const GEOSERVER_RESOURCE: &'static str = "GeoServer";

    /// The `Version` property of the `GeoServer` resource.
    #[must_use]
    pub fn geoserver_version(&self) -> Option<&str> {
        self.resources
            .iter()
            .find(|(name, _)| name == Self::GEOSERVER_RESOURCE)
            .and_then(|(_, props)| props.iter().find(|(k, _)| k == "Version"))
            .map(|(_, v)| v.as_str())
    }
}

impl GsDeserialize for AboutInfo {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut about = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) if local_name(&e)? == "resource" => {
                    let name = attribute(&e, "name")?.unwrap_or_default();
                    about.resources.push((name, read_properties(reader)?));
                }
                Event::Start(_) => skip_element(reader)?,
                Event::End(_) => break,
                Event::Eof => return Err(eof("about")),
                _ => {}
            }
        }
        Ok(about)
    }

    fn from_empty_element() -> Option<Self> {
        Some(Self::default())
    }
}

fn read_properties(reader: &mut Reader<&[u8]>) -> Result<Vec<(String, String)>, XmlError> {
    let mut props = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let key = local_name(&e)?;
                props.push((key, read_text_content(reader)?));
            }
            Event::End(_) => return Ok(props),
            Event::Eof => return Err(eof("resource")),
            _ => {}
        }
    }
}
