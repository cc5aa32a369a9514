//! XMP (Dublin Core) metadata packets.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

use crate::sources::SourceError;

const RDF_DESCRIPTION: &[u8] = b"rdf:Description";
const RDF_LI: &[u8] = b"rdf:li";

/// Properties of an XMP packet, keyed by name.
///
/// A prefixed property such as `dc:creator` is stored under the lower-cased
/// qualified name and under its dotted alias `dc.creator`; an unprefixed one
/// under its local name. Values keep document order, one per `rdf:li` item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredMetadata {
    properties: HashMap<String, Vec<String>>,
}

impl StructuredMetadata {
    /// Parse an XMP packet
    pub fn parse(xml: &str) -> Result<Self, SourceError> {
        let mut reader = Reader::from_str(xml);
        let mut metadata = Self::default();

        let mut depth = 0usize;
        // Depth of the top-level `rdf:Description` being read
        let mut description_depth: Option<usize> = None;
        let mut property: Option<Property> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    depth += 1;
                    let name = e.name();
                    if let Some(p) = property.as_mut() {
                        // Nested structures (e.g. `xmpMM:History` events) stay inside the property
                        if name.as_ref() == RDF_LI {
                            p.open_item(depth);
                        }
                    } else if name.as_ref() == RDF_DESCRIPTION && description_depth.is_none() {
                        description_depth = Some(depth);
                        metadata.add_attributes(&e)?;
                    } else if description_depth == Some(depth - 1) {
                        property = Some(Property::new(name.as_ref(), depth));
                    }
                }
                Event::Empty(e) => {
                    if property.is_none()
                        && description_depth.is_none()
                        && e.name().as_ref() == RDF_DESCRIPTION
                    {
                        metadata.add_attributes(&e)?;
                    }
                }
                Event::End(_) => {
                    if let Some(p) = property.as_mut() {
                        p.close_item(depth);
                    }
                    if property.as_ref().is_some_and(|p| p.depth == depth) {
                        if let Some(p) = property.take() {
                            metadata.add_property(p);
                        }
                    }
                    if description_depth == Some(depth) {
                        description_depth = None;
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Text(t) => {
                    if let Some(p) = property.as_mut() {
                        p.push_text(depth, &t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(p) = property.as_mut() {
                        p.push_text(depth, &String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(metadata)
    }

    /// Values recorded for a key, in document order
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.properties.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Record values under a key, as the parser would
    pub fn insert(&mut self, name: &str, values: Vec<String>) {
        for key in keys_for(name) {
            self.properties
                .entry(key)
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    fn add_property(&mut self, property: Property) {
        let values = if property.values.is_empty() {
            let text = property.text.trim();
            if text.is_empty() {
                return;
            }
            vec![text.to_string()]
        } else {
            property.values
        };
        self.insert(&property.name, values);
    }

    /// Simple properties written as attributes of `rdf:Description`
    fn add_attributes(&mut self, element: &BytesStart<'_>) -> Result<(), SourceError> {
        for attribute in element.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            if key.starts_with("xmlns") || key.starts_with("rdf:") || key.starts_with("xml:") {
                continue;
            }
            let value = attribute.unescape_value()?.into_owned();
            if !value.is_empty() {
                self.insert(&key, vec![value]);
            }
        }
        Ok(())
    }
}

/// A property element being read
#[derive(Debug)]
struct Property {
    name: String,
    depth: usize,
    /// Text directly inside the property element
    text: String,
    /// The `rdf:li` item currently open, with its depth
    item: Option<(usize, String)>,
    values: Vec<String>,
}

impl Property {
    fn new(name: &[u8], depth: usize) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            depth,
            text: String::new(),
            item: None,
            values: Vec::new(),
        }
    }

    /// Start an item of the property's container (`property > rdf:Seq > rdf:li`)
    fn open_item(&mut self, depth: usize) {
        if self.item.is_none() && depth == self.depth + 2 {
            self.item = Some((depth, String::new()));
        }
    }

    fn close_item(&mut self, depth: usize) {
        if !matches!(&self.item, Some((item_depth, _)) if *item_depth == depth) {
            return;
        }
        if let Some((_, item)) = self.item.take() {
            if !item.trim().is_empty() {
                self.values.push(item);
            }
        }
    }

    /// Keep only text that is a direct child of the open item or of the
    /// property itself.
    fn push_text(&mut self, depth: usize, text: &str) {
        match self.item.as_mut() {
            Some((item_depth, item)) if *item_depth == depth => item.push_str(text),
            Some(_) => {}
            None if depth == self.depth => self.text.push_str(text),
            None => {}
        }
    }
}

fn keys_for(name: &str) -> Vec<String> {
    let name = name.to_lowercase();
    match name.split_once(':') {
        Some((prefix, local)) => {
            let dotted = format!("{}.{}", prefix, local);
            vec![name, dotted]
        }
        None => vec![name],
    }
}
