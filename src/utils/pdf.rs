//! PDF document metadata extraction.
//!
//! The [`PdfMetadataReader`] capability turns raw PDF bytes into a
//! [`PdfDocumentInfo`]: the classic trailer `Info` dictionary plus the XMP
//! packet referenced from the catalog, if any. [`LopdfReader`] is the
//! implementation used in production.

use lopdf::{Dictionary, Document, Object};

use super::xmp::StructuredMetadata;
use crate::sources::SourceError;

/// Fields of the document-info dictionary that matter for metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoDictionary {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Raw metadata read from a PDF
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfDocumentInfo {
    pub info: InfoDictionary,
    pub metadata: Option<StructuredMetadata>,
}

/// Capability that extracts document metadata from PDF bytes
pub trait PdfMetadataReader: Send + Sync + std::fmt::Debug {
    fn read(&self, bytes: &[u8]) -> Result<PdfDocumentInfo, SourceError>;
}

/// [`PdfMetadataReader`] backed by `lopdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfReader;

impl PdfMetadataReader for LopdfReader {
    fn read(&self, bytes: &[u8]) -> Result<PdfDocumentInfo, SourceError> {
        let document = Document::load_mem(bytes)?;

        let info = match info_dictionary(&document) {
            Some(dict) => InfoDictionary {
                title: text_field(&document, dict, b"Title"),
                author: text_field(&document, dict, b"Author"),
            },
            None => InfoDictionary::default(),
        };

        let metadata = match xmp_packet(&document) {
            Some(packet) => match StructuredMetadata::parse(&packet) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    tracing::debug!("ignoring unreadable XMP packet: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(PdfDocumentInfo { info, metadata })
    }
}

/// The trailer `Info` dictionary, whether inline or referenced
fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    let object = document.trailer.get(b"Info").ok()?;
    let (_, object) = document.dereference(object).ok()?;
    object.as_dict().ok()
}

/// Decoded XMP packet referenced by the catalog's `Metadata` entry
fn xmp_packet(document: &Document) -> Option<String> {
    let catalog = document.catalog().ok()?;
    let object = catalog.get(b"Metadata").ok()?;
    let (_, object) = document.dereference(object).ok()?;
    let stream = object.as_stream().ok()?;

    let content = if stream.dict.has(b"Filter") {
        stream.decompressed_content().ok()?
    } else {
        stream.content.clone()
    };

    Some(String::from_utf8_lossy(&content).into_owned())
}

fn text_field(document: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let object = dict.get(key).ok()?;
    let (_, object) = document.dereference(object).ok()?;
    match object {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Decode a PDF text string.
///
/// UTF-16BE and UTF-8 strings carry a byte order mark; anything else is
/// PDFDocEncoding, read here as Latin-1.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }

    bytes.iter().map(|&b| b as char).collect()
}
