//! Utility modules supporting metadata resolution.
//!
//! - [`HttpClient`]: shared outbound HTTP client
//! - [`PdfMetadataReader`]: capability that reads document metadata from PDF bytes,
//!   implemented by [`LopdfReader`]
//! - [`StructuredMetadata`]: properties of an embedded XMP (Dublin Core) packet

mod http;
mod pdf;
mod xmp;

pub use http::{HttpClient, DEFAULT_USER_AGENT};
pub use pdf::{decode_text_string, InfoDictionary, LopdfReader, PdfDocumentInfo, PdfMetadataReader};
pub use xmp::StructuredMetadata;
