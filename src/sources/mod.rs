//! Metadata source adapters with a trait-based architecture.
//!
//! Each upstream service implements [`MetadataSource`]. The
//! [`Resolver`](crate::resolver::Resolver) classifies a URL and hands the
//! extracted identifier to the source registered for that identifier kind.
//!
//! | Source  | Upstream                           | Payload     |
//! |---------|------------------------------------|-------------|
//! | `doi`   | handle registry `/api/handles/{h}` | JSON        |
//! | `arxiv` | arXiv query API `?id_list={id}`    | Atom XML    |
//! | `isbn`  | Open Library `/api/books`          | JSON        |
//! | `pdf`   | trusted storage origin             | PDF bytes   |
//!
//! Every source performs exactly one outbound fetch per call and never
//! retries.

mod arxiv;
mod doi;
mod isbn;
mod pdf;

pub use arxiv::ArxivSource;
pub use doi::DoiSource;
pub use isbn::IsbnSource;
pub use pdf::PdfSource;

use crate::models::{IdentifierKind, Metadata};
use async_trait::async_trait;

/// Interface implemented by every metadata lookup strategy.
#[async_trait]
pub trait MetadataSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "doi", "arxiv")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// The identifier kind this source resolves
    fn kind(&self) -> IdentifierKind;

    /// Resolve title and authors for a raw identifier value
    async fn resolve(&self, identifier: &str) -> Result<Metadata, SourceError>;
}

/// Errors that can occur while classifying a URL or resolving metadata.
///
/// The `Display` text is what clients see in the `error` field of the
/// endpoint's failure body.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The `url` query parameter was missing or repeated
    #[error("Invalid URL parameter")]
    InvalidInput,

    /// The URL matched none of the classification rules
    #[error("Unsupported URL format")]
    UnsupportedFormat,

    #[error("Invalid DOI URL")]
    InvalidDoiUrl,

    #[error("Invalid arXiv URL")]
    InvalidArxivUrl,

    #[error("Invalid ISBN URL")]
    InvalidIsbnUrl,

    #[error("DOI not found")]
    DoiNotFound,

    #[error("arXiv entry not found")]
    ArxivNotFound,

    #[error("ISBN not found")]
    IsbnNotFound,

    /// No source is registered for a classified identifier
    #[error("No source registered for {0} identifiers")]
    NoSource(IdentifierKind),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML, JSON, PDF)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for SourceError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        SourceError::Parse(format!("XML attribute: {}", err))
    }
}

impl From<lopdf::Error> for SourceError {
    fn from(err: lopdf::Error) -> Self {
        SourceError::Parse(format!("PDF: {}", err))
    }
}
