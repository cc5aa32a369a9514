//! Hosted PDF source reading embedded document metadata.

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{non_empty, Authors, IdentifierKind, Metadata};
use crate::sources::{MetadataSource, SourceError};
use crate::utils::{HttpClient, LopdfReader, PdfDocumentInfo, PdfMetadataReader};

/// A place a PDF may record its authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthorField {
    /// Comma-separated `Author` entry of the info dictionary
    InfoAuthor,
    /// A property of the XMP packet
    Structured(&'static str),
}

/// Where to look for authors, in priority order. The first populated
/// candidate wins.
const AUTHOR_FIELDS: [AuthorField; 4] = [
    AuthorField::InfoAuthor,
    AuthorField::Structured("dc.creator"),
    AuthorField::Structured("author"),
    AuthorField::Structured("dc:creator"),
];

impl AuthorField {
    fn extract(self, doc: &PdfDocumentInfo) -> Option<Vec<String>> {
        match self {
            AuthorField::InfoAuthor => {
                let author = doc.info.author.as_deref().filter(|a| !a.is_empty())?;
                Some(author.split(',').map(str::to_string).collect())
            }
            AuthorField::Structured(key) => {
                let values = doc.metadata.as_ref()?.get(key)?;
                (!values.is_empty()).then(|| values.to_vec())
            }
        }
    }
}

impl std::fmt::Display for AuthorField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorField::InfoAuthor => write!(f, "info Author"),
            AuthorField::Structured(key) => write!(f, "{}", key),
        }
    }
}

/// Title and authors from a parsed document.
///
/// The title only ever comes from the info dictionary, even when the XMP
/// packet has a `dc:title`.
pub fn metadata_from_document(doc: &PdfDocumentInfo) -> Metadata {
    let title = non_empty(doc.info.title.clone());

    let authors = AUTHOR_FIELDS.iter().find_map(|field| {
        let names = field.extract(doc)?;
        tracing::debug!(%field, count = names.len(), "authors taken from PDF metadata");
        Some(names)
    });

    let authors = authors.map(|names| {
        Authors::from_names(names.iter().map(|name| name.trim().to_string()))
    });

    Metadata::new(title, authors)
}

/// Hosted PDF source
///
/// Downloads the document and reads its metadata. There is no not-found
/// case: a document without metadata resolves to null fields.
#[derive(Debug, Clone)]
pub struct PdfSource {
    client: Arc<HttpClient>,
    reader: Arc<dyn PdfMetadataReader>,
}

impl PdfSource {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_reader(client, Arc::new(LopdfReader))
    }

    /// Use a different metadata reader
    pub fn with_reader(client: Arc<HttpClient>, reader: Arc<dyn PdfMetadataReader>) -> Self {
        Self { client, reader }
    }
}

#[async_trait]
impl MetadataSource for PdfSource {
    fn id(&self) -> &str {
        "pdf"
    }

    fn name(&self) -> &str {
        "Hosted PDF"
    }

    fn kind(&self) -> IdentifierKind {
        IdentifierKind::HostedPdf
    }

    async fn resolve(&self, pdf_url: &str) -> Result<Metadata, SourceError> {
        tracing::debug!(pdf_url, "fetching hosted PDF");

        let response = self.client.send(self.client.get(pdf_url), self.id()).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read PDF: {}", e)))?;

        let reader = Arc::clone(&self.reader);
        let document = tokio::task::spawn_blocking(move || reader.read(&bytes))
            .await
            .map_err(|e| SourceError::Other(format!("PDF parsing task failed: {}", e)))??;

        Ok(metadata_from_document(&document))
    }
}
