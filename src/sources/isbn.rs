//! ISBN source backed by the Open Library books API.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{non_empty, Authors, IdentifierKind, Metadata};
use crate::sources::{MetadataSource, SourceError};
use crate::utils::HttpClient;

/// Base URL for the Open Library books API
pub const OPENLIBRARY_API_URL: &str = "https://openlibrary.org/api/books";

/// ISBN source
///
/// Requests `bibkeys=ISBN:<isbn>` in `jscmd=data` mode; the response is an
/// object keyed by the bibkey, empty when the book is unknown.
#[derive(Debug, Clone)]
pub struct IsbnSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl IsbnSource {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_base_url(client, OPENLIBRARY_API_URL)
    }

    /// Create against a different books endpoint (for testing)
    pub fn with_base_url(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn bibkey(isbn: &str) -> String {
        format!("ISBN:{}", isbn)
    }

    fn parse_response(
        isbn: &str,
        mut data: HashMap<String, OpenLibraryBook>,
    ) -> Result<Metadata, SourceError> {
        let book = data
            .remove(&Self::bibkey(isbn))
            .ok_or(SourceError::IsbnNotFound)?;

        let authors = book.authors.map(|authors| {
            Authors::List(authors.into_iter().map(|a| non_empty(a.name)).collect())
        });

        Ok(Metadata::new(non_empty(book.title), authors))
    }
}

#[async_trait]
impl MetadataSource for IsbnSource {
    fn id(&self) -> &str {
        "isbn"
    }

    fn name(&self) -> &str {
        "Open Library"
    }

    fn kind(&self) -> IdentifierKind {
        IdentifierKind::Isbn
    }

    async fn resolve(&self, isbn: &str) -> Result<Metadata, SourceError> {
        tracing::debug!(isbn, "looking up ISBN");

        let bibkey = Self::bibkey(isbn);
        let request = self.client.get(&self.base_url).query(&[
            ("bibkeys", bibkey.as_str()),
            ("format", "json"),
            ("jscmd", "data"),
        ]);
        let response = self.client.send(request, self.id()).await?;

        let data: HashMap<String, OpenLibraryBook> = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        Self::parse_response(isbn, data)
    }
}

#[derive(Debug, Deserialize)]
struct OpenLibraryBook {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Option<Vec<OpenLibraryAuthor>>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryAuthor {
    #[serde(default)]
    name: Option<String>,
}
