//! URL classification and dispatch to metadata sources.

mod classify;

pub use classify::{classify, ClassifyRule, RULES};

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{Identifier, IdentifierKind, Metadata};
use crate::sources::{
    ArxivSource, DoiSource, IsbnSource, MetadataSource, PdfSource, SourceError,
};
use crate::utils::HttpClient;

/// Resolves a URL to metadata.
///
/// Holds one source per identifier kind. Each call classifies the URL and
/// performs a single lookup with the matching source; calls share no state.
#[derive(Debug, Clone)]
pub struct Resolver {
    sources: HashMap<IdentifierKind, Arc<dyn MetadataSource>>,
    trusted_pdf_origin: String,
}

impl Resolver {
    /// A resolver with no sources registered
    pub fn empty(trusted_pdf_origin: impl Into<String>) -> Self {
        Self {
            sources: HashMap::new(),
            trusted_pdf_origin: trusted_pdf_origin.into(),
        }
    }

    /// Build a resolver with all four sources from configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = Arc::new(HttpClient::from_config(&config.http)?);
        let upstream = &config.upstream;

        let mut resolver = Self::empty(upstream.trusted_pdf_origin.clone());
        resolver.register(Arc::new(DoiSource::with_base_url(
            Arc::clone(&client),
            upstream.doi_api_url.clone(),
        )));
        resolver.register(Arc::new(ArxivSource::with_base_url(
            Arc::clone(&client),
            upstream.arxiv_api_url.clone(),
        )));
        resolver.register(Arc::new(IsbnSource::with_base_url(
            Arc::clone(&client),
            upstream.openlibrary_api_url.clone(),
        )));
        resolver.register(Arc::new(PdfSource::new(client)));

        Ok(resolver)
    }

    /// Register a source, replacing any existing one for the same kind
    pub fn register(&mut self, source: Arc<dyn MetadataSource>) {
        self.sources.insert(source.kind(), source);
    }

    /// Get the source for an identifier kind
    pub fn get(&self, kind: IdentifierKind) -> Option<&Arc<dyn MetadataSource>> {
        self.sources.get(&kind)
    }

    /// Get all registered sources
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn MetadataSource>> {
        self.sources.values()
    }

    pub fn trusted_pdf_origin(&self) -> &str {
        &self.trusted_pdf_origin
    }

    /// Classify a URL without resolving it
    pub fn classify(&self, url: &str) -> Result<Identifier, SourceError> {
        classify(url, &self.trusted_pdf_origin)
    }

    /// Classify a URL and resolve it with the matching source
    pub async fn resolve(&self, url: &str) -> Result<Metadata, SourceError> {
        let identifier = self.classify(url)?;
        self.resolve_identifier(&identifier).await
    }

    /// Resolve an already classified identifier
    pub async fn resolve_identifier(&self, identifier: &Identifier) -> Result<Metadata, SourceError> {
        let kind = identifier.kind();
        let source = self.get(kind).ok_or(SourceError::NoSource(kind))?;

        tracing::info!(
            source = source.id(),
            identifier = identifier.value(),
            "resolving metadata"
        );

        source.resolve(identifier.value()).await
    }
}
