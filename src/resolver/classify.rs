//! URL classification.
//!
//! Rules are tried in a fixed order and the first match wins. The order
//! matters: a doi.org URL that also contains `ISBN:` is a DOI.

use crate::models::{Identifier, IdentifierKind};
use crate::sources::SourceError;

/// One classification rule: a pattern test and the identifier extraction
/// that runs when it matches.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyRule {
    pub kind: IdentifierKind,
    matches: fn(&str, &str) -> bool,
    extract: fn(&str) -> Result<Identifier, SourceError>,
}

/// Classification rules in priority order
pub const RULES: [ClassifyRule; 4] = [
    ClassifyRule {
        kind: IdentifierKind::Doi,
        matches: is_doi_url,
        extract: extract_doi,
    },
    ClassifyRule {
        kind: IdentifierKind::Arxiv,
        matches: is_arxiv_url,
        extract: extract_arxiv,
    },
    ClassifyRule {
        kind: IdentifierKind::Isbn,
        matches: is_isbn_url,
        extract: extract_isbn,
    },
    ClassifyRule {
        kind: IdentifierKind::HostedPdf,
        matches: is_hosted_pdf_url,
        extract: extract_hosted_pdf,
    },
];

impl ClassifyRule {
    pub fn matches(&self, url: &str, trusted_pdf_origin: &str) -> bool {
        (self.matches)(url, trusted_pdf_origin)
    }

    pub fn extract(&self, url: &str) -> Result<Identifier, SourceError> {
        (self.extract)(url)
    }
}

/// Classify a URL into exactly one identifier.
///
/// Pure string tests, no I/O. URLs matching no rule are
/// [`SourceError::UnsupportedFormat`].
pub fn classify(url: &str, trusted_pdf_origin: &str) -> Result<Identifier, SourceError> {
    RULES
        .iter()
        .find(|rule| rule.matches(url, trusted_pdf_origin))
        .ok_or(SourceError::UnsupportedFormat)?
        .extract(url)
}

fn is_doi_url(url: &str, _: &str) -> bool {
    url.contains("doi.org")
}

fn is_arxiv_url(url: &str, _: &str) -> bool {
    url.contains("arxiv.org")
}

fn is_isbn_url(url: &str, _: &str) -> bool {
    url.contains("ISBN:")
}

fn is_hosted_pdf_url(url: &str, trusted_pdf_origin: &str) -> bool {
    !trusted_pdf_origin.is_empty() && url.starts_with(trusted_pdf_origin)
}

/// Non-empty text after the last occurrence of `separator`
fn last_segment(url: &str, separator: char) -> Option<&str> {
    url.rsplit(separator).next().filter(|s| !s.is_empty())
}

fn extract_doi(url: &str) -> Result<Identifier, SourceError> {
    last_segment(url, '/')
        .map(|doi| Identifier::Doi(doi.to_string()))
        .ok_or(SourceError::InvalidDoiUrl)
}

fn extract_arxiv(url: &str) -> Result<Identifier, SourceError> {
    last_segment(url, '/')
        .map(|id| id.strip_suffix(".pdf").unwrap_or(id))
        .filter(|id| !id.is_empty())
        .map(|id| Identifier::Arxiv(id.to_string()))
        .ok_or(SourceError::InvalidArxivUrl)
}

fn extract_isbn(url: &str) -> Result<Identifier, SourceError> {
    last_segment(url, ':')
        .map(|isbn| Identifier::Isbn(isbn.to_string()))
        .ok_or(SourceError::InvalidIsbnUrl)
}

fn extract_hosted_pdf(url: &str) -> Result<Identifier, SourceError> {
    Ok(Identifier::HostedPdf(url.to_string()))
}
