//! arXiv source backed by the export query API.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::sync::Arc;

use crate::models::{non_empty, Authors, IdentifierKind, Metadata};
use crate::sources::{MetadataSource, SourceError};
use crate::utils::HttpClient;

/// Base URL for arXiv API
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// arXiv source
///
/// Fetches the Atom feed for a single id and reads the first `entry`:
/// the text of its first `title`, and the first `name` of every `author`.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl ArxivSource {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_base_url(client, ARXIV_API_URL)
    }

    /// Create against a different query endpoint (for testing)
    pub fn with_base_url(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Parse an Atom feed body into metadata for its first entry.
    ///
    /// A feed with no `entry` element is reported as
    /// [`SourceError::ArxivNotFound`].
    pub fn parse_feed(xml: &str) -> Result<Metadata, SourceError> {
        let mut reader = Reader::from_str(xml);
        let mut entry = FirstEntry::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if entry.start(e.name().as_ref()) {
                        break;
                    }
                }
                Event::Empty(e) => {
                    let name = e.name();
                    if entry.start(name.as_ref()) || entry.end(name.as_ref()) {
                        break;
                    }
                }
                Event::End(e) => {
                    if entry.end(e.name().as_ref()) {
                        break;
                    }
                }
                Event::Text(t) => entry.text(&t.unescape()?),
                Event::CData(c) => entry.text(&String::from_utf8_lossy(&c.into_inner())),
                Event::Eof => break,
                _ => {}
            }
        }

        if !entry.seen {
            return Err(SourceError::ArxivNotFound);
        }

        let authors = entry.authors.into_iter().map(non_empty).collect();
        Ok(Metadata::new(
            non_empty(entry.title),
            Some(Authors::List(authors)),
        ))
    }
}

/// Streaming state for the first `entry` of a feed.
#[derive(Debug, Default)]
struct FirstEntry {
    /// An `entry` start tag has been seen
    seen: bool,
    /// Nesting depth inside the entry, 0 when outside
    depth: usize,
    title: Option<String>,
    authors: Vec<Option<String>>,
    /// Depth of the `author` element currently open
    author_depth: Option<usize>,
    capture: Option<Capture>,
}

#[derive(Debug)]
struct Capture {
    target: Target,
    depth: usize,
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Title,
    AuthorName,
}

impl FirstEntry {
    /// Handle an opening tag. Returns `true` when parsing can stop.
    fn start(&mut self, name: &[u8]) -> bool {
        if self.depth == 0 {
            if name == b"entry" && !self.seen {
                self.seen = true;
                self.depth = 1;
            }
            return false;
        }

        self.depth += 1;
        if self.capture.is_some() {
            return false;
        }

        match name {
            b"title" if self.title.is_none() => self.begin(Target::Title),
            b"author" if self.author_depth.is_none() => {
                self.author_depth = Some(self.depth);
                self.authors.push(None);
            }
            b"name" if self.author_depth.is_some() && !self.current_author_named() => {
                self.begin(Target::AuthorName)
            }
            _ => {}
        }
        false
    }

    /// Handle a closing tag. Returns `true` once the first entry is closed.
    fn end(&mut self, _name: &[u8]) -> bool {
        if self.depth == 0 {
            return false;
        }

        let closes_capture = matches!(&self.capture, Some(c) if c.depth == self.depth);
        if let Some(capture) = closes_capture.then(|| self.capture.take()).flatten() {
            match capture.target {
                Target::Title => self.title = Some(capture.text),
                Target::AuthorName => {
                    if let Some(slot) = self.authors.last_mut() {
                        *slot = Some(capture.text);
                    }
                }
            }
        }

        if self.author_depth == Some(self.depth) {
            self.author_depth = None;
        }

        self.depth -= 1;
        self.depth == 0
    }

    fn text(&mut self, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            capture.text.push_str(text);
        }
    }

    fn begin(&mut self, target: Target) {
        self.capture = Some(Capture {
            target,
            depth: self.depth,
            text: String::new(),
        });
    }

    fn current_author_named(&self) -> bool {
        matches!(self.authors.last(), Some(Some(_)))
    }
}

#[async_trait]
impl MetadataSource for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    fn kind(&self) -> IdentifierKind {
        IdentifierKind::Arxiv
    }

    async fn resolve(&self, arxiv_id: &str) -> Result<Metadata, SourceError> {
        tracing::debug!(arxiv_id, "querying arXiv feed");

        let request = self
            .client
            .get(&self.base_url)
            .query(&[("id_list", arxiv_id)])
            .header("Accept", "application/atom+xml");
        let response = self.client.send(request, self.id()).await?;

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        Self::parse_feed(&body)
    }
}
