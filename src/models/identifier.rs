//! Classified identifiers extracted from an input URL.

/// Which lookup strategy an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Doi,
    Arxiv,
    Isbn,
    HostedPdf,
}

impl IdentifierKind {
    /// Human-readable name of the identifier scheme
    pub fn name(&self) -> &'static str {
        match self {
            IdentifierKind::Doi => "DOI",
            IdentifierKind::Arxiv => "arXiv",
            IdentifierKind::Isbn => "ISBN",
            IdentifierKind::HostedPdf => "hosted PDF",
        }
    }
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An identifier extracted from a URL, carrying the raw substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// Handle after the last `/` of a doi.org URL
    Doi(String),
    /// Id after the last `/` of an arxiv.org URL, without `.pdf`
    Arxiv(String),
    /// Code after the last `:` of an `ISBN:` URL
    Isbn(String),
    /// Full URL of a PDF under the trusted storage origin
    HostedPdf(String),
}

impl Identifier {
    pub fn kind(&self) -> IdentifierKind {
        match self {
            Identifier::Doi(_) => IdentifierKind::Doi,
            Identifier::Arxiv(_) => IdentifierKind::Arxiv,
            Identifier::Isbn(_) => IdentifierKind::Isbn,
            Identifier::HostedPdf(_) => IdentifierKind::HostedPdf,
        }
    }

    /// The raw identifier value handed to the source.
    pub fn value(&self) -> &str {
        match self {
            Identifier::Doi(v)
            | Identifier::Arxiv(v)
            | Identifier::Isbn(v)
            | Identifier::HostedPdf(v) => v,
        }
    }
}
