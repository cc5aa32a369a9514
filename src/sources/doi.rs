//! DOI source backed by the handle registry API.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::{non_empty, Authors, IdentifierKind, Metadata};
use crate::sources::{MetadataSource, SourceError};
use crate::utils::HttpClient;

/// Base URL for the handle registry API
pub const DOI_API_URL: &str = "https://doi.org/api/handles";

/// The only response code the registry uses for a resolved handle
const RESPONSE_CODE_SUCCESS: i64 = 1;

const TYPE_TITLE: &str = "HS_TITLE";
const TYPE_CREATOR: &str = "HS_CREATOR";

/// DOI source
///
/// Looks up a handle and picks the `HS_TITLE` and `HS_CREATOR` values out of
/// the typed value list. The registry has no structured author list, so the
/// creator comes back as a single string.
#[derive(Debug, Clone)]
pub struct DoiSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl DoiSource {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_base_url(client, DOI_API_URL)
    }

    /// Create against a different registry endpoint (for testing)
    pub fn with_base_url(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn parse_response(data: HandleResponse) -> Result<Metadata, SourceError> {
        if data.response_code != Some(RESPONSE_CODE_SUCCESS) {
            tracing::debug!(code = ?data.response_code, "handle registry reported failure");
            return Err(SourceError::DoiNotFound);
        }

        let title = data.value_of(TYPE_TITLE);
        let authors = data.value_of(TYPE_CREATOR).map(Authors::Single);

        Ok(Metadata::new(title, authors))
    }
}

#[async_trait]
impl MetadataSource for DoiSource {
    fn id(&self) -> &str {
        "doi"
    }

    fn name(&self) -> &str {
        "DOI handle registry"
    }

    fn kind(&self) -> IdentifierKind {
        IdentifierKind::Doi
    }

    async fn resolve(&self, doi: &str) -> Result<Metadata, SourceError> {
        let url = format!("{}/{}", self.base_url, doi);
        tracing::debug!(%url, "resolving DOI handle");

        let response = self.client.send(self.client.get(&url), self.id()).await?;
        let data: HandleResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse handle response: {}", e)))?;

        Self::parse_response(data)
    }
}

#[derive(Debug, Deserialize)]
struct HandleResponse {
    #[serde(rename = "responseCode", default)]
    response_code: Option<i64>,
    #[serde(default)]
    values: Vec<HandleValue>,
}

impl HandleResponse {
    /// First value of the given type, if it is a non-empty string
    fn value_of(&self, kind: &str) -> Option<String> {
        self.values
            .iter()
            .find(|v| v.kind == kind)
            .and_then(|v| v.data.value.as_ref())
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .and_then(|v| non_empty(Some(v)))
    }
}

#[derive(Debug, Deserialize)]
struct HandleValue {
    #[serde(rename = "type")]
    kind: String,
    data: HandleData,
}

#[derive(Debug, Deserialize)]
struct HandleData {
    #[serde(default)]
    value: Option<serde_json::Value>,
}
