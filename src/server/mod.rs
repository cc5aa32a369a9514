//! HTTP endpoint serving metadata lookups.
//!
//! `GET /api/metadata?url=<url>` answers `200 {"title", "authors"}` on
//! success, `400 {"error": "Invalid URL parameter"}` when `url` is missing
//! or given more than once, and `500 {"error": <message>}` for every
//! classification or lookup failure.

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::resolver::Resolver;
use crate::sources::SourceError;

/// Route of the metadata endpoint
pub const METADATA_PATH: &str = "/api/metadata";

/// Failure body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Error returned from handlers, mapped onto the two failure statuses
#[derive(Debug)]
pub struct ApiError(SourceError);

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            SourceError::InvalidInput => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}

/// Build the router
pub fn router(resolver: Arc<Resolver>) -> Router {
    Router::new()
        .route(METADATA_PATH, get(metadata_handler))
        .with_state(resolver)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped
pub async fn serve(resolver: Arc<Resolver>, addr: &str) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address {}: {}", addr, e))?;

    let listener = tokio::net::TcpListener::bind(socket_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", socket_addr, e))?;

    info!("Metadata endpoint listening on http://{}{}", socket_addr, METADATA_PATH);

    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// The single `url` query parameter, if exactly one was given
fn url_parameter(query: Option<&str>) -> Result<String, SourceError> {
    let mut values = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .filter(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned());

    match (values.next(), values.next()) {
        (Some(url), None) => Ok(url),
        _ => Err(SourceError::InvalidInput),
    }
}

#[instrument(skip(resolver, query))]
async fn metadata_handler(
    State(resolver): State<Arc<Resolver>>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let url = url_parameter(query.as_deref())?;

    match resolver.resolve(&url).await {
        Ok(metadata) => Ok((StatusCode::OK, Json(metadata)).into_response()),
        Err(e) => {
            tracing::warn!(%url, "metadata lookup failed: {}", e);
            Err(e.into())
        }
    }
}
