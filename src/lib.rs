//! # bibresolve
//!
//! Resolve the title and authors of a scholarly work from a single URL.
//!
//! The URL is classified into one identifier scheme (DOI, arXiv id, ISBN,
//! or a PDF under a trusted storage origin) and handed to the matching
//! source, which performs one lookup against its upstream service.
//!
//! ## Architecture
//!
//! - [`models`]: `Metadata`, `Authors` and classified `Identifier`s
//! - [`resolver`]: ordered classification rules and the [`Resolver`] dispatcher
//! - [`sources`]: the [`MetadataSource`] trait and the four adapters
//! - [`server`]: the `GET /api/metadata` HTTP endpoint
//! - [`utils`]: HTTP client, PDF and XMP metadata readers
//! - [`config`]: configuration management
//!
//! ```rust,no_run
//! use bibresolve::{config::Config, Resolver};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = Resolver::from_config(&Config::default())?;
//! let metadata = resolver.resolve("https://arxiv.org/abs/1706.03762").await?;
//! println!("{:?}", metadata.title);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod models;
pub mod resolver;
pub mod server;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::{Authors, Identifier, IdentifierKind, Metadata};
pub use resolver::Resolver;
pub use sources::{MetadataSource, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
