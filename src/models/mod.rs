//! Core data models for identifiers and resolved metadata.

mod identifier;
mod metadata;

pub use identifier::{Identifier, IdentifierKind};
pub use metadata::{Authors, Metadata};

pub(crate) use metadata::non_empty;
