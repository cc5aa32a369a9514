//! Metadata model returned by every source.

use serde::{Deserialize, Serialize};

/// Author list as reported by an upstream source.
///
/// The handle registry only ever gives a single free-form creator string,
/// while the other sources produce an ordered list. List entries may be
/// `None` when the upstream record has an author without a usable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Authors {
    Single(String),
    List(Vec<Option<String>>),
}

impl Authors {
    /// Build a list from names that are known to be present.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Authors::List(names.into_iter().map(|n| Some(n.into())).collect())
    }

    /// Join the authors for display, skipping missing names.
    pub fn joined(&self, separator: &str) -> String {
        match self {
            Authors::Single(s) => s.clone(),
            Authors::List(names) => names
                .iter()
                .flatten()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(separator),
        }
    }

    /// Whether there is nothing worth displaying.
    pub fn is_empty(&self) -> bool {
        match self {
            Authors::Single(s) => s.is_empty(),
            Authors::List(names) => names.iter().flatten().all(|n| n.is_empty()),
        }
    }
}

/// Title and authors of a resolved work.
///
/// Serializes to the `{ "title": ..., "authors": ... }` body of the
/// metadata endpoint, with absent fields as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub authors: Option<Authors>,
}

impl Metadata {
    pub fn new(title: Option<String>, authors: Option<Authors>) -> Self {
        Self { title, authors }
    }
}

/// Treat an empty upstream value as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_list_authors() {
        let metadata = Metadata::new(
            Some("1984".to_string()),
            Some(Authors::from_names(["George Orwell"])),
        );
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "1984", "authors": ["George Orwell"]})
        );
    }

    #[test]
    fn test_serialize_single_author_and_nulls() {
        let metadata = Metadata::new(None, Some(Authors::Single("Doe, J.".to_string())));
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json, serde_json::json!({"title": null, "authors": "Doe, J."}));

        let json = serde_json::to_value(Metadata::default()).unwrap();
        assert_eq!(json, serde_json::json!({"title": null, "authors": null}));
    }

    #[test]
    fn test_list_with_missing_name_serializes_null() {
        let authors = Authors::List(vec![Some("A".to_string()), None]);
        let json = serde_json::to_value(&authors).unwrap();
        assert_eq!(json, serde_json::json!(["A", null]));
    }

    #[test]
    fn test_joined() {
        let authors = Authors::List(vec![Some("A".to_string()), None, Some("B".to_string())]);
        assert_eq!(authors.joined(", "), "A, B");
        assert_eq!(Authors::Single("X".to_string()).joined(", "), "X");
        assert!(Authors::List(vec![None]).is_empty());
        assert!(!authors.is_empty());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("t".to_string())), Some("t".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
