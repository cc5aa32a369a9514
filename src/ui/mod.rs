//! Terminal output for the `lookup` command.

use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::models::Metadata;

/// Shown when a lookup succeeds without a title
pub const NO_TITLE: &str = "No title found";

/// Shown when a lookup succeeds without authors
pub const NO_AUTHORS: &str = "No authors found";

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Title line text, with the placeholder for a missing or empty title
pub fn title_text(metadata: &Metadata) -> String {
    metadata
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(NO_TITLE)
        .to_string()
}

/// Authors joined with ", ", with the placeholder when there are none
pub fn authors_text(metadata: &Metadata) -> String {
    match &metadata.authors {
        Some(authors) if !authors.is_empty() => authors.joined(", "),
        _ => NO_AUTHORS.to_string(),
    }
}

/// Unstyled two-line rendering
pub fn format_plain(metadata: &Metadata) -> String {
    format!(
        "Title: {}\nAuthors: {}",
        title_text(metadata),
        authors_text(metadata)
    )
}

/// Print metadata with colored labels
pub fn print_metadata(metadata: &Metadata) {
    println!("{} {}", "Title:".cyan().bold(), title_text(metadata).bold());
    println!("{} {}", "Authors:".cyan().bold(), authors_text(metadata));
}

/// Print an error line
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Authors;

    #[test]
    fn test_format_plain_with_values() {
        let metadata = Metadata::new(
            Some("1984".to_string()),
            Some(Authors::List(vec![
                Some("George Orwell".to_string()),
                None,
                Some("Editor".to_string()),
            ])),
        );
        assert_eq!(
            format_plain(&metadata),
            "Title: 1984\nAuthors: George Orwell, Editor"
        );
    }

    #[test]
    fn test_format_plain_placeholders() {
        assert_eq!(
            format_plain(&Metadata::default()),
            "Title: No title found\nAuthors: No authors found"
        );

        let metadata = Metadata::new(Some(String::new()), Some(Authors::List(vec![])));
        assert_eq!(
            format_plain(&metadata),
            "Title: No title found\nAuthors: No authors found"
        );
    }

    #[test]
    fn test_single_string_authors() {
        let metadata = Metadata::new(None, Some(Authors::Single("Doe, J.; Roe, R.".to_string())));
        assert_eq!(authors_text(&metadata), "Doe, J.; Roe, R.");
    }
}
