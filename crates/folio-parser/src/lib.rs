//! Folio Parser Library
//!
//! Renders the markdown body of content records to HTML.

pub mod markdown;
pub mod syntax;

pub use markdown::{MarkdownRenderer, RenderedBody, TocEntry};
pub use syntax::SyntaxHighlighter;
use thiserror::Error;

/// Parser errors.
#[derive(Debug, Error)]
pub enum ParserError {
    /// The configured syntax theme is not bundled.
    #[error("unknown syntax theme \"{name}\" (available: {})", known.join(", "))]
    UnknownTheme { name: String, known: Vec<String> },
}

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("it's \"x\""), "it&#x27;s &quot;x&quot;");
    }
}
