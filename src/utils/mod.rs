//! Utility functions and helpers.

pub mod http;

use scraper::Selector;
use url::Url;

use crate::error::{AppError, Result};

/// Resolve a potentially relative URL against a base URL.
///
/// Returns `None` when the href cannot be joined onto the base.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|u| u.to_string())
}

/// Parse a CSS selector, mapping failures into [`AppError::Selector`].
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "page.html").as_deref(),
            Some("https://example.com/path/page.html")
        );
        assert_eq!(
            resolve_url(&base, "/root.html").as_deref(),
            Some("https://example.com/root.html")
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x").as_deref(),
            Some("https://other.com/x")
        );
    }

    #[test]
    fn test_resolve_url_rejects_garbage() {
        let base = Url::parse("https://example.com/").unwrap();
        assert_eq!(resolve_url(&base, "http://[::1"), None);
    }

    #[test]
    fn test_parse_selector() {
        assert!(parse_selector("div.class").is_ok());
        assert!(parse_selector("[[invalid").is_err());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
    }
}
