//
//  bitbucket-provider
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Small string helpers shared by the adapters and the CLI.
//!
//! - [`compute_slug`]: the slug Bitbucket derives from a repository name
//! - [`escape`]: percent-encodes one URL path segment
//! - [`truncate`]: shortens text for table output
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_provider::util::{compute_slug, escape};
//!
//! assert_eq!(compute_slug("My Service"), "my-service");
//! assert_eq!(escape("{abc}"), "%7Babc%7D");
//! ```

use std::borrow::Cow;

/// Derives a repository slug from a display name.
///
/// Lower-cases the input, replaces every non-alphanumeric character with a
/// hyphen, collapses hyphen runs, and trims hyphens from both ends.
///
/// # Example
///
/// ```rust
/// use bitbucket_provider::util::compute_slug;
///
/// assert_eq!(compute_slug("demo"), "demo");
/// assert_eq!(compute_slug("Hello World"), "hello-world");
/// assert_eq!(compute_slug("  Multiple   Spaces  "), "multiple-spaces");
/// ```
pub fn compute_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Percent-encodes a single path segment so a `/` inside it cannot change the
/// shape of the request path.
pub fn escape(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

/// Truncates a string to at most `max_len` characters, ending with `...` when
/// shortened.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_slug() {
        assert_eq!(compute_slug("demo"), "demo");
        assert_eq!(compute_slug("Hello World"), "hello-world");
        assert_eq!(compute_slug("foo--bar"), "foo-bar");
        assert_eq!(compute_slug("test_123"), "test-123");
        assert_eq!(compute_slug("--"), "");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain-slug"), "plain-slug");
        assert_eq!(escape("a/b"), "a%2Fb");
        assert_eq!(escape("{1234}"), "%7B1234%7D");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("short", 3), "sho");
    }
}
