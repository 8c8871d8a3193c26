//
//  bitbucket-provider
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination for Bitbucket list endpoints
//!
//! Bitbucket Cloud list responses are wrapped in an envelope:
//!
//! ```json
//! {"values": [...], "page": 1, "pagelen": 10, "size": 25, "next": "https://..."}
//! ```
//!
//! [`collect_pages`] follows the envelope page by page until `next` is empty,
//! requesting each following page by incrementing the `page` query parameter.
//! The loop is bounded by the client's `max_pages` so that a server which
//! always reports a `next` page fails loudly instead of looping forever.
//!
//! # Example
//!
//! ```rust,no_run
//! use bitbucket_provider::api::BitbucketClient;
//! use bitbucket_provider::api::common::collect_pages;
//! use bitbucket_provider::api::common::UserRef;
//!
//! # async fn example(client: &BitbucketClient) -> bitbucket_provider::Result<()> {
//! let reviewers: Vec<UserRef> =
//!     collect_pages(client, "/2.0/repositories/acme/api/default-reviewers").await?;
//! println!("{} reviewers", reviewers.len());
//! # Ok(())
//! # }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ProviderError, Result};
use crate::api::BitbucketClient;

/// One page of a Bitbucket Cloud list response.
///
/// # Fields
///
/// | Field | Description |
/// |-------|-------------|
/// | `values` | Items in the current page |
/// | `page` | Current page number (1-indexed), when the endpoint reports it |
/// | `pagelen` | Maximum items per page |
/// | `size` | Total number of items across all pages |
/// | `next` | URL of the following page; absent or empty on the last page |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Items in the current page. May be empty.
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,

    #[serde(default)]
    pub page: Option<u32>,

    #[serde(default)]
    pub pagelen: Option<u32>,

    #[serde(default)]
    pub size: Option<u32>,

    /// URL to fetch the next page of results.
    #[serde(default)]
    pub next: Option<String>,

    #[serde(default)]
    pub previous: Option<String>,
}

impl<T> PaginatedResponse<T> {
    /// Returns `true` when the envelope names a following page.
    ///
    /// An empty `next` string counts as "no more pages".
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref().filter(|n| !n.is_empty())
    }
}

/// Builds the path for page `page` of a list endpoint.
pub fn page_path(path: &str, page: u32) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}page={page}")
}

/// Fetches every page of a list endpoint and returns the items in page order.
///
/// The first request goes to `path` unchanged. While the returned envelope has
/// a non-empty `next`, the page counter is incremented (starting from the page
/// number the server reported, if any) and the next page is requested with a
/// `page=<n>` query parameter. Items are appended in order; duplicates are kept.
///
/// # Errors
///
/// - Any transport or status error from the underlying requests
/// - [`ProviderError::PaginationLimit`] once more than `client.max_pages()`
///   pages would be requested
pub async fn collect_pages<T: DeserializeOwned>(
    client: &BitbucketClient,
    path: &str,
) -> Result<Vec<T>> {
    let max_pages = client.max_pages();
    let mut items = Vec::new();
    let mut current = path.to_string();
    let mut page: u32 = 1;
    let mut fetched: u32 = 0;

    loop {
        if fetched >= max_pages {
            return Err(ProviderError::PaginationLimit {
                path: path.to_string(),
                max_pages,
            });
        }

        let envelope: PaginatedResponse<T> = client.get_json(&current).await?;
        fetched += 1;
        debug!(
            path = %current,
            count = envelope.values.len(),
            has_next = envelope.has_next(),
            "Fetched page"
        );

        let has_next = envelope.has_next();
        let reported_page = envelope.page;
        items.extend(envelope.values);

        if !has_next {
            break;
        }

        page = reported_page.unwrap_or(page) + 1;
        current = page_path(path, page);
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_path_appends_query() {
        assert_eq!(page_path("/2.0/x", 2), "/2.0/x?page=2");
        assert_eq!(page_path("/2.0/x?q=1", 3), "/2.0/x?q=1&page=3");
    }

    #[test]
    fn test_empty_next_is_last_page() {
        let json = r#"{"values": [1, 2], "page": 1, "size": 2, "next": ""}"#;
        let envelope: PaginatedResponse<u32> = serde_json::from_str(json).unwrap();
        assert!(!envelope.has_next());
        assert_eq!(envelope.next_url(), None);
    }

    #[test]
    fn test_next_link_is_detected() {
        let json = r#"{"values": [], "next": "https://api.bitbucket.org/2.0/x?page=2"}"#;
        let envelope: PaginatedResponse<u32> = serde_json::from_str(json).unwrap();
        assert!(envelope.has_next());
        assert!(envelope.values.is_empty());
    }
}
