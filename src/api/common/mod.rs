//
//  bitbucket-provider
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types shared by every resource adapter
//!
//! This module provides the error type used across the crate together with the
//! small JSON shapes that many Bitbucket payloads have in common.
//!
//! # Overview
//!
//! - [`ProviderError`] - Unified error type for transport, API and local validation failures
//! - [`Link`] - HATEOAS-style link representation (`{"href": ..., "name": ...}`)
//! - [`UserRef`] - Lightweight user reference as returned inside other payloads
//! - Pagination types (re-exported from [`pagination`] submodule)
//!
//! # Example
//!
//! ```rust
//! use bitbucket_provider::api::common::ProviderError;
//!
//! fn describe(result: Result<(), ProviderError>) -> String {
//!     match result {
//!         Ok(()) => "ok".to_string(),
//!         Err(ProviderError::NotFound(path)) => format!("gone: {path}"),
//!         Err(e) => e.to_string(),
//!     }
//! }
//! ```

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod pagination;

pub use pagination::*;

/// Result alias used throughout the library.
pub type Result<T, E = ProviderError> = std::result::Result<T, E>;

/// Errors raised by the transport, the resource adapters and local validation.
///
/// Status-code classification happens in the callers of the transport: a raw
/// response is turned into one of these variants by [`ProviderError::from_status`].
#[derive(Error, Debug)]
pub enum ProviderError {
    /// 401 from the remote.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// 403 from the remote.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// 404 from the remote.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// 5xx from the remote.
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A composite identifier did not have the expected shape.
    #[error("unexpected format of ID ({id:?}), expected {expected}")]
    InvalidId { id: String, expected: String },

    /// Configuration rejected by a resource schema.
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// Provider-level configuration problem (credentials, config file).
    #[error("provider configuration error: {0}")]
    Config(String),

    #[error("pagination for {path} exceeded {max_pages} pages")]
    PaginationLimit { path: String, max_pages: u32 },

    #[error("timed out after {waited_secs}s: {last_error}")]
    RetryTimeout { waited_secs: u64, last_error: String },

    /// An update touched fields that can only be set at creation time.
    #[error("changing {0:?} requires replacing the resource")]
    RequiresReplacement(Vec<String>),
}

impl ProviderError {
    /// Classifies a non-success status and its body into an error.
    ///
    /// The body is searched for the message shapes Bitbucket uses so that the
    /// user sees the server's explanation rather than raw JSON.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_error_message(body).unwrap_or_else(|| body.to_string());
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            s if s.is_server_error() => Self::ServerError {
                status: s.as_u16(),
                message,
            },
            s => Self::Api {
                status: s.as_u16(),
                message,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Statuses the pipeline-config enablement is allowed to retry on.
    pub fn is_permission_or_not_found(&self) -> bool {
        matches!(self, Self::Forbidden(_) | Self::NotFound(_))
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;

    // Cloud format: {"type": "error", "error": {"message": "..."}}
    if let Some(message) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        // Field-level details ride along in "error.fields"
        if let Some(fields) = json.get("error").and_then(|e| e.get("fields")) {
            return Some(format!("{} {}", message, fields));
        }
        return Some(message.to_string());
    }

    // Alternative Cloud format: {"error": {"detail": "..."}}
    if let Some(detail) = json
        .get("error")
        .and_then(|e| e.get("detail"))
        .and_then(|m| m.as_str())
    {
        return Some(detail.to_string());
    }

    // Simple message format: {"message": "..."}
    json.get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// A hypermedia link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub href: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A user as embedded in other payloads (reviewers, members, owners).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub account_id: Option<String>,

    #[serde(default)]
    pub uuid: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub nickname: Option<String>,

    #[serde(default)]
    pub username: Option<String>,
}
