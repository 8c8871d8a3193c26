//
//  bitbucket-provider
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Provider Library
//!
//! Declarative create/read/update/delete/import adapters for Bitbucket Cloud
//! objects, in the shape an infrastructure-as-code engine expects: every
//! managed object has a schema, a typed model, a stable identifier and an
//! idempotent lifecycle.
//!
//! ## Overview
//!
//! A [`config::ProviderConfig`] is assembled once and turned into a
//! [`resources::ProviderContext`], which carries the authenticated HTTP
//! client. Resources and data sources are looked up by type name in the
//! [`provider::Provider`] registry and driven with JSON documents.
//!
//! ## Module Structure
//!
//! - [`api`]: Authenticated transport, wire models and the pagination collector
//! - [`auth`]: Credential types applied to each request
//! - [`config`]: Provider configuration (file, environment, flags)
//! - [`schema`]: Field declarations, validation and replacement planning
//! - [`resources`]: The resource adapters and identifier codec
//! - [`data`]: Read-only data sources
//! - [`provider`]: Type-name registry and JSON state documents
//! - [`cli`]: The `bbtf` command-line interface
//! - [`output`]: JSON and table output
//! - [`util`]: Small string helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bitbucket_provider::config::ProviderConfig;
//! use bitbucket_provider::provider::Provider;
//! use bitbucket_provider::resources::ProviderContext;
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let ctx = ProviderContext::new(ProviderConfig::load(None)?)?;
//! let provider = Provider::new();
//!
//! let state = provider
//!     .resource("bitbucket_repository")?
//!     .create(&ctx, &json!({"owner": "acme", "name": "demo"}))
//!     .await?;
//! println!("created {:?}", state.id);
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
pub mod cli;

/// HTTP transport and Bitbucket wire models.
///
/// The client handles authentication, error classification and the
/// paginated collector; `cloud` and `legacy` hold per-endpoint models.
pub mod api;

/// Credential types.
pub mod auth;

/// Provider configuration.
///
/// Loaded from a TOML file in the platform config directory:
/// - Linux: `~/.config/bitbucket-provider/provider.toml`
/// - macOS: `~/Library/Application Support/bitbucket-provider/provider.toml`
/// - Windows: `%APPDATA%\bitbucket-provider\provider.toml`
pub mod config;

/// Read-only data sources.
pub mod data;

/// Output formatting: JSON for state documents, tables for schemas.
pub mod output;

/// Resource and data source registry.
pub mod provider;

/// Resource adapters.
pub mod resources;

/// Field schemas.
pub mod schema;

/// Utility functions.
pub mod util;

/// Re-export of the main CLI struct.
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use bitbucket_provider::Cli;
///
/// let cli = Cli::parse();
/// ```
pub use cli::Cli;

/// Re-export of the provider error and result alias.
pub use api::common::{ProviderError, Result};

/// Re-export of the registry.
pub use provider::Provider;

/// Application name constant.
///
/// # Value
///
/// `"bbtf"`
pub const APP_NAME: &str = "bbtf";

/// Application version constant, taken from Cargo.toml at compile time.
///
/// # Example
///
/// ```rust
/// use bitbucket_provider::VERSION;
///
/// println!("bbtf version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// # Exit Code Ranges
///
/// - `0`: Success
/// - `1-3`: General errors and usage issues
/// - `4-7`: Authentication-related issues
/// - `8-15`: Resource-related issues
///
/// # Example
///
/// ```rust,no_run
/// use bitbucket_provider::exit_codes;
/// use std::process;
///
/// process::exit(exit_codes::AUTH_ERROR);
/// ```
pub mod exit_codes {
    /// Successful execution.
    ///
    /// # Value
    ///
    /// `0`
    pub const SUCCESS: i32 = 0;

    /// General error.
    ///
    /// An unspecified error occurred, including remote server errors.
    /// Check stderr for details.
    ///
    /// # Value
    ///
    /// `1`
    pub const ERROR: i32 = 1;

    /// Invalid usage, configuration, identifier or planned change.
    ///
    /// Also returned when an update would change a force-new field.
    ///
    /// # Value
    ///
    /// `2`
    pub const USAGE: i32 = 2;

    /// Authentication required or rejected.
    ///
    /// # Value
    ///
    /// `4`
    pub const AUTH_ERROR: i32 = 4;

    /// Remote object not found.
    ///
    /// # Value
    ///
    /// `8`
    pub const NOT_FOUND: i32 = 8;

    /// Exit code for an error returned by a command.
    pub fn for_error(err: &anyhow::Error) -> i32 {
        use crate::ProviderError;

        match err.downcast_ref::<ProviderError>() {
            Some(ProviderError::NotFound(_)) => NOT_FOUND,
            Some(ProviderError::Unauthorized(_) | ProviderError::Forbidden(_)) => AUTH_ERROR,
            Some(
                ProviderError::Validation(_)
                | ProviderError::InvalidId { .. }
                | ProviderError::Config(_)
                | ProviderError::RequiresReplacement(_),
            ) => USAGE,
            _ => ERROR,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::ProviderError;

        #[test]
        fn test_error_mapping() {
            let err = anyhow::Error::new(ProviderError::NotFound("x".into()));
            assert_eq!(for_error(&err), NOT_FOUND);

            let err = anyhow::Error::new(ProviderError::Unauthorized("bad token".into()))
                .context("reading");
            assert_eq!(for_error(&err), AUTH_ERROR);

            let err = anyhow::Error::new(ProviderError::RequiresReplacement(vec!["stage".into()]));
            assert_eq!(for_error(&err), USAGE);

            assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
        }
    }
}
