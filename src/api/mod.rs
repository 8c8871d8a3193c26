//
//  bitbucket-provider
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Layer
//!
//! HTTP transport and wire types for the Bitbucket Cloud REST API.
//!
//! ## Architecture
//!
//! - [`client`]: the one authenticated transport all adapters share
//! - [`cloud`]: request/response shapes for the `2.0` API
//! - [`legacy`]: request/response shapes for the `1.0` group endpoints
//! - [`common`]: errors, links, user references and pagination
//!
//! ## Creating a Client
//!
//! ```rust,no_run
//! use bitbucket_provider::api::BitbucketClient;
//! use bitbucket_provider::auth::AuthCredential;
//!
//! let client = BitbucketClient::cloud()
//!     .expect("Failed to create client")
//!     .with_auth(AuthCredential::bearer("your-token"));
//! ```

/// Core HTTP transport.
pub mod client;

/// Bitbucket Cloud API v2.0 wire types.
pub mod cloud;

/// Bitbucket API v1.0 wire types (groups).
pub mod legacy;

/// Shared error, link and pagination types.
pub mod common;

pub use client::{BitbucketClient, RawResponse};
pub use common::{ProviderError, Result};
