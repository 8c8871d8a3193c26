//
//  bitbucket-provider
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Transport for the Bitbucket API
//!
//! This module provides the single client every resource adapter talks through.
//! It performs one authenticated request against a path relative to the API
//! root (`/2.0/...` or `/1.0/...`) and hands the raw status and body back to
//! the caller.
//!
//! ## Features
//!
//! - Basic or bearer authentication injected per request
//! - JSON and form-encoded request bodies
//! - Request and response logging at `debug` level
//! - A `bitbucket-provider/<version>` User-Agent
//!
//! ## Status handling
//!
//! [`BitbucketClient::request`] never interprets status codes. The typed helpers
//! ([`get_json`](BitbucketClient::get_json), [`post_json`](BitbucketClient::post_json),
//! [`put_json`](BitbucketClient::put_json)) turn any non-2xx status into a
//! [`ProviderError`] carrying the server's message, and
//! [`get_optional`](BitbucketClient::get_optional) maps 404 to `None` for the
//! read path. [`delete`](BitbucketClient::delete) treats 404 as success.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_provider::api::BitbucketClient;
//! use bitbucket_provider::auth::AuthCredential;
//!
//! # async fn example() -> bitbucket_provider::Result<()> {
//! let client = BitbucketClient::cloud()?.with_auth(AuthCredential::bearer("token"));
//! let user: serde_json::Value = client.get_json("2.0/user").await?;
//! println!("{}", user["display_name"]);
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::common::{ProviderError, Result};
use crate::auth::AuthCredential;
use crate::config::ProviderConfig;

/// Default API root for Bitbucket Cloud.
pub const DEFAULT_BASE_URL: &str = "https://api.bitbucket.org";

/// Default ceiling for [`collect_pages`](crate::api::common::collect_pages).
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// A response whose status has not been classified yet.
///
/// The body is read eagerly so that it can be logged and, on failure, searched
/// for the server's error message.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status as returned by the server.
    pub status: StatusCode,

    /// Response body as text; empty for `204 No Content`.
    pub body: String,
}

impl RawResponse {
    /// Returns `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns `true` for `404 Not Found`.
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Converts a non-success status into the matching [`ProviderError`].
    ///
    /// # Returns
    ///
    /// The response unchanged when the status is 2xx.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `Forbidden`, `NotFound`, `ServerError` or `Api`,
    /// classified by [`ProviderError::from_status`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ProviderError::from_status(self.status, &self.body))
        }
    }

    /// Decodes the body as JSON. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        Ok(serde_json::from_str(body)?)
    }
}

/// Authenticated client for the Bitbucket Cloud REST API.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    http: Client,
    base_url: String,
    auth: Option<AuthCredential>,
    max_pages: u32,
}

impl BitbucketClient {
    /// Creates an unauthenticated client for `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.bitbucket.org`; a trailing
    ///   slash is dropped
    ///
    /// # Errors
    ///
    /// [`ProviderError::Network`] if the TLS backend cannot be initialised.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .user_agent(format!("bitbucket-provider/{}", crate::VERSION))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: None,
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    /// Creates an unauthenticated client for `api.bitbucket.org`.
    pub fn cloud() -> Result<Self> {
        Self::new(DEFAULT_BASE_URL)
    }

    /// Creates a client from a validated provider configuration.
    ///
    /// The configured credential, if any, is attached, and the page ceiling is
    /// taken from `max_pages`.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let mut client = Self::new(&config.base_url)?.with_max_pages(config.max_pages);
        if let Some(auth) = config.credential() {
            client = client.with_auth(auth);
        }
        Ok(client)
    }

    /// Attaches a credential sent with every request except
    /// [`get_unauthenticated`](Self::get_unauthenticated).
    ///
    /// # Returns
    ///
    /// The client, for chaining.
    pub fn with_auth(mut self, auth: AuthCredential) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the page ceiling used by the paginated collector. Values below 1
    /// are raised to 1.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Resolves `path` against the base URL. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Performs one request and returns the raw response.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - Path relative to the API root, or an absolute URL
    /// * `body` - Optional JSON body
    ///
    /// Network failures are returned as [`ProviderError::Network`]; every HTTP
    /// status, including 4xx and 5xx, comes back as `Ok`.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<RawResponse> {
        let url = self.url(path);
        debug!(%method, %url, "Sending request");

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(auth) = &self.auth {
            request = auth.apply_to_request(request);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, %url, body = %body, "Received response");

        Ok(RawResponse { status, body })
    }

    /// POSTs a form-encoded body. Used by the legacy 1.0 group endpoints.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<RawResponse> {
        let url = self.url(path);
        debug!(%url, "Sending form request");

        let mut request = self.http.post(&url).form(form);
        if let Some(auth) = &self.auth {
            request = auth.apply_to_request(request);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, %url, body = %body, "Received response");

        RawResponse { status, body }.error_for_status()
    }

    /// GETs an absolute URL without credentials (third-party endpoints).
    pub async fn get_unauthenticated<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(%url, "Sending unauthenticated request");
        let response = self.http.get(url).send().await?;
        let raw = RawResponse {
            status: response.status(),
            body: response.text().await?,
        };
        raw.error_for_status()?.json()
    }

    /// GETs `path` and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Any non-2xx status, classified by [`RawResponse::error_for_status`],
    /// or a decode failure.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<()>(Method::GET, path, None)
            .await?
            .error_for_status()?
            .json()
    }

    /// GETs `path`, mapping 404 to `Ok(None)`.
    ///
    /// This is the read path of every resource adapter: a missing object is
    /// not an error there, it means the object left remote state.
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self.request::<()>(Method::GET, path, None).await?;
        if response.is_not_found() {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.json()?))
    }

    /// GETs `path` and returns the body text, failing on any non-2xx status.
    pub async fn get_text(&self, path: &str) -> Result<String> {
        Ok(self
            .request::<()>(Method::GET, path, None)
            .await?
            .error_for_status()?
            .body)
    }

    /// POSTs a JSON body and decodes the JSON response.
    ///
    /// # Arguments
    ///
    /// * `path` - Path relative to the API root
    /// * `body` - Request payload, serialised with serde
    ///
    /// # Returns
    ///
    /// The decoded response, typically the created object.
    ///
    /// # Errors
    ///
    /// Any non-2xx status or a decode failure.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, path, Some(body))
            .await?
            .error_for_status()?
            .json()
    }

    /// PUTs a JSON body and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Any non-2xx status or a decode failure.
    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PUT, path, Some(body))
            .await?
            .error_for_status()?
            .json()
    }

    /// PUTs a JSON body and discards the response body.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.request(Method::PUT, path, Some(body))
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// PUTs without a body (membership and reviewer endpoints).
    pub async fn put_empty(&self, path: &str) -> Result<()> {
        self.request::<()>(Method::PUT, path, None)
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// DELETEs `path`. A 404 means the object is already gone and is success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request::<()>(Method::DELETE, path, None).await?;
        if response.is_not_found() {
            debug!(path, "Delete target already absent");
            return Ok(());
        }
        response.error_for_status()?;
        Ok(())
    }
}
