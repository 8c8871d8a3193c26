//
//  bitbucket-provider
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Provider Configuration
//!
//! One immutable [`ProviderConfig`] describes how to reach Bitbucket: which
//! credentials to use, the API root, and the limits applied by the pagination
//! collector and the pipeline-config retry loop. It is assembled once and then
//! passed, by reference, to every adapter call.
//!
//! ## Sources
//!
//! Values are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (explicit path, or the platform config directory)
//! 3. Environment variables `BITBUCKET_USERNAME`, `BITBUCKET_PASSWORD`,
//!    `BITBUCKET_OAUTH_TOKEN`
//! 4. Command-line flags (applied by the binary)
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/bitbucket-provider/provider.toml`
//! - **macOS**: `~/Library/Application Support/bitbucket-provider/provider.toml`
//! - **Windows**: `%APPDATA%\bitbucket-provider\provider.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! username = "octo"
//! password = "app-password"
//! max_pages = 50
//! create_timeout_secs = 300
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::client::{DEFAULT_BASE_URL, DEFAULT_MAX_PAGES};
use crate::api::common::{ProviderError, Result};
use crate::auth::AuthCredential;

pub const ENV_USERNAME: &str = "BITBUCKET_USERNAME";
pub const ENV_PASSWORD: &str = "BITBUCKET_PASSWORD";
pub const ENV_OAUTH_TOKEN: &str = "BITBUCKET_OAUTH_TOKEN";

pub const DEFAULT_IP_RANGES_URL: &str = "https://ip-ranges.atlassian.com/";

/// Provider-wide settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub oauth_token: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_ip_ranges_url")]
    pub ip_ranges_url: String,

    /// Upper bound on pages fetched by one paginated read.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Time budget for create-time retries (pipeline-config enablement).
    #[serde(default = "default_create_timeout_secs")]
    pub create_timeout_secs: u64,

    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_ip_ranges_url() -> String {
    DEFAULT_IP_RANGES_URL.to_string()
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_create_timeout_secs() -> u64 {
    120
}

fn default_retry_interval_secs() -> u64 {
    2
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            oauth_token: None,
            base_url: default_base_url(),
            ip_ranges_url: default_ip_ranges_url(),
            max_pages: default_max_pages(),
            create_timeout_secs: default_create_timeout_secs(),
            retry_interval_secs: default_retry_interval_secs(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("oauth_token", &self.oauth_token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("ip_ranges_url", &self.ip_ranges_url)
            .field("max_pages", &self.max_pages)
            .field("create_timeout_secs", &self.create_timeout_secs)
            .field("retry_interval_secs", &self.retry_interval_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Loads the file (if any) and overlays the process environment.
    ///
    /// With `path = None` the platform config file is used when it exists;
    /// an explicit path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| ProviderError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "bitbucket-provider")
            .map(|dirs| dirs.config_dir().join("provider.toml"))
    }

    /// Fills credentials from environment lookups. Non-empty values win.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = non_empty(ENV_USERNAME) {
            self.username = Some(v);
        }
        if let Some(v) = non_empty(ENV_PASSWORD) {
            self.password = Some(v);
        }
        if let Some(v) = non_empty(ENV_OAUTH_TOKEN) {
            self.oauth_token = Some(v);
        }
    }

    /// Checks the cross-field rules on credentials and limits.
    ///
    /// - `username` and `password` must be given together
    /// - `oauth_token` conflicts with `username`/`password`
    /// - `max_pages` must be at least 1
    /// - `retry_interval_secs` must be at least 1
    /// - `base_url` must be an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        let has_user = self.username.as_deref().is_some_and(|v| !v.is_empty());
        let has_pass = self.password.as_deref().is_some_and(|v| !v.is_empty());
        let has_token = self.oauth_token.as_deref().is_some_and(|v| !v.is_empty());

        if has_user && !has_pass {
            return Err(ProviderError::Config(
                "found username for basic auth, but password not specified".to_string(),
            ));
        }
        if has_pass && !has_user {
            return Err(ProviderError::Config(
                "found password for basic auth, but username not specified".to_string(),
            ));
        }
        if has_token && (has_user || has_pass) {
            return Err(ProviderError::Config(
                "oauth_token conflicts with username/password".to_string(),
            ));
        }
        if self.max_pages == 0 {
            return Err(ProviderError::Config("max_pages must be at least 1".to_string()));
        }
        if self.retry_interval_secs == 0 {
            return Err(ProviderError::Config(
                "retry_interval_secs must be at least 1".to_string(),
            ));
        }
        match Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ProviderError::Config(format!(
                    "base_url scheme {:?} is not http or https",
                    url.scheme()
                )))
            }
            Err(e) => {
                return Err(ProviderError::Config(format!(
                    "invalid base_url {:?}: {e}",
                    self.base_url
                )))
            }
        }
        Ok(())
    }

    /// The credential selected by this configuration, if any.
    pub fn credential(&self) -> Option<AuthCredential> {
        if let Some(token) = self.oauth_token.as_deref().filter(|t| !t.is_empty()) {
            return Some(AuthCredential::bearer(token));
        }
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => {
                Some(AuthCredential::basic(u, p))
            }
            _ => None,
        }
    }

    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }
}
