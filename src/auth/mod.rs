//
//  bitbucket-provider
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication
//!
//! Credentials are chosen once, at provider configuration time, and applied to
//! every request the transport sends. Two mutually exclusive methods exist:
//!
//! - **Basic**: a Bitbucket username with an app password
//! - **OAuth**: a bearer access token
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_provider::auth::AuthCredential;
//!
//! let basic = AuthCredential::basic("octo", "app-password");
//! let bearer = AuthCredential::bearer("token");
//! assert_eq!(basic.method_name(), "basic");
//! assert_eq!(bearer.method_name(), "oauth");
//! ```

use std::fmt;

use reqwest::RequestBuilder;

/// Credential attached to outgoing requests.
#[derive(Clone)]
pub enum AuthCredential {
    /// HTTP Basic with username and app password.
    Basic { username: String, password: String },

    /// OAuth 2.0 bearer token.
    OAuth { access_token: String },
}

impl AuthCredential {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::OAuth {
            access_token: token.into(),
        }
    }

    /// Adds the matching `Authorization` header to `request`.
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
            Self::OAuth { access_token } => request.bearer_auth(access_token),
        }
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::OAuth { .. } => "oauth",
        }
    }
}

// Secrets never reach log output.
impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::OAuth { .. } => f
                .debug_struct("OAuth")
                .field("access_token", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let cred = AuthCredential::basic("octo", "hunter2");
        let printed = format!("{cred:?}");
        assert!(printed.contains("octo"));
        assert!(!printed.contains("hunter2"));

        let cred = AuthCredential::bearer("tok-123");
        assert!(!format!("{cred:?}").contains("tok-123"));
    }
}
