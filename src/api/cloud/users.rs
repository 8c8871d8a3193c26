//
//  bitbucket-provider
//  api/cloud/users.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! User, SSH key and reviewer API types.

use serde::{Deserialize, Serialize};

use crate::api::common::UserRef;

/// A Bitbucket account, from `2.0/user` or `2.0/users/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub uuid: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub nickname: Option<String>,
    pub account_id: Option<String>,
    pub account_status: Option<String>,
    pub is_staff: bool,
}

/// A user's SSH key, `2.0/users/{user}/ssh-keys`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SshKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    /// Only sent on create; the API returns the key without its comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing)]
    pub comment: Option<String>,
}

/// One entry in a default-reviewers listing.
///
/// Repository listings put the account at the top level; project listings
/// nest it under `user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Reviewer {
    pub uuid: Option<String>,
    pub display_name: Option<String>,
    pub user: Option<UserRef>,
    pub reviewer_type: Option<String>,
}

impl Reviewer {
    pub fn account_uuid(&self) -> Option<&str> {
        self.uuid
            .as_deref()
            .or_else(|| self.user.as_ref().and_then(|u| u.uuid.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reviewer_uuid_from_either_shape() {
        let flat: Reviewer = serde_json::from_str(r#"{"uuid": "{a}", "type": "user"}"#).unwrap();
        assert_eq!(flat.account_uuid(), Some("{a}"));

        let nested: Reviewer = serde_json::from_str(
            r#"{"user": {"uuid": "{b}", "display_name": "Bea"}, "reviewer_type": "project"}"#,
        )
        .unwrap();
        assert_eq!(nested.account_uuid(), Some("{b}"));
    }

    #[test]
    fn test_ssh_key_comment_is_read_only() {
        let key = SshKey {
            key: Some("ssh-ed25519 AAAA".to_string()),
            comment: Some("me@host".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&key).unwrap();
        assert!(value.get("comment").is_none());
    }
}
