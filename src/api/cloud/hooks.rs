//
//  bitbucket-provider
//  api/cloud/hooks.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Webhook API types.
//!
//! Repository hooks live under `2.0/repositories/{ws}/{slug}/hooks`, workspace
//! hooks under `2.0/workspaces/{ws}/hooks`. Both share the same body.

use serde::{Deserialize, Serialize};

/// Event names a webhook may subscribe to.
pub const HOOK_EVENTS: &[&str] = &[
    "issue:comment_created",
    "issue:created",
    "issue:updated",
    "project:updated",
    "pullrequest:approved",
    "pullrequest:changes_request_created",
    "pullrequest:changes_request_removed",
    "pullrequest:comment_created",
    "pullrequest:comment_deleted",
    "pullrequest:comment_updated",
    "pullrequest:created",
    "pullrequest:fulfilled",
    "pullrequest:rejected",
    "pullrequest:unapproved",
    "pullrequest:updated",
    "repo:commit_comment_created",
    "repo:commit_status_created",
    "repo:commit_status_updated",
    "repo:created",
    "repo:deleted",
    "repo:fork",
    "repo:imported",
    "repo:push",
    "repo:transfer",
    "repo:updated",
];

/// Subjects `2.0/hook_events/{subject_type}` accepts.
pub const HOOK_SUBJECT_TYPES: &[&str] = &["workspace", "user", "repository", "team"];

/// A webhook subscription.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Webhook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub skip_cert_verification: bool,

    #[serde(default)]
    pub events: Vec<String>,
}

/// One entry of the hook event catalogue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HookEvent {
    pub event: String,
    pub category: String,
    pub label: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_uuid() {
        let hook = Webhook {
            url: "https://ci.example.com/hook".to_string(),
            description: "ci".to_string(),
            active: true,
            events: vec!["repo:push".to_string()],
            ..Default::default()
        };
        let value = serde_json::to_value(&hook).unwrap();
        assert!(value.get("uuid").is_none());
        assert_eq!(value["skip_cert_verification"], false);
    }

    #[test]
    fn test_event_catalogue_is_sorted() {
        let mut sorted = HOOK_EVENTS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, HOOK_EVENTS);
    }
}
