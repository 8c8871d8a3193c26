//
//  bitbucket-provider
//  api/cloud/repositories.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Cloud repository API types.
//!
//! Covers the repository object itself, the fork request, the pipelines
//! enablement switch (`pipelines_config`) and repository deploy keys.
//!
//! # Notes
//!
//! - Repository slugs are URL-safe versions of repository names
//! - `full_name` follows the format `{workspace}/{repo_slug}`
//! - `pipelines_config` answers 404 until pipelines have been enabled once

use serde::{Deserialize, Serialize};

use crate::api::common::Link;

/// A Bitbucket Cloud repository as returned by `GET 2.0/repositories/{ws}/{slug}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    /// Unique identifier (e.g., `{123e4567-e89b-...}`).
    pub uuid: String,

    pub name: String,

    /// Full path in format `{workspace_slug}/{repo_slug}`.
    pub full_name: String,

    pub slug: String,

    /// `git` or `hg`.
    pub scm: String,

    pub has_wiki: bool,

    pub has_issues: bool,

    pub website: Option<String>,

    pub is_private: bool,

    /// `allow_forks`, `no_public_forks` or `no_forks`.
    pub fork_policy: String,

    pub language: Option<String>,

    pub description: Option<String>,

    pub project: Option<ProjectKey>,

    pub links: RepositoryLinks,

    /// Set on forks only.
    pub parent: Option<RepositoryRef>,
}

/// Links attached to a repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryLinks {
    /// Clone URLs, named `https` and `ssh`.
    pub clone: Vec<Link>,

    pub avatar: Option<Link>,
}

impl RepositoryLinks {
    /// The clone URL named `name`.
    pub fn clone_url(&self, name: &str) -> Option<&str> {
        self.clone
            .iter()
            .find(|l| l.name.as_deref() == Some(name))
            .map(|l| l.href.as_str())
    }
}

/// Minimal reference to another repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryRef {
    pub full_name: String,
    pub uuid: Option<String>,
}

/// Project reference by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectKey {
    pub key: String,
}

/// Body for creating or updating a repository.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepositoryRequest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    pub scm: String,

    pub has_wiki: bool,

    pub has_issues: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    pub is_private: bool,

    pub fork_policy: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectKey>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<AvatarLinks>,
}

/// Writable part of a repository or project's links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvatarLinks {
    pub avatar: Link,
}

/// Body for `POST 2.0/repositories/{ws}/{slug}/forks`.
#[derive(Debug, Clone, Serialize)]
pub struct ForkRequest {
    #[serde(flatten)]
    pub repository: RepositoryRequest,

    /// Workspace receiving the fork.
    pub workspace: WorkspaceSlug,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceSlug {
    pub slug: String,
}

/// The pipelines switch, `2.0/repositories/{ws}/{slug}/pipelines_config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelinesConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// A repository access key, `2.0/repositories/{ws}/{slug}/deploy-keys`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployKey {
    /// Numeric key ID assigned by Bitbucket.
    pub id: Option<i64>,

    pub key: String,

    pub label: Option<String>,

    pub comment: Option<String>,
}

/// Body for adding or relabelling a deploy key.
#[derive(Debug, Clone, Serialize)]
pub struct DeployKeyRequest {
    pub key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_decodes_clone_links() {
        let json = r#"{
            "uuid": "{r-1}",
            "name": "demo",
            "full_name": "acme/demo",
            "slug": "demo",
            "scm": "git",
            "is_private": true,
            "fork_policy": "no_forks",
            "project": {"key": "OPS", "name": "Operations"},
            "links": {
                "clone": [
                    {"name": "https", "href": "https://bitbucket.org/acme/demo.git"},
                    {"name": "ssh", "href": "git@bitbucket.org:acme/demo.git"}
                ],
                "avatar": {"href": "https://bytebucket.org/ravatar/x"}
            }
        }"#;

        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.project.unwrap().key, "OPS");
        assert_eq!(
            repo.links.clone_url("ssh"),
            Some("git@bitbucket.org:acme/demo.git")
        );
        assert!(repo.parent.is_none());
    }

    #[test]
    fn test_fork_request_flattens_repository_fields() {
        let request = ForkRequest {
            repository: RepositoryRequest {
                name: "demo".to_string(),
                scm: "git".to_string(),
                fork_policy: "allow_forks".to_string(),
                ..Default::default()
            },
            workspace: WorkspaceSlug {
                slug: "mine".to_string(),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["name"], "demo");
        assert_eq!(value["workspace"]["slug"], "mine");
        assert!(value.get("description").is_none());
    }
}
