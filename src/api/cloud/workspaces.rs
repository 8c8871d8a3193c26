//
//  bitbucket-provider
//  api/cloud/workspaces.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Workspace and project API types.
//!
//! Workspaces are the top-level containers for repositories and projects.
//! Projects group repositories inside a workspace and are addressed by key.

use serde::{Deserialize, Serialize};

use crate::api::cloud::repositories::AvatarLinks;
use crate::api::common::{Link, UserRef};

/// A workspace, `2.0/workspaces/{ws}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Workspace {
    pub uuid: String,
    pub slug: String,
    pub name: String,
    pub is_private: bool,
}

/// One entry of `2.0/workspaces/{ws}/members`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceMembership {
    pub user: UserRef,
}

/// A project, `2.0/workspaces/{ws}/projects/{key}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub uuid: String,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub has_publicly_visible_repos: bool,
    pub links: ProjectLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLinks {
    pub avatar: Option<Link>,
}

/// Body for creating or updating a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectRequest {
    pub key: String,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub is_private: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<AvatarLinks>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_decode_nested_user() {
        let member: WorkspaceMembership = serde_json::from_str(
            r#"{"type": "workspace_membership", "user": {"uuid": "{u}", "display_name": "Ada"}}"#,
        )
        .unwrap();
        assert_eq!(member.user.uuid.as_deref(), Some("{u}"));
    }

    #[test]
    fn test_project_decodes_avatar() {
        let project: Project = serde_json::from_str(
            r#"{"key": "OPS", "name": "Ops", "links": {"avatar": {"href": "https://a/x.png"}}}"#,
        )
        .unwrap();
        assert_eq!(project.links.avatar.unwrap().href, "https://a/x.png");
        assert!(!project.has_publicly_visible_repos);
    }
}
