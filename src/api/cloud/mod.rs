//
//  bitbucket-provider
//  api/cloud/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Bitbucket Cloud API v2.0 wire types.
//!
//! Request and response shapes, organized by resource family:
//!
//! - [`repositories`] - repositories, forks, pipeline enablement and deploy keys
//! - [`hooks`] - repository and workspace webhooks, hook event catalogues
//! - [`branches`] - branch restrictions and the branching model
//! - [`pipelines`] - pipeline variables, SSH key pair, known hosts and schedules
//! - [`deployments`] - deployment environments
//! - [`workspaces`] - workspaces, projects and memberships
//! - [`users`] - users and SSH keys
//! - [`ip_ranges`] - the Atlassian IP range document
//!
//! Response types are lenient: every optional field defaults, so partial
//! payloads from the API still decode. Request types skip unset fields.

pub mod branches;
pub mod deployments;
pub mod hooks;
pub mod ip_ranges;
pub mod pipelines;
pub mod repositories;
pub mod users;
pub mod workspaces;

/// Path prefix for one repository, with both segments escaped.
pub fn repository_path(workspace: &str, repo: &str) -> String {
    format!(
        "2.0/repositories/{}/{}",
        crate::util::escape(workspace),
        crate::util::escape(repo)
    )
}

/// Path prefix for one workspace.
pub fn workspace_path(workspace: &str) -> String {
    format!("2.0/workspaces/{}", crate::util::escape(workspace))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_escape_segments() {
        assert_eq!(repository_path("acme", "demo"), "2.0/repositories/acme/demo");
        assert_eq!(workspace_path("a/b"), "2.0/workspaces/a%2Fb");
    }
}
