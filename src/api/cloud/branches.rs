//
//  bitbucket-provider
//  api/cloud/branches.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Branch permission API types.
//!
//! - Branch restrictions: `2.0/repositories/{ws}/{slug}/branch-restrictions`
//! - Branching model: `2.0/repositories/{ws}/{slug}/branching-model`, written
//!   through `.../branching-model/settings`

use serde::{Deserialize, Serialize};

/// Restriction kinds Bitbucket accepts.
pub const RESTRICTION_KINDS: &[&str] = &[
    "require_tasks_to_be_completed",
    "allow_auto_merge_when_builds_pass",
    "require_passing_builds_to_merge",
    "force",
    "require_all_dependencies_merged",
    "require_commits_behind",
    "restrict_merges",
    "enforce_merge_checks",
    "reset_pullrequest_changes_requested_on_change",
    "require_no_changes_requested",
    "smart_reset_pullrequest_approvals",
    "push",
    "require_approvals_to_merge",
    "require_default_reviewer_approvals_to_merge",
    "reset_pullrequest_approvals_on_change",
    "delete",
];

pub const BRANCH_MATCH_KINDS: &[&str] = &["branching_model", "glob"];

/// Branch types a restriction may target when matching by branching model.
pub const RESTRICTION_BRANCH_TYPES: &[&str] = &[
    "feature",
    "bugfix",
    "release",
    "hotfix",
    "development",
    "production",
];

/// Branch type kinds the branching model configures prefixes for.
pub const MODEL_BRANCH_KINDS: &[&str] = &["feature", "bugfix", "release", "hotfix"];

/// One branch restriction rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchRestriction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_match_kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,

    #[serde(default)]
    pub users: Vec<RestrictionUser>,

    #[serde(default)]
    pub groups: Vec<RestrictionGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestrictionUser {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestrictionGroup {
    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub owner: RestrictionUser,
}

/// Repository branching model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchingModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development: Option<BranchModelBranch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<BranchModelBranch>,

    #[serde(default)]
    pub branch_types: Vec<BranchTypeSetting>,
}

/// The development or production branch of a branching model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchModelBranch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub use_mainbranch: bool,

    #[serde(default)]
    pub branch_does_not_exist: bool,

    #[serde(default, skip_serializing)]
    pub is_valid: bool,

    /// Production only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Prefix configuration for one branch type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchTypeSetting {
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default)]
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::PaginatedResponse;

    #[test]
    fn test_restriction_list_keeps_kind_and_value() {
        let json = r#"{
            "pagelen": 10,
            "page": 1,
            "size": 1,
            "values": [{
                "id": 42,
                "kind": "require_approvals_to_merge",
                "branch_match_kind": "glob",
                "pattern": "main",
                "value": 2,
                "users": [],
                "groups": [{"slug": "devs", "owner": {"username": "acme"}}]
            }]
        }"#;

        let page: PaginatedResponse<BranchRestriction> = serde_json::from_str(json).unwrap();
        let rule = &page.values[0];
        assert_eq!(rule.kind, "require_approvals_to_merge");
        assert_eq!(rule.value, Some(2));
        assert_eq!(rule.id, Some(42));
        assert_eq!(rule.groups[0].owner.username, "acme");
        assert!(!page.has_next());
    }

    #[test]
    fn test_is_valid_is_never_sent() {
        let branch = BranchModelBranch {
            name: Some("develop".to_string()),
            is_valid: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&branch).unwrap();
        assert!(value.get("is_valid").is_none());
        assert!(value.get("enabled").is_none());
    }
}
