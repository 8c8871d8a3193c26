//
//  bitbucket-provider
//  api/legacy/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Bitbucket API v1.0 wire types.
//!
//! Groups and group membership have no 2.0 equivalent and are still managed
//! through `1.0/groups`. These endpoints return bare JSON arrays instead of
//! paginated envelopes, and group creation takes a form-encoded body.

pub mod groups;

pub use groups::{Group, GroupMember, GroupUpdate, GROUP_PERMISSIONS};

/// Path of the group list for `workspace`.
pub fn groups_path(workspace: &str) -> String {
    format!("1.0/groups/{}", crate::util::escape(workspace))
}

/// Path of one group.
pub fn group_path(workspace: &str, slug: &str) -> String {
    format!("{}/{}", groups_path(workspace), crate::util::escape(slug))
}
