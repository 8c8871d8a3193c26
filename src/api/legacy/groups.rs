//
//  bitbucket-provider
//  api/legacy/groups.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Group API types, `1.0/groups/{ws}[/{slug}[/members[/{uuid}]]]`.

use serde::{Deserialize, Serialize};

pub const GROUP_PERMISSIONS: &[&str] = &["read", "write", "admin"];

/// A workspace group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub name: String,
    pub slug: String,
    pub auto_add: bool,
    /// Default repository permission; `null` when none is granted.
    pub permission: Option<String>,
    pub members: Vec<GroupMember>,
}

/// A group member as listed by `.../members`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMember {
    pub uuid: String,
    pub display_name: Option<String>,
    pub nickname: Option<String>,
    pub account_id: Option<String>,
}

/// Body for `PUT 1.0/groups/{ws}/{slug}/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupUpdate {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_add: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}
