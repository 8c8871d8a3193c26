//
//  bitbucket-provider
//  data/groups.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Group lookups over the 1.0 API: one group, all groups of a workspace, and
//! the members of a group.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::common::Result;
use crate::api::legacy::{group_path, groups_path, Group, GroupMember};
use crate::data::DataSource;
use crate::resources::{id, ProviderContext, ResourceData};
use crate::schema::{Field, Schema};

fn group_summary_fields() -> Vec<Field> {
    vec![
        Field::string("name").computed(),
        Field::string("slug").computed(),
        Field::bool("auto_add").computed(),
        Field::string("permission").computed(),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSummary {
    pub name: String,
    pub slug: String,
    pub auto_add: bool,
    pub permission: Option<String>,
}

impl From<Group> for GroupSummary {
    fn from(group: Group) -> Self {
        Self {
            name: group.name,
            slug: group.slug,
            auto_add: group.auto_add,
            permission: group.permission,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupLookupModel {
    pub workspace: String,
    pub slug: String,
    pub name: Option<String>,
    pub auto_add: bool,
    pub permission: Option<String>,
}

/// `bitbucket_group`
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupDataSource;

#[async_trait]
impl DataSource for GroupDataSource {
    type Model = GroupLookupModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_group"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required(),
            Field::string("slug").required(),
            Field::string("name").computed(),
            Field::bool("auto_add").computed(),
            Field::string("permission").computed(),
        ])
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<GroupLookupModel>) -> Result<()> {
        let model = &data.attributes;
        let group: Group = ctx
            .client
            .get_json(&group_path(&model.workspace, &model.slug))
            .await?;
        tracing::debug!("Group Response Decoded: {group:?}");

        let id = id::encode(&[&model.workspace, &model.slug]);
        let model = &mut data.attributes;
        model.name = Some(group.name);
        model.auto_add = group.auto_add;
        model.permission = group.permission;
        data.set_id(id);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupsModel {
    pub workspace: String,
    pub groups: Vec<GroupSummary>,
}

/// `bitbucket_groups`
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupsDataSource;

#[async_trait]
impl DataSource for GroupsDataSource {
    type Model = GroupsModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_groups"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required(),
            Field::block_list("groups", group_summary_fields(), None).computed(),
        ])
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<GroupsModel>) -> Result<()> {
        let workspace = data.attributes.workspace.clone();
        let groups: Vec<Group> = ctx.client.get_json(&groups_path(&workspace)).await?;

        data.attributes.groups = groups.into_iter().map(GroupSummary::from).collect();
        data.set_id(workspace);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMembersModel {
    pub workspace: String,
    pub slug: String,
    /// Member UUIDs.
    pub members: BTreeSet<String>,
}

/// `bitbucket_group_members`
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupMembersDataSource;

#[async_trait]
impl DataSource for GroupMembersDataSource {
    type Model = GroupMembersModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_group_members"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required(),
            Field::string("slug").required(),
            Field::string_set("members").computed(),
        ])
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<GroupMembersModel>) -> Result<()> {
        let model = &data.attributes;
        let path = format!("{}/members", group_path(&model.workspace, &model.slug));
        let members: Vec<GroupMember> = ctx.client.get_json(&path).await?;

        let id = id::encode(&[&model.workspace, &model.slug]);
        data.attributes.members = members.into_iter().map(|m| m.uuid).collect();
        data.set_id(id);
        Ok(())
    }
}
