//
//  bitbucket-provider
//  resources/group.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_group`: a workspace group managed through the 1.0 API.
//!
//! Creation takes a form-encoded `name`; Bitbucket derives the slug. There is
//! no single-group GET on this path, so reads list all groups of the workspace
//! and select by slug. The identifier is `workspace/slug`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::common::Result;
use crate::api::legacy::{group_path, groups_path, Group, GroupUpdate, GROUP_PERMISSIONS};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};

const ID_PATTERN: &str = "WORKSPACE/GROUP-SLUG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupModel {
    pub workspace: String,
    pub name: String,
    pub slug: Option<String>,
    pub auto_add: Option<bool>,
    pub permission: Option<String>,
}

impl GroupModel {
    fn apply(&mut self, workspace: String, group: Group) {
        self.workspace = workspace;
        self.name = group.name;
        self.slug = Some(group.slug);
        self.auto_add = Some(group.auto_add);
        self.permission = group.permission;
    }
}

/// `bitbucket_group`
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupResource;

#[async_trait]
impl Resource for GroupResource {
    type Model = GroupModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_group"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required().force_new(),
            Field::string("name").required(),
            Field::string("slug").computed(),
            Field::bool("auto_add").optional_computed(),
            Field::string("permission")
                .optional_computed()
                .one_of(GROUP_PERMISSIONS),
        ])
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData<GroupModel>) -> Result<()> {
        let workspace = data.attributes.workspace.clone();
        tracing::debug!("Group Request: name={}", data.attributes.name);

        let response = ctx
            .client
            .post_form(&groups_path(&workspace), &[("name", &data.attributes.name)])
            .await?;
        let created: Group = response.json()?;
        tracing::debug!("Group Response Decoded: {created:?}");

        data.set_id(id::encode(&[&workspace, &created.slug]));

        // The form endpoint only takes a name; the remaining settings need a PUT.
        if data.attributes.auto_add.is_some() || data.attributes.permission.is_some() {
            let update = GroupUpdate {
                name: data.attributes.name.clone(),
                auto_add: data.attributes.auto_add,
                permission: data.attributes.permission.clone(),
            };
            ctx.client
                .put(&format!("{}/", group_path(&workspace, &created.slug)), &update)
                .await?;
        }
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<GroupModel>) -> Result<()> {
        let [workspace, slug] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;

        let groups = ctx
            .client
            .get_optional::<Vec<Group>>(&format!("{}/", groups_path(&workspace)))
            .await?
            .unwrap_or_default();
        tracing::debug!("Groups Response Decoded: {groups:?}");

        match groups.into_iter().find(|g| g.slug == slug) {
            Some(group) => data.attributes.apply(workspace, group),
            None => {
                tracing::warn!("Group ({workspace}/{slug}) not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &GroupModel,
        data: &mut ResourceData<GroupModel>,
    ) -> Result<()> {
        let [workspace, slug] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        let update = GroupUpdate {
            name: data.attributes.name.clone(),
            auto_add: data.attributes.auto_add,
            permission: data.attributes.permission.clone(),
        };
        tracing::debug!("Group Request: {update:?}");

        ctx.client
            .put(&format!("{}/", group_path(&workspace, &slug)), &update)
            .await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &ResourceData<GroupModel>) -> Result<()> {
        let [workspace, slug] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        ctx.client.delete(&group_path(&workspace, &slug)).await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<GroupModel>> {
        let [workspace, slug] = id::decode::<2>(raw, ID_PATTERN)?;
        Ok(ResourceData::with_id(
            raw,
            GroupModel {
                workspace,
                slug: Some(slug),
                ..Default::default()
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_copies_remote_settings() {
        let mut model = GroupModel::default();
        model.apply(
            "acme".to_string(),
            Group {
                name: "Developers".to_string(),
                slug: "developers".to_string(),
                auto_add: true,
                permission: Some("write".to_string()),
                members: vec![],
            },
        );
        assert_eq!(model.slug.as_deref(), Some("developers"));
        assert_eq!(model.auto_add, Some(true));
        assert_eq!(model.permission.as_deref(), Some("write"));
    }

    #[test]
    fn test_permission_is_enumerated() {
        let schema = GroupResource.schema();
        assert!(schema
            .validate(&json!({"workspace": "acme", "name": "Devs", "permission": "owner"}))
            .is_err());
        assert!(schema
            .validate(&json!({"workspace": "acme", "name": "Devs", "slug": "devs"}))
            .is_err());
    }

    #[test]
    fn test_import_requires_two_segments() {
        assert!(GroupResource.import_state("acme/devs").is_ok());
        let err = GroupResource.import_state("acme").unwrap_err();
        assert!(err.to_string().contains(ID_PATTERN));
    }
}
