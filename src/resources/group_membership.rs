//
//  bitbucket-provider
//  resources/group_membership.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_group_membership`: one user in one group.
//!
//! Every attribute forces replacement, so there is no update. The identifier is
//! `workspace/group_slug/uuid`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::common::{ProviderError, Result};
use crate::api::legacy::{group_path, GroupMember};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

const ID_PATTERN: &str = "WORKSPACE/GROUP-SLUG/MEMBER-UUID";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMembershipModel {
    pub workspace: String,
    pub group_slug: String,
    pub uuid: String,
    /// Slug of the group as reported back by the member listing.
    pub slug: Option<String>,
}

fn members_path(workspace: &str, group_slug: &str) -> String {
    format!("{}/members", group_path(workspace, group_slug))
}

fn changed_fields(prior: &GroupMembershipModel, planned: &GroupMembershipModel) -> Vec<String> {
    [
        ("workspace", prior.workspace != planned.workspace),
        ("group_slug", prior.group_slug != planned.group_slug),
        ("uuid", prior.uuid != planned.uuid),
    ]
    .into_iter()
    .filter(|(_, changed)| *changed)
    .map(|(name, _)| name.to_string())
    .collect()
}

/// `bitbucket_group_membership`
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupMembershipResource;

#[async_trait]
impl Resource for GroupMembershipResource {
    type Model = GroupMembershipModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_group_membership"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required().force_new(),
            Field::string("group_slug").required().force_new(),
            Field::string("uuid").required().force_new(),
            Field::string("slug").computed(),
        ])
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<GroupMembershipModel>,
    ) -> Result<()> {
        let model = &data.attributes;
        let path = format!(
            "{}/{}",
            members_path(&model.workspace, &model.group_slug),
            escape(&model.uuid)
        );
        ctx.client.put_empty(&path).await?;
        tracing::info!("Added {} to group {}", model.uuid, model.group_slug);

        data.set_id(id::encode(&[
            &data.attributes.workspace,
            &data.attributes.group_slug,
            &data.attributes.uuid,
        ]));
        self.read(ctx, data).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<GroupMembershipModel>,
    ) -> Result<()> {
        let [workspace, group_slug, uuid] = id::decode::<3>(data.require_id()?, ID_PATTERN)?;

        let members = ctx
            .client
            .get_optional::<Vec<GroupMember>>(&members_path(&workspace, &group_slug))
            .await?
            .unwrap_or_default();
        tracing::debug!("Group Members Response Decoded: {members:?}");

        if members.iter().any(|m| m.uuid == uuid) {
            data.attributes.slug = Some(group_slug.clone());
            data.attributes.workspace = workspace;
            data.attributes.group_slug = group_slug;
            data.attributes.uuid = uuid;
        } else {
            tracing::warn!("Group Member ({uuid}) not found in {group_slug}, removing from state");
            data.clear_id();
        }
        Ok(())
    }

    /// Nothing about a membership can change in place; an unchanged
    /// configuration only refreshes it.
    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &GroupMembershipModel,
        data: &mut ResourceData<GroupMembershipModel>,
    ) -> Result<()> {
        let changed = changed_fields(prior, &data.attributes);
        if !changed.is_empty() {
            return Err(ProviderError::RequiresReplacement(changed));
        }
        self.read(ctx, data).await
    }

    async fn delete(
        &self,
        ctx: &ProviderContext,
        data: &ResourceData<GroupMembershipModel>,
    ) -> Result<()> {
        let [workspace, group_slug, uuid] = id::decode::<3>(data.require_id()?, ID_PATTERN)?;
        ctx.client
            .delete(&format!(
                "{}/{}",
                members_path(&workspace, &group_slug),
                escape(&uuid)
            ))
            .await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<GroupMembershipModel>> {
        let [workspace, group_slug, uuid] = id::decode::<3>(raw, ID_PATTERN)?;
        Ok(ResourceData::with_id(
            raw,
            GroupMembershipModel {
                workspace,
                group_slug,
                uuid,
                slug: None,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_input_forces_replacement() {
        let schema = GroupMembershipResource.schema();
        let prior = json!({"workspace": "acme", "group_slug": "devs", "uuid": "{a}"});
        let planned = json!({"workspace": "acme", "group_slug": "ops", "uuid": "{b}"});
        assert_eq!(
            schema.requires_replacement(&prior, &planned),
            vec!["group_slug", "uuid"]
        );
    }

    #[test]
    fn test_changed_fields_names_only_what_moved() {
        let prior = GroupMembershipModel {
            workspace: "acme".to_string(),
            group_slug: "devs".to_string(),
            uuid: "{a}".to_string(),
            slug: Some("devs".to_string()),
        };
        let same = GroupMembershipModel {
            slug: None,
            ..prior.clone()
        };
        assert!(changed_fields(&prior, &same).is_empty());

        let moved = GroupMembershipModel {
            uuid: "{b}".to_string(),
            ..prior.clone()
        };
        assert_eq!(changed_fields(&prior, &moved), vec!["uuid"]);
    }

    #[test]
    fn test_import_decodes_three_segments() {
        let data = GroupMembershipResource.import_state("acme/devs/{u}").unwrap();
        assert_eq!(data.attributes.group_slug, "devs");
        assert_eq!(data.attributes.uuid, "{u}");
        assert!(GroupMembershipResource.import_state("acme/devs").is_err());
    }
}
