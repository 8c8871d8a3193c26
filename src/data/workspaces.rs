//
//  bitbucket-provider
//  data/workspaces.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Workspace lookups: the workspace itself, its members and its pipelines
//! OpenID Connect documents.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::workspace_path;
use crate::api::cloud::workspaces::{Workspace, WorkspaceMembership};
use crate::api::common::{collect_pages, Result};
use crate::data::DataSource;
use crate::resources::{ProviderContext, ResourceData};
use crate::schema::{Field, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceModel {
    pub workspace: String,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub is_private: bool,
}

/// `bitbucket_workspace`. The identifier is the workspace UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceDataSource;

#[async_trait]
impl DataSource for WorkspaceDataSource {
    type Model = WorkspaceModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_workspace"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required().describe("slug or UUID"),
            Field::string("slug").computed(),
            Field::string("name").computed(),
            Field::bool("is_private").computed(),
        ])
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<WorkspaceModel>) -> Result<()> {
        let workspace: Workspace = ctx
            .client
            .get_json(&workspace_path(&data.attributes.workspace))
            .await?;
        tracing::debug!("Workspace Response Decoded: {workspace:?}");

        data.set_id(workspace.uuid);
        let model = &mut data.attributes;
        model.slug = Some(workspace.slug);
        model.name = Some(workspace.name);
        model.is_private = workspace.is_private;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceMembersModel {
    pub workspace: String,
    /// Member UUIDs.
    pub members: BTreeSet<String>,
}

/// `bitbucket_workspace_members`
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceMembersDataSource;

#[async_trait]
impl DataSource for WorkspaceMembersDataSource {
    type Model = WorkspaceMembersModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_workspace_members"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required(),
            Field::string_set("members").computed(),
        ])
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<WorkspaceMembersModel>,
    ) -> Result<()> {
        let workspace = data.attributes.workspace.clone();
        let path = format!("{}/members", workspace_path(&workspace));
        let members: Vec<WorkspaceMembership> = collect_pages(&ctx.client, &path).await?;

        data.attributes.members = members.into_iter().filter_map(|m| m.user.uuid).collect();
        data.set_id(workspace);
        Ok(())
    }
}

fn oidc_path(workspace: &str, document: &str) -> String {
    format!(
        "{}/pipelines-config/identity/oidc/{document}",
        workspace_path(workspace)
    )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcConfigModel {
    pub workspace: String,
    /// Raw JSON of the OpenID configuration document.
    pub oidc_config: Option<String>,
}

/// `bitbucket_pipeline_oidc_config`
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOidcConfigDataSource;

#[async_trait]
impl DataSource for PipelineOidcConfigDataSource {
    type Model = OidcConfigModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_pipeline_oidc_config"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required(),
            Field::string("oidc_config").computed(),
        ])
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<OidcConfigModel>) -> Result<()> {
        let workspace = data.attributes.workspace.clone();
        let body = ctx
            .client
            .get_text(&oidc_path(&workspace, ".well-known/openid-configuration"))
            .await?;

        data.attributes.oidc_config = Some(body);
        data.set_id(workspace);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcKeysModel {
    pub workspace: String,
    /// Raw JSON of the key set.
    pub keys: Option<String>,
}

/// `bitbucket_pipeline_oidc_config_keys`
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOidcConfigKeysDataSource;

#[async_trait]
impl DataSource for PipelineOidcConfigKeysDataSource {
    type Model = OidcKeysModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_pipeline_oidc_config_keys"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required(),
            Field::string("keys").computed().sensitive(),
        ])
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<OidcKeysModel>) -> Result<()> {
        let workspace = data.attributes.workspace.clone();
        let body = ctx.client.get_text(&oidc_path(&workspace, "keys.json")).await?;

        data.attributes.keys = Some(body);
        data.set_id(workspace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oidc_paths() {
        assert_eq!(
            oidc_path("acme", "keys.json"),
            "2.0/workspaces/acme/pipelines-config/identity/oidc/keys.json"
        );
    }
}
