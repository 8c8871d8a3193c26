//
//  bitbucket-provider
//  resources/project.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_project`: a project inside a workspace. The identifier is
//! `owner/key`.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::cloud::workspace_path;
use crate::api::cloud::workspaces::{Project, ProjectRequest};
use crate::api::common::Result;
use crate::resources::repository::{link_field, LinkBlock};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

const ID_PATTERN: &str = "OWNER/PROJECT-KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectModel {
    pub owner: String,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub has_publicly_visible_repos: bool,
    pub uuid: Option<String>,
    pub link: Option<LinkBlock>,
}

impl ProjectModel {
    fn to_request(&self) -> ProjectRequest {
        ProjectRequest {
            key: self.key.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            is_private: self.is_private,
            links: self.link.as_ref().and_then(LinkBlock::to_request),
        }
    }

    fn apply(&mut self, owner: String, project: Project) {
        self.owner = owner;
        self.key = project.key;
        self.name = project.name;
        self.description = project.description.filter(|d| !d.is_empty());
        self.is_private = project.is_private;
        self.has_publicly_visible_repos = project.has_publicly_visible_repos;
        self.uuid = Some(project.uuid);
        self.link = LinkBlock::from_avatar(project.links.avatar.as_ref());
    }
}

/// Project keys start with a letter; letters, digits and underscores follow.
static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").unwrap());

fn projects_path(owner: &str) -> String {
    format!("{}/projects", workspace_path(owner))
}

fn project_path(owner: &str, key: &str) -> String {
    format!("{}/{}", projects_path(owner), escape(key))
}

/// `bitbucket_project`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectResource;

#[async_trait]
impl Resource for ProjectResource {
    type Model = ProjectModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_project"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("owner").required(),
            Field::string("key").required().matching(&KEY_PATTERN),
            Field::string("name").required(),
            Field::string("description").optional(),
            Field::bool("is_private").optional().default_value(json!(true)),
            Field::bool("has_publicly_visible_repos").computed(),
            Field::string("uuid").computed(),
            link_field(),
        ])
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData<ProjectModel>) -> Result<()> {
        let request = data.attributes.to_request();
        tracing::debug!("Project Request: {request:?}");

        let _: serde_json::Value = ctx
            .client
            .post_json(&format!("{}/", projects_path(&data.attributes.owner)), &request)
            .await?;
        tracing::info!("Created project {}", request.key);

        data.set_id(id::encode(&[&data.attributes.owner, &data.attributes.key]));
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<ProjectModel>) -> Result<()> {
        let [owner, key] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;

        match ctx.client.get_optional::<Project>(&project_path(&owner, &key)).await? {
            Some(project) => {
                tracing::debug!("Project Response Decoded: {project:?}");
                data.attributes.apply(owner, project);
            }
            None => {
                tracing::warn!("Project ({owner}/{key}) not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &ProjectModel,
        data: &mut ResourceData<ProjectModel>,
    ) -> Result<()> {
        let [owner, key] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        let request = data.attributes.to_request();
        ctx.client.put(&project_path(&owner, &key), &request).await?;

        // A changed key moves the project.
        data.set_id(id::encode(&[&data.attributes.owner, &data.attributes.key]));
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &ResourceData<ProjectModel>) -> Result<()> {
        let [owner, key] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        ctx.client.delete(&project_path(&owner, &key)).await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<ProjectModel>> {
        let [owner, key] = id::decode::<2>(raw, ID_PATTERN)?;
        Ok(ResourceData::with_id(
            raw,
            ProjectModel {
                owner,
                key,
                ..Default::default()
            },
        ))
    }
}
