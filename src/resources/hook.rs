//
//  bitbucket-provider
//  resources/hook.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_hook` and `bitbucket_workspace_hook`.
//!
//! The identifier of both is the hook UUID alone; the owning repository or
//! workspace is kept in the attributes. Import takes the full path,
//! `OWNER/REPO/HOOK-ID` or `WORKSPACE/HOOK-ID`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::cloud::hooks::{Webhook, HOOK_EVENTS};
use crate::api::cloud::{repository_path, workspace_path};
use crate::api::common::{ProviderError, Result};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

/// Settings shared by repository and workspace hooks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookSettings {
    pub url: String,
    pub description: String,
    pub active: bool,
    pub skip_cert_verification: bool,
    pub events: BTreeSet<String>,
    pub uuid: Option<String>,
}

impl HookSettings {
    fn to_request(&self) -> Webhook {
        Webhook {
            uuid: None,
            url: self.url.clone(),
            description: self.description.clone(),
            active: self.active,
            skip_cert_verification: self.skip_cert_verification,
            events: self.events.iter().cloned().collect(),
        }
    }

    fn apply(&mut self, hook: Webhook) {
        self.url = hook.url;
        self.description = hook.description;
        self.active = hook.active;
        self.skip_cert_verification = hook.skip_cert_verification;
        self.events = hook.events.into_iter().collect();
        self.uuid = hook.uuid;
    }
}

fn hook_fields() -> Vec<Field> {
    vec![
        Field::string("url").required(),
        Field::string("description").required(),
        Field::bool("active").optional().default_value(json!(true)),
        Field::bool("skip_cert_verification")
            .optional()
            .default_value(json!(true)),
        Field::string_set("events").required().one_of(HOOK_EVENTS),
        Field::string("uuid").computed(),
    ]
}

async fn create_hook(ctx: &ProviderContext, hooks_path: &str, settings: &HookSettings) -> Result<String> {
    let request = settings.to_request();
    tracing::debug!("Hook Request: {request:?}");
    let hook: Webhook = ctx.client.post_json(hooks_path, &request).await?;
    hook.uuid
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ProviderError::Validation("hook created without a uuid".to_string()))
}

/// Reads one hook into `settings`. `false` when the hook is gone.
async fn read_hook(ctx: &ProviderContext, hook_path: &str, settings: &mut HookSettings) -> Result<bool> {
    match ctx.client.get_optional::<Webhook>(hook_path).await? {
        Some(hook) => {
            settings.apply(hook);
            Ok(true)
        }
        None => {
            tracing::warn!("Hook ({hook_path}) not found, removing from state");
            Ok(false)
        }
    }
}

/// `bitbucket_hook`
#[derive(Debug, Clone, Copy, Default)]
pub struct HookResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookModel {
    pub owner: String,
    pub repository: String,
    #[serde(flatten)]
    pub hook: HookSettings,
}

impl HookModel {
    fn hooks_path(&self) -> String {
        format!("{}/hooks", repository_path(&self.owner, &self.repository))
    }
}

#[async_trait]
impl Resource for HookResource {
    type Model = HookModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_hook"
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![
            Field::string("owner").required().force_new(),
            Field::string("repository").required().force_new(),
        ];
        fields.extend(hook_fields());
        Schema::new(fields)
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData<HookModel>) -> Result<()> {
        let uuid = create_hook(ctx, &data.attributes.hooks_path(), &data.attributes.hook).await?;
        data.set_id(uuid);
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<HookModel>) -> Result<()> {
        let path = format!("{}/{}", data.attributes.hooks_path(), escape(data.require_id()?));
        if !read_hook(ctx, &path, &mut data.attributes.hook).await? {
            data.clear_id();
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &HookModel,
        data: &mut ResourceData<HookModel>,
    ) -> Result<()> {
        let path = format!("{}/{}", data.attributes.hooks_path(), escape(data.require_id()?));
        ctx.client.put(&path, &data.attributes.hook.to_request()).await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &ResourceData<HookModel>) -> Result<()> {
        let path = format!("{}/{}", data.attributes.hooks_path(), escape(data.require_id()?));
        ctx.client.delete(&path).await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<HookModel>> {
        let [owner, repository, uuid] = id::decode::<3>(raw, "OWNER/REPO/HOOK-ID")?;
        Ok(ResourceData::with_id(
            uuid,
            HookModel {
                owner,
                repository,
                ..Default::default()
            },
        ))
    }
}

/// `bitbucket_workspace_hook`
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceHookResource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceHookModel {
    pub workspace: String,
    #[serde(flatten)]
    pub hook: HookSettings,
}

impl WorkspaceHookModel {
    fn hooks_path(&self) -> String {
        format!("{}/hooks", workspace_path(&self.workspace))
    }
}

#[async_trait]
impl Resource for WorkspaceHookResource {
    type Model = WorkspaceHookModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_workspace_hook"
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![Field::string("workspace").required().force_new()];
        fields.extend(hook_fields());
        Schema::new(fields)
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<WorkspaceHookModel>,
    ) -> Result<()> {
        let uuid = create_hook(ctx, &data.attributes.hooks_path(), &data.attributes.hook).await?;
        data.set_id(uuid);
        self.read(ctx, data).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<WorkspaceHookModel>,
    ) -> Result<()> {
        let path = format!("{}/{}", data.attributes.hooks_path(), escape(data.require_id()?));
        if !read_hook(ctx, &path, &mut data.attributes.hook).await? {
            data.clear_id();
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &WorkspaceHookModel,
        data: &mut ResourceData<WorkspaceHookModel>,
    ) -> Result<()> {
        let path = format!("{}/{}", data.attributes.hooks_path(), escape(data.require_id()?));
        ctx.client.put(&path, &data.attributes.hook.to_request()).await?;
        self.read(ctx, data).await
    }

    async fn delete(
        &self,
        ctx: &ProviderContext,
        data: &ResourceData<WorkspaceHookModel>,
    ) -> Result<()> {
        let path = format!("{}/{}", data.attributes.hooks_path(), escape(data.require_id()?));
        ctx.client.delete(&path).await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<WorkspaceHookModel>> {
        let [workspace, uuid] = id::decode::<2>(raw, "WORKSPACE/HOOK-ID")?;
        Ok(ResourceData::with_id(
            uuid,
            WorkspaceHookModel {
                workspace,
                ..Default::default()
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_event_is_rejected() {
        let err = HookResource
            .schema()
            .validate(&json!({
                "owner": "acme",
                "repository": "demo",
                "url": "https://ci.example.com",
                "description": "ci",
                "events": ["repo:push", "repo:teleport"]
            }))
            .unwrap_err();
        assert!(err.to_string().contains("repo:teleport"));
    }

    #[test]
    fn test_defaults_and_flattened_settings() {
        let config = HookResource
            .schema()
            .validate(&json!({
                "owner": "acme",
                "repository": "demo",
                "url": "https://ci.example.com",
                "description": "ci",
                "events": ["repo:push"]
            }))
            .unwrap();
        let model: HookModel = serde_json::from_value(config).unwrap();
        assert!(model.hook.active);
        assert!(model.hook.skip_cert_verification);
        assert!(model.hook.events.contains("repo:push"));
    }

    #[test]
    fn test_import_splits_owner_repo_and_uuid() {
        let data = HookResource.import_state("acme/demo/{h-1}").unwrap();
        assert_eq!(data.id(), Some("{h-1}"));
        assert_eq!(data.attributes.repository, "demo");

        let err = HookResource.import_state("acme/{h-1}").unwrap_err();
        assert!(err.to_string().contains("OWNER/REPO/HOOK-ID"));

        let data = WorkspaceHookResource.import_state("acme/{h-2}").unwrap();
        assert_eq!(data.attributes.workspace, "acme");
    }
}
