//
//  bitbucket-provider
//  resources/deploy_key.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_deploy_key`: a read-only access key on a repository. The
//! identifier is `workspace/repo/key-id`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::repositories::{DeployKey, DeployKeyRequest};
use crate::api::cloud::repository_path;
use crate::api::common::{ProviderError, Result};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

const ID_PATTERN: &str = "WORKSPACE/REPO/KEY-ID";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployKeyModel {
    pub workspace: String,
    pub repository: String,
    pub key: Option<String>,
    pub label: Option<String>,
    pub comment: Option<String>,
    pub key_id: Option<i64>,
}

impl DeployKeyModel {
    fn to_request(&self) -> DeployKeyRequest {
        DeployKeyRequest {
            key: self.key.clone().unwrap_or_default(),
            label: self.label.clone(),
        }
    }
}

fn keys_path(workspace: &str, repo: &str) -> String {
    format!("{}/deploy-keys", repository_path(workspace, repo))
}

/// `bitbucket_deploy_key`
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployKeyResource;

#[async_trait]
impl Resource for DeployKeyResource {
    type Model = DeployKeyModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_deploy_key"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required().force_new(),
            Field::string("repository").required().force_new(),
            Field::string("key").optional().force_new(),
            Field::string("label").optional(),
            Field::string("comment").computed(),
            Field::int("key_id").computed(),
        ])
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData<DeployKeyModel>) -> Result<()> {
        let model = &data.attributes;
        let request = model.to_request();
        tracing::debug!("Deploy Key Request: {request:?}");

        let created: DeployKey = ctx
            .client
            .post_json(&keys_path(&model.workspace, &model.repository), &request)
            .await?;
        let key_id = created.id.ok_or_else(|| {
            ProviderError::Validation("deploy key created without an id".to_string())
        })?;

        data.set_id(id::encode(&[
            &data.attributes.workspace,
            &data.attributes.repository,
            &key_id.to_string(),
        ]));
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<DeployKeyModel>) -> Result<()> {
        let [workspace, repo, key_id] = id::decode::<3>(data.require_id()?, ID_PATTERN)?;
        let path = format!("{}/{}", keys_path(&workspace, &repo), escape(&key_id));

        match ctx.client.get_optional::<DeployKey>(&path).await? {
            Some(remote) => {
                tracing::debug!("Deploy Key Response Decoded: {remote:?}");
                let model = &mut data.attributes;
                model.workspace = workspace;
                model.repository = repo;
                model.label = remote.label.filter(|l| !l.is_empty());
                model.comment = remote.comment;
                model.key_id = remote.id.or_else(|| key_id.parse().ok());
                if model.key.is_none() {
                    model.key = Some(remote.key);
                }
            }
            None => {
                tracing::warn!("Deploy Key ({path}) not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &DeployKeyModel,
        data: &mut ResourceData<DeployKeyModel>,
    ) -> Result<()> {
        let [workspace, repo, key_id] = id::decode::<3>(data.require_id()?, ID_PATTERN)?;
        ctx.client
            .put(
                &format!("{}/{}", keys_path(&workspace, &repo), escape(&key_id)),
                &data.attributes.to_request(),
            )
            .await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &ResourceData<DeployKeyModel>) -> Result<()> {
        let [workspace, repo, key_id] = id::decode::<3>(data.require_id()?, ID_PATTERN)?;
        ctx.client
            .delete(&format!("{}/{}", keys_path(&workspace, &repo), escape(&key_id)))
            .await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<DeployKeyModel>> {
        let [workspace, repository, key_id] = id::decode::<3>(raw, ID_PATTERN)?;
        let key_id = key_id.parse::<i64>().map_err(|_| ProviderError::InvalidId {
            id: raw.to_string(),
            expected: ID_PATTERN.to_string(),
        })?;
        Ok(ResourceData::with_id(
            raw,
            DeployKeyModel {
                workspace,
                repository,
                key_id: Some(key_id),
                ..Default::default()
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_requires_numeric_key_id() {
        let data = DeployKeyResource.import_state("acme/demo/42").unwrap();
        assert_eq!(data.attributes.key_id, Some(42));
        assert!(DeployKeyResource.import_state("acme/demo/abc").is_err());
    }

    #[test]
    fn test_key_id_is_computed() {
        let err = DeployKeyResource
            .schema()
            .validate(&serde_json::json!({"workspace": "a", "repository": "b", "key_id": 1}))
            .unwrap_err();
        assert!(err.to_string().contains("key_id"));
    }
}
