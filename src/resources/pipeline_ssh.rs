//
//  bitbucket-provider
//  resources/pipeline_ssh.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pipelines SSH settings of a repository.
//!
//! - `bitbucket_pipeline_ssh_key`: the single key pair under
//!   `pipelines_config/ssh/key_pair`, identified by `workspace/repo`.
//! - `bitbucket_pipeline_ssh_known_host`: one trusted host under
//!   `pipelines_config/ssh/known_hosts/`, identified by `workspace/repo/uuid`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::pipelines::{KnownHost, KnownHostPublicKey, SshKeyPair, KNOWN_HOST_KEY_TYPES};
use crate::api::cloud::repository_path;
use crate::api::common::{ProviderError, Result};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

fn ssh_path(workspace: &str, repo: &str) -> String {
    format!("{}/pipelines_config/ssh", repository_path(workspace, repo))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSshKeyModel {
    pub workspace: String,
    pub repository: String,
    pub public_key: Option<String>,
    pub private_key: Option<String>,
}

impl PipelineSshKeyModel {
    fn key_pair_path(&self) -> String {
        format!("{}/key_pair", ssh_path(&self.workspace, &self.repository))
    }

    fn to_request(&self) -> SshKeyPair {
        SshKeyPair {
            private_key: self.private_key.clone(),
            public_key: self.public_key.clone(),
        }
    }
}

/// `bitbucket_pipeline_ssh_key`
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineSshKeyResource;

impl PipelineSshKeyResource {
    async fn put(&self, ctx: &ProviderContext, data: &mut ResourceData<PipelineSshKeyModel>) -> Result<()> {
        let model = &data.attributes;
        tracing::debug!("Pipeline SSH Key Request for {}/{}", model.workspace, model.repository);
        ctx.client.put(&model.key_pair_path(), &model.to_request()).await?;

        data.set_id(id::encode(&[&data.attributes.workspace, &data.attributes.repository]));
        self.read(ctx, data).await
    }
}

#[async_trait]
impl Resource for PipelineSshKeyResource {
    type Model = PipelineSshKeyModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_pipeline_ssh_key"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required().force_new(),
            Field::string("repository").required().force_new(),
            Field::string("public_key").optional(),
            Field::string("private_key").optional().sensitive(),
        ])
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<PipelineSshKeyModel>,
    ) -> Result<()> {
        self.put(ctx, data).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<PipelineSshKeyModel>,
    ) -> Result<()> {
        let [workspace, repository] = id::decode::<2>(data.require_id()?, "WORKSPACE/REPO")?;
        data.attributes.workspace = workspace;
        data.attributes.repository = repository;

        match ctx
            .client
            .get_optional::<SshKeyPair>(&data.attributes.key_pair_path())
            .await?
        {
            // The private half is never returned.
            Some(pair) => data.attributes.public_key = pair.public_key,
            None => {
                tracing::warn!("Pipeline SSH Key not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &PipelineSshKeyModel,
        data: &mut ResourceData<PipelineSshKeyModel>,
    ) -> Result<()> {
        self.put(ctx, data).await
    }

    async fn delete(
        &self,
        ctx: &ProviderContext,
        data: &ResourceData<PipelineSshKeyModel>,
    ) -> Result<()> {
        let [workspace, repository] = id::decode::<2>(data.require_id()?, "WORKSPACE/REPO")?;
        ctx.client
            .delete(&format!("{}/key_pair", ssh_path(&workspace, &repository)))
            .await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<PipelineSshKeyModel>> {
        let [workspace, repository] = id::decode::<2>(raw, "WORKSPACE/REPO")?;
        Ok(ResourceData::with_id(
            raw,
            PipelineSshKeyModel {
                workspace,
                repository,
                ..Default::default()
            },
        ))
    }
}

const KNOWN_HOST_ID_PATTERN: &str = "WORKSPACE/REPO/KNOWN-HOST-UUID";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSshKnownHostModel {
    pub workspace: String,
    pub repository: String,
    pub hostname: String,
    pub public_key: PublicKeyBlock,
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicKeyBlock {
    pub key_type: String,
    pub key: String,
    pub md5_fingerprint: Option<String>,
    pub sha256_fingerprint: Option<String>,
}

impl PipelineSshKnownHostModel {
    fn to_request(&self) -> KnownHost {
        KnownHost {
            uuid: None,
            hostname: self.hostname.clone(),
            public_key: KnownHostPublicKey {
                key_type: self.public_key.key_type.clone(),
                key: self.public_key.key.clone(),
                ..Default::default()
            },
        }
    }

    fn apply(&mut self, host: KnownHost) {
        self.hostname = host.hostname;
        self.uuid = host.uuid;
        self.public_key = PublicKeyBlock {
            key_type: host.public_key.key_type,
            key: host.public_key.key,
            md5_fingerprint: host.public_key.md5_fingerprint,
            sha256_fingerprint: host.public_key.sha256_fingerprint,
        };
    }
}

fn known_host_path(workspace: &str, repo: &str, uuid: &str) -> String {
    format!("{}/known_hosts/{}", ssh_path(workspace, repo), escape(uuid))
}

/// `bitbucket_pipeline_ssh_known_host`
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineSshKnownHostResource;

#[async_trait]
impl Resource for PipelineSshKnownHostResource {
    type Model = PipelineSshKnownHostModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_pipeline_ssh_known_host"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required().force_new(),
            Field::string("repository").required().force_new(),
            Field::string("hostname").required(),
            Field::block(
                "public_key",
                vec![
                    Field::string("key_type")
                        .required()
                        .one_of(KNOWN_HOST_KEY_TYPES),
                    Field::string("key").required(),
                    Field::string("md5_fingerprint").computed(),
                    Field::string("sha256_fingerprint").computed(),
                ],
            )
            .required(),
            Field::string("uuid").computed(),
        ])
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<PipelineSshKnownHostModel>,
    ) -> Result<()> {
        let model = &data.attributes;
        let request = model.to_request();
        tracing::debug!("Pipeline SSH Known Host Request: {request:?}");

        let created: KnownHost = ctx
            .client
            .post_json(
                &format!("{}/known_hosts/", ssh_path(&model.workspace, &model.repository)),
                &request,
            )
            .await?;
        let uuid = created.uuid.filter(|u| !u.is_empty()).ok_or_else(|| {
            ProviderError::Validation(format!("known host {} created without a uuid", request.hostname))
        })?;

        data.set_id(id::encode(&[
            &data.attributes.workspace,
            &data.attributes.repository,
            &uuid,
        ]));
        self.read(ctx, data).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<PipelineSshKnownHostModel>,
    ) -> Result<()> {
        let [workspace, repo, uuid] = id::decode::<3>(data.require_id()?, KNOWN_HOST_ID_PATTERN)?;
        let path = known_host_path(&workspace, &repo, &uuid);

        match ctx.client.get_optional::<KnownHost>(&path).await? {
            Some(host) => {
                tracing::debug!("Pipeline SSH Known Host Response Decoded: {host:?}");
                data.attributes.workspace = workspace;
                data.attributes.repository = repo;
                data.attributes.apply(host);
            }
            None => {
                tracing::warn!("Pipeline SSH Known Host ({path}) not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &PipelineSshKnownHostModel,
        data: &mut ResourceData<PipelineSshKnownHostModel>,
    ) -> Result<()> {
        let [workspace, repo, uuid] = id::decode::<3>(data.require_id()?, KNOWN_HOST_ID_PATTERN)?;
        ctx.client
            .put(
                &known_host_path(&workspace, &repo, &uuid),
                &data.attributes.to_request(),
            )
            .await?;
        self.read(ctx, data).await
    }

    async fn delete(
        &self,
        ctx: &ProviderContext,
        data: &ResourceData<PipelineSshKnownHostModel>,
    ) -> Result<()> {
        let [workspace, repo, uuid] = id::decode::<3>(data.require_id()?, KNOWN_HOST_ID_PATTERN)?;
        ctx.client
            .delete(&known_host_path(&workspace, &repo, &uuid))
            .await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<PipelineSshKnownHostModel>> {
        let [workspace, repository, uuid] = id::decode::<3>(raw, KNOWN_HOST_ID_PATTERN)?;
        Ok(ResourceData::with_id(
            raw,
            PipelineSshKnownHostModel {
                workspace,
                repository,
                uuid: Some(uuid),
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
    fn test_key_pair_path() {
        let model = PipelineSshKeyModel {
            workspace: "acme".to_string(),
            repository: "demo".to_string(),
            ..Default::default()
        };
        assert_eq!(
            model.key_pair_path(),
            "2.0/repositories/acme/demo/pipelines_config/ssh/key_pair"
        );
    }

    #[test]
    fn test_known_host_key_type_is_enumerated() {
        let schema = PipelineSshKnownHostResource.schema();
        let config = |key_type: &str| {
            json!({
                "workspace": "acme",
                "repository": "demo",
                "hostname": "example.com",
                "public_key": {"key_type": key_type, "key": "AAAA"}
            })
        };
        assert!(schema.validate(&config("RSA")).is_ok());
        assert!(schema.validate(&config("rsa")).is_err());
    }

    #[test]
    fn test_known_host_request_skips_fingerprints() {
        let model = PipelineSshKnownHostModel {
            hostname: "example.com".to_string(),
            public_key: PublicKeyBlock {
                key_type: "Ed25519".to_string(),
                key: "AAAA".to_string(),
                md5_fingerprint: Some("md5".to_string()),
                sha256_fingerprint: Some("sha".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(model.to_request()).unwrap(),
            json!({"hostname": "example.com", "public_key": {"key_type": "Ed25519", "key": "AAAA"}})
        );
    }
}
