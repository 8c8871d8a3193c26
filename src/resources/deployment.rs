//
//  bitbucket-provider
//  resources/deployment.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_deployment`: a deployment environment of a repository.
//!
//! The identifier is `workspace/repo:environment-uuid`, the same reference
//! deployment variables take in their `deployment` attribute.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::deployments::{
    Environment, EnvironmentChange, EnvironmentChangeFields, EnvironmentType, DEPLOYMENT_STAGES,
};
use crate::api::cloud::repository_path;
use crate::api::common::{ProviderError, Result};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentModel {
    /// `workspace/repo`
    pub repository: String,
    pub name: String,
    pub stage: String,
    pub uuid: Option<String>,
}

fn environments_path(workspace: &str, repo: &str) -> String {
    format!("{}/environments", repository_path(workspace, repo))
}

/// `bitbucket_deployment`
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentResource;

#[async_trait]
impl Resource for DeploymentResource {
    type Model = DeploymentModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_deployment"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("repository")
                .required()
                .force_new()
                .describe("workspace/repo"),
            Field::string("name").required(),
            Field::string("stage")
                .required()
                .force_new()
                .one_of(DEPLOYMENT_STAGES),
            Field::string("uuid").computed(),
        ])
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData<DeploymentModel>) -> Result<()> {
        let [workspace, repo] = id::decode::<2>(&data.attributes.repository, "WORKSPACE/REPO")?;
        let request = Environment {
            uuid: None,
            name: data.attributes.name.clone(),
            environment_type: EnvironmentType {
                name: data.attributes.stage.clone(),
            },
        };
        tracing::debug!("Deployment Request: {request:?}");

        let created: Environment = ctx
            .client
            .post_json(&format!("{}/", environments_path(&workspace, &repo)), &request)
            .await?;
        let uuid = created.uuid.filter(|u| !u.is_empty()).ok_or_else(|| {
            ProviderError::Validation("deployment created without a uuid".to_string())
        })?;

        data.set_id(id::encode_deployment(&workspace, &repo, &uuid));
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<DeploymentModel>) -> Result<()> {
        let (workspace, repo, uuid) = id::decode_deployment(data.require_id()?)?;
        let path = format!("{}/{}", environments_path(&workspace, &repo), escape(&uuid));

        match ctx.client.get_optional::<Environment>(&path).await? {
            Some(env) => {
                let model = &mut data.attributes;
                model.repository = id::encode(&[&workspace, &repo]);
                model.name = env.name;
                model.stage = env.environment_type.name;
                model.uuid = env.uuid.or(Some(uuid));
            }
            None => {
                tracing::warn!("Deployment ({path}) not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &DeploymentModel,
        data: &mut ResourceData<DeploymentModel>,
    ) -> Result<()> {
        let (workspace, repo, uuid) = id::decode_deployment(data.require_id()?)?;
        let path = format!(
            "{}/{}/changes/",
            environments_path(&workspace, &repo),
            escape(&uuid)
        );
        let change = EnvironmentChange {
            change: EnvironmentChangeFields {
                name: data.attributes.name.clone(),
            },
        };
        let _: serde_json::Value = ctx.client.post_json(&path, &change).await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &ResourceData<DeploymentModel>) -> Result<()> {
        let (workspace, repo, uuid) = id::decode_deployment(data.require_id()?)?;
        ctx.client
            .delete(&format!(
                "{}/{}",
                environments_path(&workspace, &repo),
                escape(&uuid)
            ))
            .await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<DeploymentModel>> {
        let (workspace, repo, uuid) = id::decode_deployment(raw)?;
        Ok(ResourceData::with_id(
            raw,
            DeploymentModel {
                repository: id::encode(&[&workspace, &repo]),
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
    fn test_stage_is_enumerated() {
        let schema = DeploymentResource.schema();
        assert!(schema
            .validate(&json!({"repository": "acme/demo", "name": "qa", "stage": "Staging"}))
            .is_ok());
        assert!(schema
            .validate(&json!({"repository": "acme/demo", "name": "qa", "stage": "Canary"}))
            .is_err());
    }

    #[test]
    fn test_stage_change_requires_replacement() {
        let schema = DeploymentResource.schema();
        let prior = json!({"repository": "acme/demo", "name": "qa", "stage": "Test"});
        let planned = json!({"repository": "acme/demo", "name": "qa", "stage": "Staging"});
        assert_eq!(schema.requires_replacement(&prior, &planned), vec!["stage"]);
    }

    #[test]
    fn test_import_reads_deployment_reference() {
        let data = DeploymentResource.import_state("acme/demo:{env}").unwrap();
        assert_eq!(data.attributes.repository, "acme/demo");
        assert_eq!(data.attributes.uuid.as_deref(), Some("{env}"));
    }
}
