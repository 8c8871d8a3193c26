//
//  bitbucket-provider
//  resources/deployment_variable.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_deployment_variable`: a variable of one deployment environment.
//!
//! The identifier is the variable UUID. `deployment` holds the
//! `workspace/repo:environment-uuid` reference. There is no single-variable
//! GET, so reads page through the environment's variables and pick the one
//! with a matching UUID.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::pipelines::PipelineVariable;
use crate::api::cloud::repository_path;
use crate::api::common::{collect_pages, ProviderError, Result};
use crate::resources::repository_variable::VariableFields;
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentVariableModel {
    /// `workspace/repo:environment-uuid`
    pub deployment: String,
    #[serde(flatten)]
    pub variable: VariableFields,
}

impl DeploymentVariableModel {
    fn collection_path(&self) -> Result<String> {
        let (workspace, repo, environment) = id::decode_deployment(&self.deployment)?;
        Ok(format!(
            "{}/deployments_config/environments/{}/variables",
            repository_path(&workspace, &repo),
            escape(&environment)
        ))
    }
}

/// `bitbucket_deployment_variable`
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentVariableResource;

#[async_trait]
impl Resource for DeploymentVariableResource {
    type Model = DeploymentVariableModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_deployment_variable"
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![Field::string("deployment")
            .required()
            .force_new()
            .describe("workspace/repo:environment-uuid")];
        fields.extend(VariableFields::schema_fields());
        Schema::new(fields)
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<DeploymentVariableModel>,
    ) -> Result<()> {
        let path = data.attributes.collection_path()?;
        let created: PipelineVariable = ctx
            .client
            .post_json(&path, &data.attributes.variable.to_request())
            .await?;
        let uuid = created.uuid.filter(|u| !u.is_empty()).ok_or_else(|| {
            ProviderError::Validation(format!(
                "deployment variable {} created without a uuid",
                data.attributes.variable.key
            ))
        })?;

        data.attributes.variable.uuid = Some(uuid.clone());
        data.set_id(uuid);
        self.read(ctx, data).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<DeploymentVariableModel>,
    ) -> Result<()> {
        let uuid = data.require_id()?.to_string();
        let path = data.attributes.collection_path()?;

        let variables = match collect_pages::<PipelineVariable>(&ctx.client, &path).await {
            Ok(variables) => variables,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };

        match variables
            .into_iter()
            .find(|v| v.uuid.as_deref() == Some(uuid.as_str()))
        {
            Some(remote) => data.attributes.variable.apply(remote),
            None => {
                tracing::warn!("Deployment Variable ({uuid}) not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &DeploymentVariableModel,
        data: &mut ResourceData<DeploymentVariableModel>,
    ) -> Result<()> {
        let path = format!(
            "{}/{}",
            data.attributes.collection_path()?,
            escape(data.require_id()?)
        );
        ctx.client
            .put(&path, &data.attributes.variable.to_request())
            .await?;
        self.read(ctx, data).await
    }

    async fn delete(
        &self,
        ctx: &ProviderContext,
        data: &ResourceData<DeploymentVariableModel>,
    ) -> Result<()> {
        let path = format!(
            "{}/{}",
            data.attributes.collection_path()?,
            escape(data.require_id()?)
        );
        ctx.client.delete(&path).await
    }

    /// Import takes `WORKSPACE/REPO:ENVIRONMENT-UUID:VARIABLE-UUID`.
    fn import_state(&self, raw: &str) -> Result<ResourceData<DeploymentVariableModel>> {
        const EXPECTED: &str = "WORKSPACE/REPO:ENVIRONMENT-UUID:VARIABLE-UUID";
        let invalid = || ProviderError::InvalidId {
            id: raw.to_string(),
            expected: EXPECTED.to_string(),
        };

        let (deployment, uuid) = raw
            .rsplit_once(':')
            .filter(|(_, uuid)| !uuid.is_empty())
            .ok_or_else(invalid)?;
        id::decode_deployment(deployment).map_err(|_| invalid())?;

        Ok(ResourceData::with_id(
            uuid,
            DeploymentVariableModel {
                deployment: deployment.to_string(),
                variable: VariableFields {
                    uuid: Some(uuid.to_string()),
                    ..Default::default()
                },
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_path_from_deployment_reference() {
        let model = DeploymentVariableModel {
            deployment: "acme/demo:env-1".to_string(),
            ..Default::default()
        };
        assert_eq!(
            model.collection_path().unwrap(),
            "2.0/repositories/acme/demo/deployments_config/environments/env-1/variables"
        );
    }

    #[test]
    fn test_import_splits_on_last_colon() {
        let data = DeploymentVariableResource
            .import_state("acme/demo:{env}:{var}")
            .unwrap();
        assert_eq!(data.id(), Some("{var}"));
        assert_eq!(data.attributes.deployment, "acme/demo:{env}");

        let err = DeploymentVariableResource.import_state("acme/demo:{env}").unwrap_err();
        assert!(err.to_string().contains("VARIABLE-UUID"));
    }
}
