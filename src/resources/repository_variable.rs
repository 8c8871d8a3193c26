//
//  bitbucket-provider
//  resources/repository_variable.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_repository_variable`: a pipeline variable scoped to one
//! repository.
//!
//! The identifier is the variable UUID; `repository` (`workspace/repo`) is an
//! attribute. Import takes `WORKSPACE/REPO/UUID`.
//!
//! Bitbucket never returns the value of a secured variable, so reads keep the
//! locally held value for those.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::cloud::pipelines::PipelineVariable;
use crate::api::cloud::repository_path;
use crate::api::common::{ProviderError, Result};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

/// Key, value and flags shared by repository and deployment variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableFields {
    pub key: String,
    pub value: String,
    pub secured: bool,
    pub uuid: Option<String>,
}

impl VariableFields {
    pub(crate) fn to_request(&self) -> PipelineVariable {
        PipelineVariable {
            uuid: None,
            key: self.key.clone(),
            value: Some(self.value.clone()),
            secured: self.secured,
        }
    }

    /// Copies a remote variable into local state. A secured variable keeps
    /// its local value.
    pub(crate) fn apply(&mut self, remote: PipelineVariable) {
        self.key = remote.key;
        self.secured = remote.secured;
        self.uuid = remote.uuid;
        if !remote.secured {
            self.value = remote.value.unwrap_or_default();
        }
    }

    pub(crate) fn schema_fields() -> Vec<Field> {
        vec![
            Field::string("key").required(),
            Field::string("value").required().sensitive(),
            Field::bool("secured").optional().default_value(json!(false)),
            Field::string("uuid").computed(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryVariableModel {
    /// `workspace/repo`
    pub repository: String,
    #[serde(flatten)]
    pub variable: VariableFields,
}

impl RepositoryVariableModel {
    fn collection_path(&self) -> Result<String> {
        let [workspace, repo] = id::decode::<2>(&self.repository, "WORKSPACE/REPO")?;
        Ok(format!(
            "{}/pipelines_config/variables",
            repository_path(&workspace, &repo)
        ))
    }
}

/// `bitbucket_repository_variable`
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryVariableResource;

#[async_trait]
impl Resource for RepositoryVariableResource {
    type Model = RepositoryVariableModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_repository_variable"
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![Field::string("repository")
            .required()
            .force_new()
            .describe("workspace/repo")];
        fields.extend(VariableFields::schema_fields());
        Schema::new(fields)
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<RepositoryVariableModel>,
    ) -> Result<()> {
        let path = format!("{}/", data.attributes.collection_path()?);
        let created: PipelineVariable = ctx
            .client
            .post_json(&path, &data.attributes.variable.to_request())
            .await?;
        let uuid = created.uuid.filter(|u| !u.is_empty()).ok_or_else(|| {
            ProviderError::Validation(format!(
                "variable {} created without a uuid",
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
        data: &mut ResourceData<RepositoryVariableModel>,
    ) -> Result<()> {
        let path = format!(
            "{}/{}",
            data.attributes.collection_path()?,
            escape(data.require_id()?)
        );
        match ctx.client.get_optional::<PipelineVariable>(&path).await? {
            Some(remote) => data.attributes.variable.apply(remote),
            None => {
                tracing::warn!("Repository Variable ({path}) not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &RepositoryVariableModel,
        data: &mut ResourceData<RepositoryVariableModel>,
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
        data: &ResourceData<RepositoryVariableModel>,
    ) -> Result<()> {
        let path = format!(
            "{}/{}",
            data.attributes.collection_path()?,
            escape(data.require_id()?)
        );
        ctx.client.delete(&path).await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<RepositoryVariableModel>> {
        let [workspace, repo, uuid] = id::decode::<3>(raw, "WORKSPACE/REPO/UUID")?;
        Ok(ResourceData::with_id(
            uuid.clone(),
            RepositoryVariableModel {
                repository: id::encode(&[&workspace, &repo]),
                variable: VariableFields {
                    uuid: Some(uuid),
                    ..Default::default()
                },
            },
        ))
    }
}
