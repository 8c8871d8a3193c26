//
//  bitbucket-provider
//  provider.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Provider Registry
//!
//! The typed [`Resource`] and [`DataSource`] traits carry an associated model,
//! so they cannot be stored side by side. [`DynamicResource`] and
//! [`DynamicDataSource`] wrap them behind a JSON-in, JSON-out interface:
//!
//! 1. the user configuration is validated against the schema (defaults applied)
//! 2. the validated document is decoded into the typed model
//! 3. the typed operation runs
//! 4. the resulting state is encoded back into a [`StateDocument`]
//!
//! [`Provider`] maps every registered type name to its wrapper.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::common::{ProviderError, Result};
use crate::data::groups::{GroupDataSource, GroupMembersDataSource, GroupsDataSource};
use crate::data::hook_types::HookTypesDataSource;
use crate::data::ip_ranges::IpRangesDataSource;
use crate::data::users::{CurrentUserDataSource, UserDataSource};
use crate::data::workspaces::{
    PipelineOidcConfigDataSource, PipelineOidcConfigKeysDataSource, WorkspaceDataSource,
    WorkspaceMembersDataSource,
};
use crate::data::DataSource;
use crate::resources::branch_restriction::BranchRestrictionResource;
use crate::resources::branching_model::BranchingModelResource;
use crate::resources::default_reviewers::{DefaultReviewersResource, ProjectDefaultReviewersResource};
use crate::resources::deploy_key::DeployKeyResource;
use crate::resources::deployment::DeploymentResource;
use crate::resources::deployment_variable::DeploymentVariableResource;
use crate::resources::group::GroupResource;
use crate::resources::group_membership::GroupMembershipResource;
use crate::resources::hook::{HookResource, WorkspaceHookResource};
use crate::resources::pipeline_schedule::PipelineScheduleResource;
use crate::resources::pipeline_ssh::{PipelineSshKeyResource, PipelineSshKnownHostResource};
use crate::resources::project::ProjectResource;
use crate::resources::repository::{ForkedRepositoryResource, RepositoryResource};
use crate::resources::repository_variable::RepositoryVariableResource;
use crate::resources::ssh_key::SshKeyResource;
use crate::resources::{ProviderContext, Resource, ResourceData};
use crate::schema::Schema;

/// Serialized state of one resource or data source instance.
///
/// A `null` id means the object does not exist remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub attributes: Value,
}

impl StateDocument {
    fn encode<M: Serialize>(data: &ResourceData<M>) -> Result<Self> {
        Ok(Self {
            id: data.id().map(str::to_string),
            attributes: serde_json::to_value(&data.attributes)?,
        })
    }

    fn decode<M: DeserializeOwned>(&self) -> Result<ResourceData<M>> {
        let attributes = if self.attributes.is_null() {
            serde_json::from_value(Value::Object(Default::default()))?
        } else {
            serde_json::from_value(self.attributes.clone())?
        };
        Ok(match self.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => ResourceData::with_id(id, attributes),
            None => ResourceData::new(attributes),
        })
    }
}

/// Object-safe view of a [`Resource`].
#[async_trait]
pub trait DynamicResource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn create(&self, ctx: &ProviderContext, config: &Value) -> Result<StateDocument>;

    async fn read(&self, ctx: &ProviderContext, state: &StateDocument) -> Result<StateDocument>;

    /// Applies `config` on top of `state`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::RequiresReplacement`] when a force-new field changes.
    async fn update(
        &self,
        ctx: &ProviderContext,
        state: &StateDocument,
        config: &Value,
    ) -> Result<StateDocument>;

    async fn delete(&self, ctx: &ProviderContext, state: &StateDocument) -> Result<()>;

    async fn import(&self, ctx: &ProviderContext, id: &str) -> Result<StateDocument>;
}

#[async_trait]
impl<R> DynamicResource for R
where
    R: Resource,
{
    fn type_name(&self) -> &'static str {
        Resource::type_name(self)
    }

    fn schema(&self) -> Schema {
        Resource::schema(self)
    }

    async fn create(&self, ctx: &ProviderContext, config: &Value) -> Result<StateDocument> {
        let validated = Resource::schema(self).validate(config)?;
        let mut data = ResourceData::new(serde_json::from_value::<R::Model>(validated)?);
        Resource::create(self, ctx, &mut data).await?;
        tracing::info!(
            "Created {} {}",
            Resource::type_name(self),
            data.id().unwrap_or_default()
        );
        StateDocument::encode(&data)
    }

    async fn read(&self, ctx: &ProviderContext, state: &StateDocument) -> Result<StateDocument> {
        let mut data = state.decode::<R::Model>()?;
        Resource::read(self, ctx, &mut data).await?;
        StateDocument::encode(&data)
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        state: &StateDocument,
        config: &Value,
    ) -> Result<StateDocument> {
        let schema = Resource::schema(self);
        let validated = schema.validate(config)?;
        let planned = schema.plan_update(&state.attributes, &validated);

        let replaced = schema.requires_replacement(&state.attributes, &planned);
        if !replaced.is_empty() {
            return Err(ProviderError::RequiresReplacement(replaced));
        }

        let prior = state.decode::<R::Model>()?;
        let mut data = ResourceData::with_id(
            prior.require_id()?,
            serde_json::from_value::<R::Model>(planned)?,
        );
        Resource::update(self, ctx, &prior.attributes, &mut data).await?;
        StateDocument::encode(&data)
    }

    async fn delete(&self, ctx: &ProviderContext, state: &StateDocument) -> Result<()> {
        let data = state.decode::<R::Model>()?;
        Resource::delete(self, ctx, &data).await?;
        tracing::info!(
            "Deleted {} {}",
            Resource::type_name(self),
            data.id().unwrap_or_default()
        );
        Ok(())
    }

    async fn import(&self, ctx: &ProviderContext, id: &str) -> Result<StateDocument> {
        let data = Resource::import(self, ctx, id).await?;
        StateDocument::encode(&data)
    }
}

/// Object-safe view of a [`DataSource`].
#[async_trait]
pub trait DynamicDataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn read(&self, ctx: &ProviderContext, config: &Value) -> Result<StateDocument>;
}

#[async_trait]
impl<D> DynamicDataSource for D
where
    D: DataSource,
{
    fn type_name(&self) -> &'static str {
        DataSource::type_name(self)
    }

    fn schema(&self) -> Schema {
        DataSource::schema(self)
    }

    async fn read(&self, ctx: &ProviderContext, config: &Value) -> Result<StateDocument> {
        let validated = DataSource::schema(self).validate(config)?;
        let mut data = ResourceData::new(serde_json::from_value::<D::Model>(validated)?);
        DataSource::read(self, ctx, &mut data).await?;
        StateDocument::encode(&data)
    }
}

/// Every resource and data source type, by name.
pub struct Provider {
    resources: HashMap<&'static str, Box<dyn DynamicResource>>,
    data_sources: HashMap<&'static str, Box<dyn DynamicDataSource>>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    pub fn new() -> Self {
        let mut provider = Self {
            resources: HashMap::new(),
            data_sources: HashMap::new(),
        };

        provider.register_resource(RepositoryResource);
        provider.register_resource(ForkedRepositoryResource);
        provider.register_resource(HookResource);
        provider.register_resource(WorkspaceHookResource);
        provider.register_resource(BranchRestrictionResource);
        provider.register_resource(BranchingModelResource);
        provider.register_resource(DefaultReviewersResource);
        provider.register_resource(ProjectDefaultReviewersResource);
        provider.register_resource(RepositoryVariableResource);
        provider.register_resource(DeploymentResource);
        provider.register_resource(DeploymentVariableResource);
        provider.register_resource(GroupResource);
        provider.register_resource(GroupMembershipResource);
        provider.register_resource(ProjectResource);
        provider.register_resource(SshKeyResource);
        provider.register_resource(DeployKeyResource);
        provider.register_resource(PipelineSshKeyResource);
        provider.register_resource(PipelineSshKnownHostResource);
        provider.register_resource(PipelineScheduleResource);

        provider.register_data_source(CurrentUserDataSource);
        provider.register_data_source(UserDataSource);
        provider.register_data_source(WorkspaceDataSource);
        provider.register_data_source(WorkspaceMembersDataSource);
        provider.register_data_source(GroupDataSource);
        provider.register_data_source(GroupsDataSource);
        provider.register_data_source(GroupMembersDataSource);
        provider.register_data_source(HookTypesDataSource);
        provider.register_data_source(IpRangesDataSource);
        provider.register_data_source(PipelineOidcConfigDataSource);
        provider.register_data_source(PipelineOidcConfigKeysDataSource);

        provider
    }

    fn register_resource<R: Resource + 'static>(&mut self, resource: R) {
        self.resources
            .insert(Resource::type_name(&resource), Box::new(resource));
    }

    fn register_data_source<D: DataSource + 'static>(&mut self, data_source: D) {
        self.data_sources
            .insert(DataSource::type_name(&data_source), Box::new(data_source));
    }

    pub fn resource(&self, type_name: &str) -> Result<&dyn DynamicResource> {
        self.resources
            .get(type_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::Validation(format!("unknown resource type {type_name:?}")))
    }

    pub fn data_source(&self, type_name: &str) -> Result<&dyn DynamicDataSource> {
        self.data_sources
            .get(type_name)
            .map(|d| d.as_ref())
            .ok_or_else(|| {
                ProviderError::Validation(format!("unknown data source type {type_name:?}"))
            })
    }

    /// Registered resource type names, sorted.
    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.resources.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Registered data source type names, sorted.
    pub fn data_source_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.data_sources.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registers_every_type() {
        let provider = Provider::new();
        assert_eq!(provider.resource_types().len(), 19);
        assert_eq!(provider.data_source_types().len(), 11);
        assert!(provider.resource("bitbucket_pipeline_schedule").is_ok());
        assert!(provider.data_source("bitbucket_ip_ranges").is_ok());
        assert!(provider.resource("bitbucket_issue").is_err());
    }

    #[test]
    fn test_group_name_is_both_resource_and_data_source() {
        let provider = Provider::new();
        assert!(provider.resource("bitbucket_group").is_ok());
        assert!(provider.data_source("bitbucket_group").is_ok());
    }

    #[test]
    fn test_state_without_id_decodes_as_absent() {
        let state: StateDocument =
            serde_json::from_value(json!({"attributes": {"owner": "acme"}})).unwrap();
        let data = state
            .decode::<crate::resources::project::ProjectModel>()
            .unwrap();
        assert!(!data.is_present());
        assert_eq!(data.attributes.owner, "acme");
    }

    #[tokio::test]
    async fn test_force_new_change_is_rejected_before_any_request() {
        let provider = Provider::new();
        let ctx = ProviderContext::new(crate::config::ProviderConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();
        let state = StateDocument {
            id: Some("acme/demo:{env}".to_string()),
            attributes: json!({"repository": "acme/demo", "name": "qa", "stage": "Test", "uuid": "{env}"}),
        };
        let err = provider
            .resource("bitbucket_deployment")
            .unwrap()
            .update(
                &ctx,
                &state,
                &json!({"repository": "acme/demo", "name": "qa", "stage": "Production"}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RequiresReplacement(fields) if fields == vec!["stage"]));
    }
}
