//
//  bitbucket-provider
//  resources/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Resource Adapters
//!
//! Each managed Bitbucket object type implements [`Resource`]: a typed model,
//! a [`Schema`] describing its fields, and the create/read/update/delete calls
//! that map the model onto the REST API.
//!
//! ## Lifecycle
//!
//! ```text
//! absent --create--> present --read--> present | absent (remote 404)
//! present --update--> present
//! present --delete--> absent
//! import(id) --> present
//! ```
//!
//! State lives in a [`ResourceData`]: the composite identifier plus the model.
//! Create and update finish with a read so the returned state is what the
//! remote reports. A read that finds nothing clears the identifier instead of
//! failing.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_provider::config::ProviderConfig;
//! use bitbucket_provider::resources::{ProviderContext, Resource, ResourceData};
//! use bitbucket_provider::resources::project::{ProjectModel, ProjectResource};
//!
//! # async fn example() -> bitbucket_provider::Result<()> {
//! let ctx = ProviderContext::new(ProviderConfig::load(None)?)?;
//! let mut data = ResourceData::new(ProjectModel {
//!     owner: "acme".into(),
//!     key: "OPS".into(),
//!     name: "Operations".into(),
//!     is_private: true,
//!     ..Default::default()
//! });
//! ProjectResource.create(&ctx, &mut data).await?;
//! println!("created {}", data.id().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::client::BitbucketClient;
use crate::api::common::{ProviderError, Result};
use crate::config::ProviderConfig;
use crate::schema::Schema;

pub mod id;
pub mod retry;

pub mod branch_restriction;
pub mod branching_model;
pub mod default_reviewers;
pub mod deploy_key;
pub mod deployment;
pub mod deployment_variable;
pub mod group;
pub mod group_membership;
pub mod hook;
pub mod pipeline_schedule;
pub mod pipeline_ssh;
pub mod project;
pub mod repository;
pub mod repository_variable;
pub mod ssh_key;

/// Immutable provider state handed to every adapter call.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    pub client: BitbucketClient,
    pub config: ProviderConfig,
}

impl ProviderContext {
    /// Validates `config` and builds the shared client from it.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        let client = BitbucketClient::from_config(&config)?;
        Ok(Self { client, config })
    }
}

/// Local state of one resource instance.
///
/// The identifier is the Composite Identifier described in [`id`]; `None`
/// means the object does not exist remotely. Attributes are the typed model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData<M> {
    id: Option<String>,
    pub attributes: M,
}

impl<M> ResourceData<M> {
    /// State for an object that does not exist remotely yet.
    pub fn new(attributes: M) -> Self {
        Self {
            id: None,
            attributes,
        }
    }

    /// State for an object already known by `id`, e.g. after import.
    pub fn with_id(id: impl Into<String>, attributes: M) -> Self {
        Self {
            id: Some(id.into()),
            attributes,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Marks the object as gone.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn is_present(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// The identifier, or a validation error when the state has none.
    pub fn require_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProviderError::Validation("resource has no ID".to_string()))
    }
}

/// CRUD adapter for one Bitbucket object type.
#[async_trait]
pub trait Resource: Send + Sync {
    type Model: Serialize + DeserializeOwned + Clone + Default + Debug + Send + Sync;

    /// Registry name, e.g. `bitbucket_repository`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Creates the remote object, sets the identifier, then reads it back.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared client and provider configuration
    /// * `data` - Validated configuration on entry; refreshed state on return
    ///
    /// # Errors
    ///
    /// Any transport or status error from the create call or the read-back.
    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData<Self::Model>)
        -> Result<()>;

    /// Refreshes `data` from the remote. A missing object clears the identifier.
    ///
    /// # Errors
    ///
    /// [`ProviderError::InvalidId`] for an identifier of the wrong shape, and
    /// every status error other than 404.
    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<Self::Model>)
        -> Result<()>;

    /// Pushes the planned attributes in `data`; `prior` is the last known state.
    ///
    /// Force-new changes never reach this method; the registry rejects them
    /// with [`ProviderError::RequiresReplacement`] first.
    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &Self::Model,
        data: &mut ResourceData<Self::Model>,
    ) -> Result<()>;

    /// Deletes the remote object. An object that is already gone is success.
    async fn delete(&self, ctx: &ProviderContext, data: &ResourceData<Self::Model>) -> Result<()>;

    /// Turns a user-supplied import identifier into the state a read can start from.
    fn import_state(&self, id: &str) -> Result<ResourceData<Self::Model>>;

    /// Imports an existing object by identifier.
    ///
    /// # Errors
    ///
    /// [`ProviderError::InvalidId`] for a malformed identifier and
    /// [`ProviderError::NotFound`] when the remote has no such object.
    async fn import(&self, ctx: &ProviderContext, id: &str) -> Result<ResourceData<Self::Model>> {
        let mut data = self.import_state(id)?;
        self.read(ctx, &mut data).await?;
        if !data.is_present() {
            return Err(ProviderError::NotFound(format!(
                "{} {id:?} does not exist",
                self.type_name()
            )));
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_data_identifier_lifecycle() {
        let mut data = ResourceData::new(());
        assert!(!data.is_present());
        assert!(data.require_id().is_err());

        data.set_id("acme/demo");
        assert!(data.is_present());
        assert_eq!(data.require_id().unwrap(), "acme/demo");

        data.clear_id();
        assert_eq!(data.id(), None);
    }

    #[test]
    fn test_context_rejects_invalid_config() {
        let config = ProviderConfig {
            password: Some("secret".to_string()),
            ..Default::default()
        };
        assert!(ProviderContext::new(config).is_err());
    }
}
