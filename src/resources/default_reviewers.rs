//
//  bitbucket-provider
//  resources/default_reviewers.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_default_reviewers` and `bitbucket_project_default_reviewers`.
//!
//! Both manage a set of reviewer UUIDs on a collection endpoint where each
//! reviewer is added with `PUT .../default-reviewers/{user}` and removed with
//! `DELETE`. Reads follow the paginated listing. The identifier is
//! `owner/repo/reviewers` or `workspace/project/reviewers`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::users::Reviewer;
use crate::api::cloud::{repository_path, workspace_path};
use crate::api::common::{collect_pages, ProviderError, Result};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

const REVIEWERS_SUFFIX: &str = "reviewers";

async fn add_reviewers<'a>(
    ctx: &ProviderContext,
    collection: &str,
    users: impl IntoIterator<Item = &'a String>,
) -> Result<()> {
    for user in users {
        tracing::debug!("Adding default reviewer {user}");
        ctx.client
            .put_empty(&format!("{collection}/{}", escape(user)))
            .await?;
    }
    Ok(())
}

async fn remove_reviewers<'a>(
    ctx: &ProviderContext,
    collection: &str,
    users: impl IntoIterator<Item = &'a String>,
) -> Result<()> {
    for user in users {
        tracing::debug!("Removing default reviewer {user}");
        ctx.client
            .delete(&format!("{collection}/{}", escape(user)))
            .await?;
    }
    Ok(())
}

/// All reviewer UUIDs of `collection`. `None` when the parent object is gone.
async fn list_reviewers(ctx: &ProviderContext, collection: &str) -> Result<Option<BTreeSet<String>>> {
    match collect_pages::<Reviewer>(&ctx.client, collection).await {
        Ok(reviewers) => Ok(Some(
            reviewers
                .iter()
                .filter_map(Reviewer::account_uuid)
                .map(str::to_string)
                .collect(),
        )),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Applies the difference between `prior` and `planned`.
async fn sync_reviewers(
    ctx: &ProviderContext,
    collection: &str,
    prior: &BTreeSet<String>,
    planned: &BTreeSet<String>,
) -> Result<()> {
    add_reviewers(ctx, collection, planned.difference(prior)).await?;
    remove_reviewers(ctx, collection, prior.difference(planned)).await
}

fn decode_id(raw: &str, expected: &str) -> Result<(String, String)> {
    let [parent, child, suffix] = id::decode::<3>(raw, expected)?;
    if suffix != REVIEWERS_SUFFIX {
        return Err(ProviderError::InvalidId {
            id: raw.to_string(),
            expected: expected.to_string(),
        });
    }
    Ok((parent, child))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultReviewersModel {
    pub owner: String,
    pub repository: String,
    pub reviewers: BTreeSet<String>,
}

impl DefaultReviewersModel {
    fn collection_path(&self) -> String {
        format!(
            "{}/default-reviewers",
            repository_path(&self.owner, &self.repository)
        )
    }
}

/// `bitbucket_default_reviewers`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReviewersResource;

const REPO_ID_PATTERN: &str = "OWNER/REPO/reviewers";

#[async_trait]
impl Resource for DefaultReviewersResource {
    type Model = DefaultReviewersModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_default_reviewers"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("owner").required().force_new(),
            Field::string("repository").required().force_new(),
            Field::string_set("reviewers").required(),
        ])
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<DefaultReviewersModel>,
    ) -> Result<()> {
        let model = &data.attributes;
        add_reviewers(ctx, &model.collection_path(), &model.reviewers).await?;
        data.set_id(id::encode(&[
            &data.attributes.owner,
            &data.attributes.repository,
            REVIEWERS_SUFFIX,
        ]));
        self.read(ctx, data).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<DefaultReviewersModel>,
    ) -> Result<()> {
        let (owner, repository) = decode_id(data.require_id()?, REPO_ID_PATTERN)?;
        data.attributes.owner = owner;
        data.attributes.repository = repository;

        match list_reviewers(ctx, &data.attributes.collection_path()).await? {
            Some(reviewers) => data.attributes.reviewers = reviewers,
            None => {
                tracing::warn!("Default Reviewers not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &DefaultReviewersModel,
        data: &mut ResourceData<DefaultReviewersModel>,
    ) -> Result<()> {
        let model = &data.attributes;
        sync_reviewers(ctx, &model.collection_path(), &prior.reviewers, &model.reviewers).await?;
        self.read(ctx, data).await
    }

    async fn delete(
        &self,
        ctx: &ProviderContext,
        data: &ResourceData<DefaultReviewersModel>,
    ) -> Result<()> {
        let model = &data.attributes;
        remove_reviewers(ctx, &model.collection_path(), &model.reviewers).await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<DefaultReviewersModel>> {
        let (owner, repository) = decode_id(raw, REPO_ID_PATTERN)?;
        Ok(ResourceData::with_id(
            raw,
            DefaultReviewersModel {
                owner,
                repository,
                ..Default::default()
            },
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDefaultReviewersModel {
    pub workspace: String,
    pub project: String,
    pub reviewers: BTreeSet<String>,
}

impl ProjectDefaultReviewersModel {
    fn collection_path(&self) -> String {
        format!(
            "{}/projects/{}/default-reviewers",
            workspace_path(&self.workspace),
            escape(&self.project)
        )
    }
}

/// `bitbucket_project_default_reviewers`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectDefaultReviewersResource;

const PROJECT_ID_PATTERN: &str = "WORKSPACE/PROJECT/reviewers";

#[async_trait]
impl Resource for ProjectDefaultReviewersResource {
    type Model = ProjectDefaultReviewersModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_project_default_reviewers"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required().force_new(),
            Field::string("project").required().force_new(),
            Field::string_set("reviewers").required(),
        ])
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<ProjectDefaultReviewersModel>,
    ) -> Result<()> {
        let model = &data.attributes;
        add_reviewers(ctx, &model.collection_path(), &model.reviewers).await?;
        data.set_id(id::encode(&[
            &data.attributes.workspace,
            &data.attributes.project,
            REVIEWERS_SUFFIX,
        ]));
        self.read(ctx, data).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<ProjectDefaultReviewersModel>,
    ) -> Result<()> {
        let (workspace, project) = decode_id(data.require_id()?, PROJECT_ID_PATTERN)?;
        data.attributes.workspace = workspace;
        data.attributes.project = project;

        match list_reviewers(ctx, &data.attributes.collection_path()).await? {
            Some(reviewers) => data.attributes.reviewers = reviewers,
            None => {
                tracing::warn!("Project Default Reviewers not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: &ProjectDefaultReviewersModel,
        data: &mut ResourceData<ProjectDefaultReviewersModel>,
    ) -> Result<()> {
        let model = &data.attributes;
        sync_reviewers(ctx, &model.collection_path(), &prior.reviewers, &model.reviewers).await?;
        self.read(ctx, data).await
    }

    async fn delete(
        &self,
        ctx: &ProviderContext,
        data: &ResourceData<ProjectDefaultReviewersModel>,
    ) -> Result<()> {
        let model = &data.attributes;
        remove_reviewers(ctx, &model.collection_path(), &model.reviewers).await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<ProjectDefaultReviewersModel>> {
        let (workspace, project) = decode_id(raw, PROJECT_ID_PATTERN)?;
        Ok(ResourceData::with_id(
            raw,
            ProjectDefaultReviewersModel {
                workspace,
                project,
                ..Default::default()
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_requires_reviewers_suffix() {
        assert!(DefaultReviewersResource.import_state("acme/demo/reviewers").is_ok());
        assert!(DefaultReviewersResource.import_state("acme/demo/other").is_err());
        assert!(ProjectDefaultReviewersResource.import_state("acme/OPS").is_err());
    }

    #[test]
    fn test_project_collection_path() {
        let model = ProjectDefaultReviewersModel {
            workspace: "acme".to_string(),
            project: "OPS".to_string(),
            ..Default::default()
        };
        assert_eq!(
            model.collection_path(),
            "2.0/workspaces/acme/projects/OPS/default-reviewers"
        );
    }
}
