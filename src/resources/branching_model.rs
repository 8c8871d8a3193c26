//
//  bitbucket-provider
//  resources/branching_model.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_branching_model`: the development/production branches and branch
//! type prefixes of a repository.
//!
//! The model always exists on the remote, so create and update both write the
//! settings and delete resets them. The identifier is `owner/repo`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::branches::{
    BranchModelBranch, BranchTypeSetting, BranchingModel, MODEL_BRANCH_KINDS,
};
use crate::api::cloud::repository_path;
use crate::api::common::Result;
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};

const ID_PATTERN: &str = "OWNER/REPO";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchingModelModel {
    pub owner: String,
    pub repository: String,
    pub development: Option<BranchBlock>,
    pub production: Option<BranchBlock>,
    pub branch_type: Vec<BranchTypeBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchBlock {
    pub name: Option<String>,
    pub use_mainbranch: bool,
    pub branch_does_not_exist: bool,
    pub is_valid: bool,
    /// Production only.
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchTypeBlock {
    pub kind: String,
    pub prefix: Option<String>,
    pub enabled: bool,
}

impl BranchBlock {
    fn to_request(&self) -> BranchModelBranch {
        BranchModelBranch {
            name: self.name.clone().filter(|n| !n.is_empty()),
            use_mainbranch: self.use_mainbranch,
            branch_does_not_exist: self.branch_does_not_exist,
            is_valid: false,
            enabled: self.enabled,
        }
    }

    fn from_remote(branch: BranchModelBranch, production: bool) -> Self {
        Self {
            name: branch.name,
            use_mainbranch: branch.use_mainbranch,
            branch_does_not_exist: branch.branch_does_not_exist,
            is_valid: branch.is_valid,
            // A disabled production branch is omitted from the response.
            enabled: production.then_some(true),
        }
    }
}

impl BranchingModelModel {
    fn to_request(&self) -> BranchingModel {
        BranchingModel {
            development: self.development.as_ref().map(BranchBlock::to_request),
            production: self.production.as_ref().map(BranchBlock::to_request),
            branch_types: self
                .branch_type
                .iter()
                .map(|t| BranchTypeSetting {
                    kind: t.kind.clone(),
                    prefix: t.prefix.clone(),
                    enabled: t.enabled,
                })
                .collect(),
        }
    }

    fn apply(&mut self, model: BranchingModel) {
        self.development = model
            .development
            .map(|b| BranchBlock::from_remote(b, false));
        self.production = model.production.map(|b| BranchBlock::from_remote(b, true));
        let mut types: Vec<BranchTypeBlock> = model
            .branch_types
            .into_iter()
            .map(|t| BranchTypeBlock {
                kind: t.kind,
                prefix: t.prefix,
                enabled: t.enabled,
            })
            .collect();
        types.sort();
        self.branch_type = types;
    }
}

fn branch_block_fields(production: bool) -> Vec<Field> {
    let mut fields = vec![
        Field::string("name").optional(),
        Field::bool("use_mainbranch").optional(),
        Field::bool("branch_does_not_exist").optional(),
        Field::bool("is_valid").computed(),
    ];
    if production {
        fields.push(Field::bool("enabled").optional());
    }
    fields
}

async fn put_settings(ctx: &ProviderContext, owner: &str, repo: &str, body: &BranchingModel) -> Result<()> {
    let path = format!("{}/branching-model/settings", repository_path(owner, repo));
    tracing::debug!("Branching Model Request: {body:?}");
    ctx.client.put(&path, body).await
}

/// `bitbucket_branching_model`
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchingModelResource;

#[async_trait]
impl Resource for BranchingModelResource {
    type Model = BranchingModelModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_branching_model"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("owner").required().force_new(),
            Field::string("repository").required().force_new(),
            Field::block("development", branch_block_fields(false)).optional(),
            Field::block("production", branch_block_fields(true)).optional(),
            Field::block_list(
                "branch_type",
                vec![
                    Field::string("kind").required().one_of(MODEL_BRANCH_KINDS),
                    Field::string("prefix").optional(),
                    Field::bool("enabled").optional(),
                ],
                Some(4),
            )
            .optional(),
        ])
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<BranchingModelModel>,
    ) -> Result<()> {
        let model = &data.attributes;
        put_settings(ctx, &model.owner, &model.repository, &model.to_request()).await?;
        data.set_id(id::encode(&[&data.attributes.owner, &data.attributes.repository]));
        self.read(ctx, data).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<BranchingModelModel>,
    ) -> Result<()> {
        let [owner, repo] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        let path = format!("{}/branching-model", repository_path(&owner, &repo));

        match ctx.client.get_optional::<BranchingModel>(&path).await? {
            Some(model) => {
                data.attributes.owner = owner;
                data.attributes.repository = repo;
                data.attributes.apply(model);
            }
            None => {
                tracing::warn!("Branching Model ({owner}/{repo}) not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &BranchingModelModel,
        data: &mut ResourceData<BranchingModelModel>,
    ) -> Result<()> {
        let [owner, repo] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        put_settings(ctx, &owner, &repo, &data.attributes.to_request()).await?;
        self.read(ctx, data).await
    }

    async fn delete(
        &self,
        ctx: &ProviderContext,
        data: &ResourceData<BranchingModelModel>,
    ) -> Result<()> {
        let [owner, repo] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        ctx.client
            .put_empty(&format!(
                "{}/branching-model/settings",
                repository_path(&owner, &repo)
            ))
            .await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<BranchingModelModel>> {
        let [owner, repository] = id::decode::<2>(raw, ID_PATTERN)?;
        Ok(ResourceData::with_id(
            id::encode(&[&owner, &repository]),
            BranchingModelModel {
                owner,
                repository,
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
    fn test_production_is_flagged_enabled_when_present() {
        let mut model = BranchingModelModel::default();
        model.apply(BranchingModel {
            development: Some(BranchModelBranch {
                use_mainbranch: true,
                is_valid: true,
                ..Default::default()
            }),
            production: Some(BranchModelBranch {
                name: Some("release".to_string()),
                ..Default::default()
            }),
            branch_types: vec![],
        });
        assert_eq!(model.development.unwrap().enabled, None);
        assert_eq!(model.production.unwrap().enabled, Some(true));
    }

    #[test]
    fn test_at_most_four_branch_types() {
        let types: Vec<_> = ["feature", "bugfix", "release", "hotfix", "feature"]
            .iter()
            .map(|k| json!({"kind": k, "enabled": true}))
            .collect();
        let err = BranchingModelResource
            .schema()
            .validate(&json!({"owner": "a", "repository": "b", "branch_type": types}))
            .unwrap_err();
        assert!(err.to_string().contains("at most 4"));
    }

    #[test]
    fn test_request_always_carries_branch_types() {
        let body = serde_json::to_value(BranchingModelModel::default().to_request()).unwrap();
        assert_eq!(body["branch_types"], json!([]));
        assert!(body.get("development").is_none());
    }
}
