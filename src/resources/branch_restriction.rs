//
//  bitbucket-provider
//  resources/branch_restriction.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_branch_restriction`: one branch permission rule.
//!
//! The identifier is the numeric rule ID Bitbucket assigns; owner and
//! repository are attributes. Import takes `OWNER/REPO/BRANCH-RESTRICTION-ID`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::cloud::branches::{
    BranchRestriction, RestrictionGroup, RestrictionUser, BRANCH_MATCH_KINDS, RESTRICTION_BRANCH_TYPES,
    RESTRICTION_KINDS,
};
use crate::api::cloud::repository_path;
use crate::api::common::{ProviderError, Result};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchRestrictionModel {
    pub owner: String,
    pub repository: String,
    pub kind: String,
    pub branch_match_kind: String,
    pub pattern: Option<String>,
    pub branch_type: Option<String>,
    pub users: BTreeSet<String>,
    pub groups: Vec<GroupRef>,
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRef {
    pub owner: String,
    pub slug: String,
}

impl BranchRestrictionModel {
    fn collection_path(&self) -> String {
        format!(
            "{}/branch-restrictions",
            repository_path(&self.owner, &self.repository)
        )
    }

    fn to_request(&self) -> BranchRestriction {
        BranchRestriction {
            id: None,
            kind: self.kind.clone(),
            branch_match_kind: Some(self.branch_match_kind.clone()).filter(|k| !k.is_empty()),
            branch_type: self.branch_type.clone(),
            pattern: self.pattern.clone(),
            value: self.value,
            users: self
                .users
                .iter()
                .map(|u| RestrictionUser {
                    username: u.clone(),
                })
                .collect(),
            groups: self
                .groups
                .iter()
                .map(|g| RestrictionGroup {
                    slug: g.slug.clone(),
                    owner: RestrictionUser {
                        username: g.owner.clone(),
                    },
                })
                .collect(),
        }
    }

    fn apply(&mut self, rule: BranchRestriction) {
        self.kind = rule.kind;
        self.branch_match_kind = rule.branch_match_kind.unwrap_or_default();
        self.pattern = rule.pattern.filter(|p| !p.is_empty());
        self.branch_type = rule.branch_type.filter(|t| !t.is_empty());
        self.value = rule.value;
        self.users = rule.users.into_iter().map(|u| u.username).collect();
        let mut groups: Vec<GroupRef> = rule
            .groups
            .into_iter()
            .map(|g| GroupRef {
                owner: g.owner.username,
                slug: g.slug,
            })
            .collect();
        groups.sort();
        self.groups = groups;
    }
}

/// `bitbucket_branch_restriction`
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchRestrictionResource;

#[async_trait]
impl Resource for BranchRestrictionResource {
    type Model = BranchRestrictionModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_branch_restriction"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("owner").required().force_new(),
            Field::string("repository").required().force_new(),
            Field::string("kind").required().one_of(RESTRICTION_KINDS),
            Field::string("branch_match_kind")
                .optional()
                .default_value(json!("glob"))
                .one_of(BRANCH_MATCH_KINDS),
            Field::string("pattern").optional(),
            Field::string("branch_type")
                .optional()
                .one_of(RESTRICTION_BRANCH_TYPES),
            Field::string_set("users").optional(),
            Field::block_list(
                "groups",
                vec![
                    Field::string("owner").required(),
                    Field::string("slug").required(),
                ],
                None,
            )
            .optional(),
            Field::int("value").optional(),
        ])
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<BranchRestrictionModel>,
    ) -> Result<()> {
        let request = data.attributes.to_request();
        tracing::debug!("Branch Restriction Request: {request:?}");

        let rule: BranchRestriction = ctx
            .client
            .post_json(&data.attributes.collection_path(), &request)
            .await?;
        let rule_id = rule.id.ok_or_else(|| {
            ProviderError::Validation("branch restriction created without an id".to_string())
        })?;

        data.set_id(rule_id.to_string());
        self.read(ctx, data).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<BranchRestrictionModel>,
    ) -> Result<()> {
        let path = format!(
            "{}/{}",
            data.attributes.collection_path(),
            escape(data.require_id()?)
        );
        match ctx.client.get_optional::<BranchRestriction>(&path).await? {
            Some(rule) => {
                if let Some(rule_id) = rule.id {
                    data.set_id(rule_id.to_string());
                }
                data.attributes.apply(rule);
            }
            None => {
                tracing::warn!("Branch Restriction ({path}) not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &BranchRestrictionModel,
        data: &mut ResourceData<BranchRestrictionModel>,
    ) -> Result<()> {
        let path = format!(
            "{}/{}",
            data.attributes.collection_path(),
            escape(data.require_id()?)
        );
        ctx.client.put(&path, &data.attributes.to_request()).await?;
        self.read(ctx, data).await
    }

    async fn delete(
        &self,
        ctx: &ProviderContext,
        data: &ResourceData<BranchRestrictionModel>,
    ) -> Result<()> {
        let path = format!(
            "{}/{}",
            data.attributes.collection_path(),
            escape(data.require_id()?)
        );
        ctx.client.delete(&path).await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<BranchRestrictionModel>> {
        let [owner, repository, rule_id] =
            id::decode::<3>(raw, "OWNER/REPO/BRANCH-RESTRICTION-ID")?;
        Ok(ResourceData::with_id(
            rule_id,
            BranchRestrictionModel {
                owner,
                repository,
                ..Default::default()
            },
        ))
    }
}
