//
//  bitbucket-provider
//  resources/repository.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_repository` and `bitbucket_forked_repository`.
//!
//! Both manage a repository at `2.0/repositories/{owner}/{slug}` and its
//! pipelines switch. A fork is created from a parent repository instead of
//! from scratch; read, update and delete are shared.
//!
//! The identifier is `owner/slug`. When no slug is configured it is derived
//! from the name with [`compute_slug`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::cloud::repositories::{
    AvatarLinks, ForkRequest, PipelinesConfig, ProjectKey, Repository, RepositoryRequest,
    WorkspaceSlug,
};
use crate::api::cloud::repository_path;
use crate::api::common::{Link, ProviderError, Result};
use crate::resources::retry::RetryPolicy;
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::compute_slug;

const ID_PATTERN: &str = "OWNER/REPO-SLUG";

/// State of a repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryModel {
    pub owner: String,
    pub name: String,
    pub slug: Option<String>,
    pub scm: String,
    pub has_wiki: bool,
    pub has_issues: bool,
    pub website: Option<String>,
    pub is_private: bool,
    pub fork_policy: String,
    pub language: Option<String>,
    pub description: Option<String>,
    pub project_key: Option<String>,
    pub pipelines_enabled: bool,
    pub uuid: Option<String>,
    pub clone_ssh: Option<String>,
    pub clone_https: Option<String>,
    pub link: Option<LinkBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkBlock {
    pub avatar: Option<HrefBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HrefBlock {
    pub href: String,
}

impl LinkBlock {
    pub(crate) fn from_avatar(avatar: Option<&Link>) -> Option<Self> {
        avatar.filter(|l| !l.href.is_empty()).map(|l| Self {
            avatar: Some(HrefBlock {
                href: l.href.clone(),
            }),
        })
    }

    pub(crate) fn to_request(&self) -> Option<AvatarLinks> {
        self.avatar.as_ref().map(|a| AvatarLinks {
            avatar: Link {
                href: a.href.clone(),
                name: None,
            },
        })
    }
}

/// The `link { avatar { href } }` block shared with projects.
pub(crate) fn link_field() -> Field {
    Field::block(
        "link",
        vec![Field::block("avatar", vec![Field::string("href").optional()])],
    )
    .optional_computed()
}

impl RepositoryModel {
    /// The configured slug, or the one derived from the name.
    pub fn effective_slug(&self) -> String {
        self.slug
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| compute_slug(&self.name))
    }

    fn to_request(&self) -> RepositoryRequest {
        RepositoryRequest {
            name: self.name.clone(),
            slug: Some(self.effective_slug()),
            scm: self.scm.clone(),
            has_wiki: self.has_wiki,
            has_issues: self.has_issues,
            website: self.website.clone(),
            is_private: self.is_private,
            fork_policy: self.fork_policy.clone(),
            language: self.language.clone(),
            description: self.description.clone(),
            project: self.project_key.clone().map(|key| ProjectKey { key }),
            links: self.link.as_ref().and_then(LinkBlock::to_request),
        }
    }

    fn apply(&mut self, owner: &str, repo: &Repository, pipelines_enabled: bool) {
        self.owner = owner.to_string();
        self.name = repo.name.clone();
        self.slug = Some(repo.slug.clone());
        self.scm = repo.scm.clone();
        self.has_wiki = repo.has_wiki;
        self.has_issues = repo.has_issues;
        self.website = repo.website.clone().filter(|w| !w.is_empty());
        self.is_private = repo.is_private;
        self.fork_policy = repo.fork_policy.clone();
        self.language = repo.language.clone().filter(|l| !l.is_empty());
        self.description = repo.description.clone().filter(|d| !d.is_empty());
        self.project_key = repo.project.as_ref().map(|p| p.key.clone());
        self.pipelines_enabled = pipelines_enabled;
        self.uuid = Some(repo.uuid.clone());
        self.clone_https = repo.links.clone_url("https").map(str::to_string);
        self.clone_ssh = repo.links.clone_url("ssh").map(str::to_string);
        self.link = LinkBlock::from_avatar(repo.links.avatar.as_ref());
    }
}

fn repository_fields() -> Vec<Field> {
    vec![
        Field::string("owner").required().force_new(),
        Field::string("name").required(),
        Field::string("slug").optional_computed(),
        Field::string("scm")
            .optional()
            .default_value(json!("git"))
            .one_of(&["git", "hg"])
            .force_new(),
        Field::bool("has_wiki").optional().default_value(json!(false)),
        Field::bool("has_issues").optional().default_value(json!(false)),
        Field::string("website").optional(),
        Field::bool("is_private").optional().default_value(json!(true)),
        Field::string("fork_policy")
            .optional()
            .default_value(json!("allow_forks"))
            .one_of(&["allow_forks", "no_public_forks", "no_forks"]),
        Field::string("language").optional(),
        Field::string("description").optional(),
        Field::string("project_key").optional_computed(),
        Field::bool("pipelines_enabled")
            .optional()
            .default_value(json!(false)),
        Field::string("uuid").computed(),
        Field::string("clone_ssh").computed(),
        Field::string("clone_https").computed(),
        link_field(),
    ]
}

fn pipelines_path(owner: &str, slug: &str) -> String {
    format!("{}/pipelines_config", repository_path(owner, slug))
}

/// Turns pipelines on or off, retrying while the new repository still
/// answers 403/404.
async fn enable_pipelines_with_retry(
    ctx: &ProviderContext,
    owner: &str,
    slug: &str,
    enabled: bool,
) -> Result<()> {
    let path = pipelines_path(owner, slug);
    let body = PipelinesConfig { enabled };
    let policy = RetryPolicy::new(ctx.config.create_timeout(), ctx.config.retry_interval());
    let (path, body) = (&path, &body);

    policy
        .execute(ProviderError::is_permission_or_not_found, move || {
            ctx.client.put(path, body)
        })
        .await
        .inspect_err(|e| {
            tracing::debug!("Enabling pipelines for repository ({owner}/{slug}) failed: {e}")
        })
}

/// Fetches the repository and its pipelines flag. `None` when the repository is gone.
async fn fetch(ctx: &ProviderContext, owner: &str, slug: &str) -> Result<Option<(Repository, bool)>> {
    let Some(repo) = ctx
        .client
        .get_optional::<Repository>(&repository_path(owner, slug))
        .await?
    else {
        return Ok(None);
    };

    // Never-enabled pipelines answer 404.
    let pipelines = ctx
        .client
        .get_optional::<PipelinesConfig>(&pipelines_path(owner, slug))
        .await?
        .map(|c| c.enabled)
        .unwrap_or(false);

    Ok(Some((repo, pipelines)))
}

async fn read_repository(
    ctx: &ProviderContext,
    id: &str,
    model: &mut RepositoryModel,
) -> Result<Option<Repository>> {
    let [owner, slug] = id::decode::<2>(id, ID_PATTERN)?;
    match fetch(ctx, &owner, &slug).await? {
        Some((repo, pipelines)) => {
            model.apply(&owner, &repo, pipelines);
            Ok(Some(repo))
        }
        None => {
            tracing::warn!("Repository ({id}) not found, removing from state");
            Ok(None)
        }
    }
}

async fn update_repository(
    ctx: &ProviderContext,
    id: &str,
    model: &RepositoryModel,
) -> Result<String> {
    let [owner, old_slug] = id::decode::<2>(id, ID_PATTERN)?;
    let request = model.to_request();
    tracing::debug!("Repository Request: {request:?}");

    let repo: Repository = ctx
        .client
        .put_json(&repository_path(&owner, &old_slug), &request)
        .await?;
    let slug = if repo.slug.is_empty() {
        model.effective_slug()
    } else {
        repo.slug
    };

    ctx.client
        .put(
            &pipelines_path(&owner, &slug),
            &PipelinesConfig {
                enabled: model.pipelines_enabled,
            },
        )
        .await?;

    Ok(id::encode(&[&owner, &slug]))
}

fn import_repository(raw: &str) -> Result<(String, RepositoryModel)> {
    let [owner, slug] = id::decode::<2>(raw, ID_PATTERN)?;
    let model = RepositoryModel {
        owner: owner.clone(),
        slug: Some(slug.clone()),
        ..Default::default()
    };
    Ok((id::encode(&[&owner, &slug]), model))
}

/// `bitbucket_repository`
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryResource;

#[async_trait]
impl Resource for RepositoryResource {
    type Model = RepositoryModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_repository"
    }

    fn schema(&self) -> Schema {
        Schema::new(repository_fields())
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData<RepositoryModel>) -> Result<()> {
        let model = &data.attributes;
        let owner = model.owner.clone();
        let slug = model.effective_slug();
        let request = model.to_request();
        tracing::debug!("Repository Request: {request:?}");

        let repo: Repository = ctx
            .client
            .post_json(&repository_path(&owner, &slug), &request)
            .await?;
        let slug = if repo.slug.is_empty() { slug } else { repo.slug };

        data.set_id(id::encode(&[&owner, &slug]));
        enable_pipelines_with_retry(ctx, &owner, &slug, data.attributes.pipelines_enabled).await?;
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<RepositoryModel>) -> Result<()> {
        let id = data.require_id()?.to_string();
        if read_repository(ctx, &id, &mut data.attributes).await?.is_none() {
            data.clear_id();
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &RepositoryModel,
        data: &mut ResourceData<RepositoryModel>,
    ) -> Result<()> {
        let id = update_repository(ctx, data.require_id()?, &data.attributes).await?;
        data.set_id(id);
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &ResourceData<RepositoryModel>) -> Result<()> {
        let [owner, slug] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        ctx.client.delete(&repository_path(&owner, &slug)).await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<RepositoryModel>> {
        let (id, model) = import_repository(raw)?;
        Ok(ResourceData::with_id(id, model))
    }
}

/// State of a fork: a repository plus the `parent` it was forked from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForkedRepositoryModel {
    #[serde(flatten)]
    pub repository: RepositoryModel,

    /// `owner` and `slug` of the parent repository.
    pub parent: BTreeMap<String, String>,
}

impl ForkedRepositoryModel {
    fn parent_ref(&self) -> Result<(&str, &str)> {
        let get = |key: &str| {
            self.parent
                .get(key)
                .map(String::as_str)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ProviderError::Validation(format!("parent: missing {key:?}")))
        };
        Ok((get("owner")?, get("slug")?))
    }
}

/// `bitbucket_forked_repository`
#[derive(Debug, Clone, Copy, Default)]
pub struct ForkedRepositoryResource;

#[async_trait]
impl Resource for ForkedRepositoryResource {
    type Model = ForkedRepositoryModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_forked_repository"
    }

    fn schema(&self) -> Schema {
        let mut fields = repository_fields();
        fields.push(
            Field::string_map("parent")
                .required()
                .force_new()
                .describe("Parent repository: {owner, slug}"),
        );
        Schema::new(fields)
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<ForkedRepositoryModel>,
    ) -> Result<()> {
        let (parent_owner, parent_slug) = data.attributes.parent_ref()?;
        let parent_path = repository_path(parent_owner, parent_slug);
        let model = &data.attributes.repository;

        let parent: Repository = ctx.client.get_json(&parent_path).await?;
        if !parent.scm.is_empty() && parent.scm != model.scm {
            return Err(ProviderError::Validation(format!(
                "cannot fork a {} repository as {}",
                parent.scm, model.scm
            )));
        }

        let owner = model.owner.clone();
        let request = ForkRequest {
            repository: model.to_request(),
            workspace: WorkspaceSlug {
                slug: owner.clone(),
            },
        };
        tracing::debug!("Fork Request: {request:?}");

        let fork: Repository = ctx
            .client
            .post_json(&format!("{parent_path}/forks"), &request)
            .await?;
        let slug = if fork.slug.is_empty() {
            model.effective_slug()
        } else {
            fork.slug
        };

        data.set_id(id::encode(&[&owner, &slug]));
        let enabled = data.attributes.repository.pipelines_enabled;
        enable_pipelines_with_retry(ctx, &owner, &slug, enabled).await?;
        self.read(ctx, data).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<ForkedRepositoryModel>,
    ) -> Result<()> {
        let id = data.require_id()?.to_string();
        let model = &mut data.attributes;
        match read_repository(ctx, &id, &mut model.repository).await? {
            Some(repo) => {
                if let Some((owner, slug)) = repo
                    .parent
                    .as_ref()
                    .and_then(|p| p.full_name.split_once('/'))
                {
                    model.parent = BTreeMap::from([
                        ("owner".to_string(), owner.to_string()),
                        ("slug".to_string(), slug.to_string()),
                    ]);
                }
            }
            None => data.clear_id(),
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &ForkedRepositoryModel,
        data: &mut ResourceData<ForkedRepositoryModel>,
    ) -> Result<()> {
        let id = update_repository(ctx, data.require_id()?, &data.attributes.repository).await?;
        data.set_id(id);
        self.read(ctx, data).await
    }

    async fn delete(
        &self,
        ctx: &ProviderContext,
        data: &ResourceData<ForkedRepositoryModel>,
    ) -> Result<()> {
        let [owner, slug] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        ctx.client.delete(&repository_path(&owner, &slug)).await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<ForkedRepositoryModel>> {
        let (id, repository) = import_repository(raw)?;
        Ok(ResourceData::with_id(
            id,
            ForkedRepositoryModel {
                repository,
                parent: BTreeMap::new(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_defaults_to_computed_name() {
        let model = RepositoryModel {
            name: "Demo Service".to_string(),
            ..Default::default()
        };
        assert_eq!(model.effective_slug(), "demo-service");

        let model = RepositoryModel {
            name: "Demo Service".to_string(),
            slug: Some("custom".to_string()),
            ..Default::default()
        };
        assert_eq!(model.effective_slug(), "custom");
    }

    #[test]
    fn test_schema_defaults_decode_into_model() {
        let config = RepositoryResource
            .schema()
            .validate(&json!({"owner": "acme", "name": "demo"}))
            .unwrap();
        let model: RepositoryModel = serde_json::from_value(config).unwrap();
        assert_eq!(model.scm, "git");
        assert!(model.is_private);
        assert_eq!(model.fork_policy, "allow_forks");
        assert!(!model.pipelines_enabled);
    }

    #[test]
    fn test_import_sets_owner_and_slug() {
        let data = RepositoryResource.import_state("acme/demo").unwrap();
        assert_eq!(data.id(), Some("acme/demo"));
        assert_eq!(data.attributes.slug.as_deref(), Some("demo"));
        assert!(RepositoryResource.import_state("acme").is_err());
    }

    #[test]
    fn test_fork_requires_parent_owner_and_slug() {
        let model = ForkedRepositoryModel {
            parent: BTreeMap::from([("owner".to_string(), "upstream".to_string())]),
            ..Default::default()
        };
        assert!(model.parent_ref().is_err());
    }

    #[test]
    fn test_forked_model_flattens_repository_fields() {
        let config = ForkedRepositoryResource
            .schema()
            .validate(&json!({
                "owner": "mine",
                "name": "demo",
                "parent": {"owner": "upstream", "slug": "demo"}
            }))
            .unwrap();
        let model: ForkedRepositoryModel = serde_json::from_value(config).unwrap();
        assert_eq!(model.repository.owner, "mine");
        assert_eq!(model.parent_ref().unwrap(), ("upstream", "demo"));
    }
}
