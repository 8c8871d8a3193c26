//
//  bitbucket-provider
//  resources/pipeline_schedule.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_pipeline_schedule`: a cron-triggered pipeline run.
//!
//! After creation the API only allows toggling `enabled`; every other input
//! forces a new schedule. The identifier is `workspace/repo/uuid`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::pipelines::{
    Schedule, ScheduleSelector, ScheduleTarget, ScheduleToggle, REF_TYPES,
};
use crate::api::cloud::repository_path;
use crate::api::common::{ProviderError, Result};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

const ID_PATTERN: &str = "WORKSPACE/REPO/SCHEDULE-UUID";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineScheduleModel {
    pub workspace: String,
    pub repository: String,
    pub enabled: bool,
    pub cron_pattern: String,
    pub target: TargetBlock,
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetBlock {
    pub ref_name: String,
    pub ref_type: String,
    pub selector: SelectorBlock,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorBlock {
    pub pattern: String,
}

impl PipelineScheduleModel {
    fn to_request(&self) -> Schedule {
        Schedule {
            uuid: None,
            enabled: self.enabled,
            cron_pattern: self.cron_pattern.clone(),
            target: ScheduleTarget {
                ref_name: self.target.ref_name.clone(),
                ref_type: self.target.ref_type.clone(),
                selector: ScheduleSelector {
                    pattern: self.target.selector.pattern.clone(),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    fn apply(&mut self, schedule: Schedule) {
        self.uuid = schedule.uuid;
        self.enabled = schedule.enabled;
        self.cron_pattern = schedule.cron_pattern;
        self.target = TargetBlock {
            ref_name: schedule.target.ref_name,
            ref_type: schedule.target.ref_type,
            selector: SelectorBlock {
                pattern: schedule.target.selector.pattern,
            },
        };
    }
}

fn schedules_path(workspace: &str, repo: &str) -> String {
    format!("{}/pipelines_config/schedules", repository_path(workspace, repo))
}

/// `bitbucket_pipeline_schedule`
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineScheduleResource;

#[async_trait]
impl Resource for PipelineScheduleResource {
    type Model = PipelineScheduleModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_pipeline_schedule"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("workspace").required().force_new(),
            Field::string("repository").required().force_new(),
            Field::bool("enabled").required(),
            Field::string("cron_pattern").required().force_new(),
            Field::block(
                "target",
                vec![
                    Field::string("ref_name").required(),
                    Field::string("ref_type").required().one_of(REF_TYPES),
                    Field::block("selector", vec![Field::string("pattern").required()])
                        .required(),
                ],
            )
            .required()
            .force_new(),
            Field::string("uuid").computed(),
        ])
    }

    async fn create(
        &self,
        ctx: &ProviderContext,
        data: &mut ResourceData<PipelineScheduleModel>,
    ) -> Result<()> {
        let model = &data.attributes;
        let request = model.to_request();
        tracing::debug!("Pipeline Schedule Request: {request:?}");

        let created: Schedule = ctx
            .client
            .post_json(
                &format!("{}/", schedules_path(&model.workspace, &model.repository)),
                &request,
            )
            .await?;
        let uuid = created.uuid.filter(|u| !u.is_empty()).ok_or_else(|| {
            ProviderError::Validation("pipeline schedule created without a uuid".to_string())
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
        data: &mut ResourceData<PipelineScheduleModel>,
    ) -> Result<()> {
        let [workspace, repo, uuid] = id::decode::<3>(data.require_id()?, ID_PATTERN)?;
        let path = format!("{}/{}", schedules_path(&workspace, &repo), escape(&uuid));

        match ctx.client.get_optional::<Schedule>(&path).await? {
            Some(schedule) => {
                tracing::debug!("Pipeline Schedule Response Decoded: {schedule:?}");
                data.attributes.workspace = workspace;
                data.attributes.repository = repo;
                data.attributes.apply(schedule);
            }
            None => {
                tracing::warn!("Pipeline Schedule ({path}) not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &PipelineScheduleModel,
        data: &mut ResourceData<PipelineScheduleModel>,
    ) -> Result<()> {
        let [workspace, repo, uuid] = id::decode::<3>(data.require_id()?, ID_PATTERN)?;
        let toggle = ScheduleToggle {
            enabled: data.attributes.enabled,
        };
        ctx.client
            .put(
                &format!("{}/{}", schedules_path(&workspace, &repo), escape(&uuid)),
                &toggle,
            )
            .await?;
        self.read(ctx, data).await
    }

    async fn delete(
        &self,
        ctx: &ProviderContext,
        data: &ResourceData<PipelineScheduleModel>,
    ) -> Result<()> {
        let [workspace, repo, uuid] = id::decode::<3>(data.require_id()?, ID_PATTERN)?;
        ctx.client
            .delete(&format!("{}/{}", schedules_path(&workspace, &repo), escape(&uuid)))
            .await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<PipelineScheduleModel>> {
        let [workspace, repository, uuid] = id::decode::<3>(raw, ID_PATTERN)?;
        Ok(ResourceData::with_id(
            raw,
            PipelineScheduleModel {
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

    fn config() -> serde_json::Value {
        json!({
            "workspace": "acme",
            "repository": "demo",
            "enabled": true,
            "cron_pattern": "0 30 * * * ? *",
            "target": {
                "ref_name": "main",
                "ref_type": "branch",
                "selector": {"pattern": "nightly"}
            }
        })
    }

    #[test]
    fn test_only_enabled_is_updatable() {
        let schema = PipelineScheduleResource.schema();
        let prior = config();
        let mut planned = config();
        planned["enabled"] = json!(false);
        assert!(schema.requires_replacement(&prior, &planned).is_empty());

        planned["target"]["ref_name"] = json!("develop");
        assert_eq!(schema.requires_replacement(&prior, &planned), vec!["target"]);
    }

    #[test]
    fn test_nested_selector_is_required() {
        let mut missing = config();
        missing["target"] = json!({"ref_name": "main", "ref_type": "branch"});
        let err = PipelineScheduleResource.schema().validate(&missing).unwrap_err();
        assert!(err.to_string().contains("target.selector"));
    }

    #[test]
    fn test_request_tags_target_and_selector() {
        let model: PipelineScheduleModel = serde_json::from_value(config()).unwrap();
        let body = serde_json::to_value(model.to_request()).unwrap();
        assert_eq!(body["target"]["type"], "pipeline_ref_target");
        assert_eq!(body["target"]["selector"]["pattern"], "nightly");
    }
}
