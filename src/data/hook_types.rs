//
//  bitbucket-provider
//  data/hook_types.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_hook_types`: the webhook events available for a subject type.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::hooks::{HookEvent, HOOK_SUBJECT_TYPES};
use crate::api::common::{collect_pages, Result};
use crate::data::DataSource;
use crate::resources::{ProviderContext, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HookTypesModel {
    pub subject_type: String,
    pub hook_types: Vec<HookEvent>,
}

/// `bitbucket_hook_types`. The identifier is the subject type.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookTypesDataSource;

#[async_trait]
impl DataSource for HookTypesDataSource {
    type Model = HookTypesModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_hook_types"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("subject_type")
                .required()
                .one_of(HOOK_SUBJECT_TYPES),
            Field::block_list(
                "hook_types",
                vec![
                    Field::string("event").computed(),
                    Field::string("category").computed(),
                    Field::string("label").computed(),
                    Field::string("description").computed(),
                ],
                None,
            )
            .computed(),
        ])
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<HookTypesModel>) -> Result<()> {
        let subject_type = data.attributes.subject_type.clone();
        let path = format!("2.0/hook_events/{}", escape(&subject_type));

        data.attributes.hook_types = collect_pages(&ctx.client, &path).await?;
        tracing::debug!(
            "Hook Types Response: {} events for {subject_type}",
            data.attributes.hook_types.len()
        );
        data.set_id(subject_type);
        Ok(())
    }
}
