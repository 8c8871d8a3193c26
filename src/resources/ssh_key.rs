//
//  bitbucket-provider
//  resources/ssh_key.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_ssh_key`: an SSH key on a user account. The identifier is
//! `user/uuid`.
//!
//! Bitbucket strips the trailing comment from stored keys and reports it as
//! `comment`, so reads keep the key as configured.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::users::SshKey;
use crate::api::common::{ProviderError, Result};
use crate::resources::{id, ProviderContext, Resource, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

const ID_PATTERN: &str = "USER/KEY-UUID";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshKeyModel {
    /// UUID or account ID of the key owner.
    pub user: String,
    pub key: Option<String>,
    pub label: Option<String>,
    pub uuid: Option<String>,
    pub comment: Option<String>,
}

impl SshKeyModel {
    fn to_request(&self) -> SshKey {
        SshKey {
            uuid: None,
            key: self.key.clone(),
            label: self.label.clone(),
            comment: None,
        }
    }
}

fn keys_path(user: &str) -> String {
    format!("2.0/users/{}/ssh-keys", escape(user))
}

/// `bitbucket_ssh_key`
#[derive(Debug, Clone, Copy, Default)]
pub struct SshKeyResource;

#[async_trait]
impl Resource for SshKeyResource {
    type Model = SshKeyModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_ssh_key"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::string("user").required().force_new(),
            Field::string("key").optional().force_new(),
            Field::string("label").optional(),
            Field::string("uuid").computed(),
            Field::string("comment").computed(),
        ])
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData<SshKeyModel>) -> Result<()> {
        let request = data.attributes.to_request();
        tracing::debug!("SSH Key Request: {request:?}");

        let created: SshKey = ctx
            .client
            .post_json(&keys_path(&data.attributes.user), &request)
            .await?;
        let uuid = created.uuid.filter(|u| !u.is_empty()).ok_or_else(|| {
            ProviderError::Validation("ssh key created without a uuid".to_string())
        })?;

        data.set_id(id::encode(&[&data.attributes.user, &uuid]));
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<SshKeyModel>) -> Result<()> {
        let [user, uuid] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        let path = format!("{}/{}", keys_path(&user), escape(&uuid));

        match ctx.client.get_optional::<SshKey>(&path).await? {
            Some(remote) => {
                tracing::debug!("SSH Key Response Decoded: {remote:?}");
                let model = &mut data.attributes;
                model.user = user;
                model.uuid = remote.uuid.or(Some(uuid));
                model.label = remote.label.filter(|l| !l.is_empty());
                model.comment = remote.comment;
                if model.key.is_none() {
                    model.key = remote.key;
                }
            }
            None => {
                tracing::warn!("SSH Key ({user}/{uuid}) not found, removing from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: &SshKeyModel,
        data: &mut ResourceData<SshKeyModel>,
    ) -> Result<()> {
        let [user, uuid] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        ctx.client
            .put(
                &format!("{}/{}", keys_path(&user), escape(&uuid)),
                &data.attributes.to_request(),
            )
            .await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &ResourceData<SshKeyModel>) -> Result<()> {
        let [user, uuid] = id::decode::<2>(data.require_id()?, ID_PATTERN)?;
        ctx.client
            .delete(&format!("{}/{}", keys_path(&user), escape(&uuid)))
            .await
    }

    fn import_state(&self, raw: &str) -> Result<ResourceData<SshKeyModel>> {
        let [user, uuid] = id::decode::<2>(raw, ID_PATTERN)?;
        Ok(ResourceData::with_id(
            raw,
            SshKeyModel {
                user,
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

    #[test]
    fn test_request_never_sends_comment() {
        let model = SshKeyModel {
            user: "{u}".to_string(),
            key: Some("ssh-ed25519 AAAA me@host".to_string()),
            comment: Some("me@host".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(model.to_request()).unwrap(),
            json!({"key": "ssh-ed25519 AAAA me@host"})
        );
    }

    #[test]
    fn test_user_path_is_escaped() {
        assert_eq!(keys_path("{a b}"), "2.0/users/%7Ba%20b%7D/ssh-keys");
    }
}
