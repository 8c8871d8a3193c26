//
//  bitbucket-provider
//  data/users.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_current_user` and `bitbucket_user`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::users::User;
use crate::api::common::{ProviderError, Result};
use crate::data::DataSource;
use crate::resources::{ProviderContext, ResourceData};
use crate::schema::{Field, Schema};
use crate::util::escape;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserModel {
    pub uuid: Option<String>,
    pub account_id: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub nickname: Option<String>,
    pub account_status: Option<String>,
    pub is_staff: bool,
}

impl UserModel {
    fn apply(&mut self, user: User) {
        self.uuid = Some(user.uuid);
        self.account_id = user.account_id;
        self.username = user.username;
        self.display_name = user.display_name;
        self.nickname = user.nickname;
        self.account_status = user.account_status;
        self.is_staff = user.is_staff;
    }
}

fn computed_user_fields() -> Vec<Field> {
    vec![
        Field::string("username").computed(),
        Field::string("display_name").computed(),
        Field::string("nickname").computed(),
        Field::string("account_status").computed(),
        Field::bool("is_staff").computed(),
    ]
}

/// `bitbucket_current_user`: the authenticated account.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentUserDataSource;

#[async_trait]
impl DataSource for CurrentUserDataSource {
    type Model = UserModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_current_user"
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![
            Field::string("uuid").computed(),
            Field::string("account_id").computed(),
        ];
        fields.extend(computed_user_fields());
        Schema::new(fields)
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<UserModel>) -> Result<()> {
        let user: User = ctx.client.get_json("2.0/user").await?;
        tracing::debug!("Current User Response Decoded: {user:?}");

        data.set_id(user.uuid.clone());
        data.attributes.apply(user);
        Ok(())
    }
}

/// `bitbucket_user`: one account, looked up by UUID or account ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserDataSource;

#[async_trait]
impl DataSource for UserDataSource {
    type Model = UserModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_user"
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![
            Field::string("uuid").optional_computed(),
            Field::string("account_id").optional_computed(),
        ];
        fields.extend(computed_user_fields());
        Schema::new(fields)
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<UserModel>) -> Result<()> {
        let selected = match (&data.attributes.uuid, &data.attributes.account_id) {
            (Some(uuid), None) => uuid.clone(),
            (None, Some(account_id)) => account_id.clone(),
            _ => {
                return Err(ProviderError::Validation(
                    "exactly one of uuid or account_id must be set".to_string(),
                ))
            }
        };

        let user: User = ctx
            .client
            .get_json(&format!("2.0/users/{}", escape(&selected)))
            .await?;
        tracing::debug!("User Response Decoded: {user:?}");

        data.set_id(user.uuid.clone());
        data.attributes.apply(user);
        Ok(())
    }
}
