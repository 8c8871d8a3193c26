//
//  bitbucket-provider
//  data/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Data Sources
//!
//! Read-only lookups. A data source takes its query arguments in the model,
//! performs one read, fills in the computed attributes and sets an identifier.
//! Unlike resource reads, a missing remote object is an error here.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::common::Result;
use crate::resources::{ProviderContext, ResourceData};
use crate::schema::Schema;

pub mod groups;
pub mod hook_types;
pub mod ip_ranges;
pub mod users;
pub mod workspaces;

/// A read-only lookup.
#[async_trait]
pub trait DataSource: Send + Sync {
    type Model: Serialize + DeserializeOwned + Default + Debug + Send + Sync;

    /// Registry name, e.g. `bitbucket_workspace`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Resolves the query held in `data.attributes` and sets the identifier.
    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<Self::Model>) -> Result<()>;
}
