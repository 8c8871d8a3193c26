//
//  bitbucket-provider
//  data/ip_ranges.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `bitbucket_ip_ranges`: Atlassian's published network ranges.
//!
//! The document lives outside the Bitbucket API and is fetched without
//! credentials from the configured `ip_ranges_url`. The identifier is the
//! document's `syncToken`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::cloud::ip_ranges::{IpRange, IpRanges};
use crate::api::common::Result;
use crate::data::DataSource;
use crate::resources::{ProviderContext, ResourceData};
use crate::schema::{Field, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpRangesModel {
    pub ranges: Vec<RangeBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeBlock {
    pub network: String,
    pub mask_len: i64,
    pub cidr: String,
    pub mask: String,
    pub regions: Vec<String>,
    pub products: Vec<String>,
    pub directions: Vec<String>,
}

impl From<IpRange> for RangeBlock {
    fn from(range: IpRange) -> Self {
        Self {
            network: range.network,
            mask_len: range.mask_len,
            cidr: range.cidr,
            mask: range.mask,
            regions: range.region,
            products: range.product,
            directions: range.direction,
        }
    }
}

/// `bitbucket_ip_ranges`
#[derive(Debug, Clone, Copy, Default)]
pub struct IpRangesDataSource;

#[async_trait]
impl DataSource for IpRangesDataSource {
    type Model = IpRangesModel;

    fn type_name(&self) -> &'static str {
        "bitbucket_ip_ranges"
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![Field::block_list(
            "ranges",
            vec![
                Field::string("network").computed(),
                Field::int("mask_len").computed(),
                Field::string("cidr").computed(),
                Field::string("mask").computed(),
                Field::string_set("regions").computed(),
                Field::string_set("products").computed(),
                Field::string_set("directions").computed(),
            ],
            None,
        )
        .computed()])
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData<IpRangesModel>) -> Result<()> {
        let document: IpRanges = ctx
            .client
            .get_unauthenticated(&ctx.config.ip_ranges_url)
            .await?;
        tracing::debug!(
            "IP Ranges Response: sync token {}, {} ranges",
            document.sync_token,
            document.items.len()
        );

        data.attributes.ranges = document.items.into_iter().map(RangeBlock::from).collect();
        data.set_id(document.sync_token.to_string());
        Ok(())
    }
}
