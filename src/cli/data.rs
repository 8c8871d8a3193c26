//
//  bitbucket-provider
//  cli/data.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Data source commands

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::output::write_json;
use crate::provider::Provider;

use super::{read_document, GlobalOptions};

/// Read a data source
#[derive(Args, Debug)]
pub struct DataCommand {
    /// Data source type, e.g. bitbucket_workspace
    pub type_name: String,

    /// Query arguments (JSON, @FILE or -); defaults to an empty object
    #[arg(long, short = 'c')]
    pub config: Option<String>,
}

impl DataCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let provider = Provider::new();
        let data_source = provider.data_source(&self.type_name)?;
        let ctx = global.context()?;

        let config = match &self.config {
            Some(arg) => read_document(arg)?,
            None => json!({}),
        };
        write_json(&data_source.read(&ctx, &config).await?)
    }
}
