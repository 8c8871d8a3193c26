//
//  bitbucket-provider
//  cli/resource.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Resource lifecycle commands
//!
//! ## Examples
//!
//! ```bash
//! bbtf resource bitbucket_hook create --config @hook.json > state.json
//! bbtf resource bitbucket_hook read --state @state.json
//! bbtf resource bitbucket_hook update --state @state.json --config @hook.json
//! bbtf resource bitbucket_hook delete --state @state.json
//! bbtf resource bitbucket_hook import acme/demo/{hook-uuid}
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::output::write_json;
use crate::provider::{Provider, StateDocument};

use super::{read_document, GlobalOptions};

/// Run a lifecycle operation on a resource
#[derive(Args, Debug)]
pub struct ResourceCommand {
    /// Resource type, e.g. bitbucket_repository
    pub type_name: String,

    #[command(subcommand)]
    pub command: ResourceSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ResourceSubcommand {
    /// Create the remote object and print its state
    Create {
        /// Resource configuration (JSON, @FILE or -)
        #[arg(long, short = 'c')]
        config: String,
    },

    /// Refresh a state document
    #[command(visible_alias = "refresh")]
    Read {
        /// State document (JSON, @FILE or -)
        #[arg(long, short = 's')]
        state: String,
    },

    /// Apply a new configuration to an existing object
    Update {
        /// State document (JSON, @FILE or -)
        #[arg(long, short = 's')]
        state: String,

        /// Resource configuration (JSON, @FILE or -)
        #[arg(long, short = 'c')]
        config: String,
    },

    /// Delete the remote object
    #[command(visible_alias = "destroy")]
    Delete {
        /// State document (JSON, @FILE or -)
        #[arg(long, short = 's')]
        state: String,
    },

    /// Adopt an existing object by identifier
    Import {
        /// Import identifier, e.g. OWNER/REPO
        id: String,
    },
}

fn read_state(arg: &str) -> Result<StateDocument> {
    serde_json::from_value(read_document(arg)?).context("Malformed state document")
}

impl ResourceCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let provider = Provider::new();
        let resource = provider.resource(&self.type_name)?;
        let ctx = global.context()?;

        let state = match &self.command {
            ResourceSubcommand::Create { config } => {
                resource.create(&ctx, &read_document(config)?).await?
            }
            ResourceSubcommand::Read { state } => resource.read(&ctx, &read_state(state)?).await?,
            ResourceSubcommand::Update { state, config } => {
                resource
                    .update(&ctx, &read_state(state)?, &read_document(config)?)
                    .await?
            }
            ResourceSubcommand::Delete { state } => {
                let state = read_state(state)?;
                resource.delete(&ctx, &state).await?;
                StateDocument {
                    id: None,
                    attributes: state.attributes,
                }
            }
            ResourceSubcommand::Import { id } => resource.import(&ctx, id).await?,
        };

        write_json(&state)
    }
}
