//
//  bitbucket-provider
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros
//!
//! `bbtf` drives the adapters the way a declarative engine would: it takes a
//! JSON configuration or a previously printed state document, runs one
//! lifecycle operation and prints the resulting state to stdout.
//!
//! ## Examples
//!
//! ```bash
//! # Create a repository and keep its state
//! bbtf resource bitbucket_repository create \
//!     --config '{"owner": "acme", "name": "demo"}' > demo.json
//!
//! # Refresh it
//! bbtf resource bitbucket_repository read --state @demo.json
//!
//! # Look up a workspace
//! bbtf data bitbucket_workspace --config '{"workspace": "acme"}'
//!
//! # Show the fields a hook takes
//! bbtf schema bitbucket_hook
//! ```

mod completion;
mod data;
mod resource;
mod schema;

pub use completion::CompletionCommand;
pub use data::DataCommand;
pub use resource::ResourceCommand;
pub use schema::SchemaCommand;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::config::{ProviderConfig, ENV_OAUTH_TOKEN, ENV_PASSWORD, ENV_USERNAME};
use crate::resources::ProviderContext;

/// bbtf - Drive Bitbucket Cloud resources declaratively
#[derive(Parser, Debug)]
#[command(
    name = "bbtf",
    version,
    about = "Drive Bitbucket Cloud resources declaratively",
    long_about = "bbtf runs create/read/update/delete/import for Bitbucket Cloud resources \
                  and reads data sources.\n\n\
                  Configurations and state documents are JSON; pass them inline, \
                  as @FILE, or as - for stdin.",
    propagate_version = true,
    after_help = "Use 'bbtf <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Provider configuration file (TOML)
    #[arg(long, global = true, env = "BITBUCKET_PROVIDER_CONFIG")]
    pub provider_config: Option<PathBuf>,

    /// Username for basic authentication
    #[arg(long, global = true, env = ENV_USERNAME)]
    pub username: Option<String>,

    /// App password for basic authentication
    #[arg(long, global = true, env = ENV_PASSWORD, hide_env_values = true)]
    pub password: Option<String>,

    /// OAuth bearer token
    #[arg(long, global = true, env = ENV_OAUTH_TOKEN, hide_env_values = true)]
    pub oauth_token: Option<String>,

    /// API root, e.g. https://api.bitbucket.org
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

impl GlobalOptions {
    /// Loads the provider configuration and lets the flags override it.
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let mut config = ProviderConfig::load(self.provider_config.as_deref())?;
        if let Some(username) = &self.username {
            config.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        if let Some(token) = &self.oauth_token {
            config.oauth_token = Some(token.clone());
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        Ok(config)
    }

    pub fn context(&self) -> Result<ProviderContext> {
        Ok(ProviderContext::new(self.provider_config()?)?)
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a lifecycle operation on a resource
    #[command(visible_alias = "r")]
    Resource(ResourceCommand),

    /// Read a data source
    #[command(visible_alias = "d")]
    Data(DataCommand),

    /// List registered types or describe one
    Schema(SchemaCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Print version information
    Version,
}

/// Reads a JSON document given inline, as `@path`, or as `-` for stdin.
pub(crate) fn read_document(arg: &str) -> Result<Value> {
    let text = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?
    } else {
        arg.to_string()
    };
    serde_json::from_str(&text).context("Document is not valid JSON")
}
