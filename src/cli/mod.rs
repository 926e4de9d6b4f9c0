// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for acs-pipeline.

pub mod graph;
pub mod synth;
pub mod validate;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

use crate::errors::{AcsError, AcsResult};
use crate::stack::DeployAccount;

/// Context key naming the configuration file
pub const CONFIG_FILE_CONTEXT_KEY: &str = "config-file-name";

/// Delivery pipeline generator for the application configuration store
#[derive(Parser, Debug)]
#[clap(
    name = "acs-pipeline",
    version,
    about = "Define the CI/CD pipeline stack for an application configuration group",
    long_about = None,
    after_help = "Examples:\n\
        acs-pipeline synth --config config/dev.yaml        Render build instructions and write the stack\n\
        acs-pipeline validate -c config/dev.yaml           Check a configuration file\n\
        acs-pipeline graph -c config/dev.yaml -f mermaid   Show the pipeline topology\n\n\
        See 'acs-pipeline <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render build instructions, build the stack and submit it
    Synth {
        #[clap(flatten)]
        config: ConfigArgs,

        /// Account permissions are scoped to (12 digits)
        #[clap(long, env = "CDK_DEFAULT_ACCOUNT", value_name = "ID")]
        account: Option<String>,

        /// Directory holding the build-instruction templates
        #[clap(long, default_value = crate::templates::DEFAULT_TEMPLATES_DIR, value_name = "DIR")]
        templates: PathBuf,

        /// Directory rendered build instructions are written to
        #[clap(long, default_value = crate::templates::DEFAULT_BUILD_DIR, value_name = "DIR")]
        build_dir: PathBuf,

        /// Directory the stack manifest is written to
        #[clap(short, long, default_value = crate::provision::DEFAULT_OUT_DIR, value_name = "DIR")]
        out: PathBuf,
    },

    /// Validate a configuration file and the pipeline built from it
    Validate {
        #[clap(flatten)]
        config: ConfigArgs,

        /// Output format
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the pipeline topology as a graph
    Graph {
        #[clap(flatten)]
        config: ConfigArgs,

        /// Account permissions are scoped to (12 digits)
        #[clap(long, env = "CDK_DEFAULT_ACCOUNT", value_name = "ID")]
        account: Option<String>,

        /// Output format
        #[clap(short, long, value_enum, default_value_t = GraphFormat::Text)]
        format: GraphFormat,
    },
}

/// Where the configuration file comes from
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file
    #[clap(short, long, env = "ACS_CONFIG_FILE", value_name = "PATH")]
    pub config: Option<String>,

    /// Context value (KEY=VALUE); `config-file-name` names the configuration file
    #[clap(long = "context", value_name = "KEY=VALUE")]
    pub context: Vec<String>,
}

impl ConfigArgs {
    /// Resolve the configuration path
    ///
    /// An explicit `--config` wins over the context. With neither, the path
    /// is blank and loading fails with [`AcsError::MissingPath`].
    pub fn resolve_path(&self) -> AcsResult<String> {
        let mut from_context = None;

        for entry in &self.context {
            let (key, value) = parse_context_entry(entry)?;
            if key == CONFIG_FILE_CONTEXT_KEY {
                from_context = Some(value.to_string());
            } else {
                debug!(key, "ignoring context value");
            }
        }

        Ok(self
            .config
            .clone()
            .or(from_context)
            .unwrap_or_default())
    }
}

/// Split a `KEY=VALUE` context entry
pub fn parse_context_entry(entry: &str) -> AcsResult<(&str, &str)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(AcsError::InvalidContext {
            entry: entry.to_string(),
            help: Some("Context values are written KEY=VALUE".to_string()),
        }),
    }
}

/// Parse the optional account flag
pub fn resolve_account(account: Option<&str>) -> AcsResult<DeployAccount> {
    match account.map(str::trim) {
        Some(id) if !id.is_empty() => DeployAccount::parse(id),
        _ => Ok(DeployAccount::default()),
    }
}

/// Output format for the validate command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}
