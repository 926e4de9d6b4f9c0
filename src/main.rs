// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! acs-pipeline - Application configuration store delivery pipeline
//!
//! Define the CI/CD pipeline stack for a configuration group.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use acs_pipeline::cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "acs_pipeline=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Synth {
            config,
            account,
            templates,
            build_dir,
            out,
        } => {
            acs_pipeline::cli::synth::run(config, account, templates, build_dir, out, cli.verbose)
                .await
        }
        Commands::Validate { config, format } => {
            acs_pipeline::cli::validate::run(config, format, cli.verbose).await
        }
        Commands::Graph {
            config,
            account,
            format,
        } => acs_pipeline::cli::graph::run(config, account, format, cli.verbose).await,
    }
}
