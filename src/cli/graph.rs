// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Graph command - visualize the pipeline topology

use miette::Result;

use super::{resolve_account, ConfigArgs, GraphFormat};
use crate::config::Configuration;
use crate::synth::plan;
use crate::templates::DEFAULT_BUILD_DIR;
use crate::topology::ArtifactGraph;

/// Run the graph command
pub async fn run(
    config: ConfigArgs,
    account: Option<String>,
    format: GraphFormat,
    _verbose: bool,
) -> Result<()> {
    let configuration = Configuration::load(&config.resolve_path()?)?;
    let (stack, _) = plan(
        &configuration,
        resolve_account(account.as_deref())?,
        DEFAULT_BUILD_DIR,
    )?;

    let graph = ArtifactGraph::build(&stack.pipeline)?;

    let output = match format {
        GraphFormat::Text => graph.to_text(&stack.pipeline),
        GraphFormat::Dot => graph.to_dot(&stack.pipeline),
        GraphFormat::Mermaid => graph.to_mermaid(&stack.pipeline),
    };

    println!("{}", output);

    Ok(())
}
