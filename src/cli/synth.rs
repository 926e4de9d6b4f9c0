// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Synth command - render build instructions and submit the stack

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{resolve_account, ConfigArgs};
use crate::provision::ManifestProvisioner;
use crate::synth::{synthesize, SynthOptions};
use crate::utils::{create_spinner, print_success, print_warning};

/// Run the synth command
pub async fn run(
    config: ConfigArgs,
    account: Option<String>,
    templates: PathBuf,
    build_dir: PathBuf,
    out: PathBuf,
    verbose: bool,
) -> Result<()> {
    let options = SynthOptions {
        config_path: config.resolve_path()?,
        templates_dir: templates,
        build_dir,
        account: resolve_account(account.as_deref())?,
    };
    let provisioner = ManifestProvisioner::new(out);

    let spinner = create_spinner("Synthesizing pipeline stack...");
    let outcome = match synthesize(&options, &provisioner).await {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("  {} Synthesis failed", "✗".red());
            eprintln!();
            eprintln!("{}", e.recovery());
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();

    for rendered in &outcome.rendered {
        print_success(&format!("Rendered {}", rendered.path.display()));
    }
    for warning in &outcome.warnings {
        print_warning(warning);
    }
    print_success(&format!(
        "Stack {} written to {}",
        outcome.submission.stack_name.bold(),
        outcome.submission.location.display()
    ));

    if verbose {
        println!();
        println!("{}:", "Stack summary".bold());
        println!("  Account: {}", outcome.stack.account);
        println!("  Stages: {}", outcome.stack.pipeline.stage_names().join(" → "));
        for asset in &outcome.submission.assets {
            println!("  Asset: {} {}", asset.project, asset.file.dimmed());
        }
        println!("  Digest: {}", outcome.submission.digest.dimmed());
    }

    Ok(())
}
