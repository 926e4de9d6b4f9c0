// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Validate command - check a configuration and the pipeline built from it

use colored::Colorize;
use miette::Result;
use serde_json::json;

use super::{ConfigArgs, OutputFormat};
use crate::config::Configuration;
use crate::errors::AcsError;
use crate::stack::{DeployAccount, StackBuilder};
use crate::templates::DEFAULT_BUILD_DIR;
use crate::topology::TopologyValidator;

/// Run the validate command
pub async fn run(config: ConfigArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let path = config.resolve_path()?;

    let loaded = Configuration::load(&path);

    if format == OutputFormat::Json {
        return report_json(&path, loaded);
    }

    println!("{}", "Validating configuration...".bold());
    println!();

    let configuration = match loaded {
        Ok(c) => c,
        Err(e) => {
            if e.violations().is_empty() {
                eprintln!("  {} Failed to load configuration", "✗".red());
            } else {
                println!("{}:", "Violations".red().bold());
                for violation in e.violations() {
                    println!("  {} {}", "✗".red(), violation);
                }
            }
            eprintln!();
            return Err(e.into());
        }
    };

    println!("  {} Configuration is valid", "✓".green());

    let stack =
        StackBuilder::new(DeployAccount::default(), DEFAULT_BUILD_DIR).build(&configuration);
    let validation = TopologyValidator::validate(&stack);

    if !validation.errors.is_empty() {
        println!();
        println!("{}:", "Errors".red().bold());
        for error in &validation.errors {
            println!("  {} {}", "✗".red(), error);
        }
    } else {
        println!("  {} Pipeline topology is valid", "✓".green());
    }

    if !validation.warnings.is_empty() {
        println!();
        println!("{}:", "Warnings".yellow().bold());
        for warning in &validation.warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }

    if verbose {
        println!();
        println!("{}:", "Pipeline summary".bold());
        println!("  Stack: {}", stack.name);
        for stage in &stack.pipeline.stages {
            for action in &stage.actions {
                println!(
                    "    - {} / {} ({})",
                    stage.name,
                    action.name,
                    action.kind_name().dimmed()
                );
            }
        }
    }

    println!();

    if validation.is_valid() {
        println!("{}", "Configuration is valid!".green().bold());
        Ok(())
    } else {
        Err(AcsError::InvalidTopology {
            reason: validation.errors.join("; "),
        }
        .into())
    }
}

/// Print a machine-readable report
fn report_json(path: &str, loaded: Result<Configuration, AcsError>) -> Result<()> {
    let (report, failure) = match loaded {
        Ok(configuration) => {
            let stack = StackBuilder::new(DeployAccount::default(), DEFAULT_BUILD_DIR)
                .build(&configuration);
            let validation = TopologyValidator::validate(&stack);
            let report = json!({
                "config": path,
                "valid": validation.is_valid(),
                "stack": stack.name,
                "violations": [],
                "errors": validation.errors,
                "warnings": validation.warnings,
            });
            let failure = (!validation.is_valid()).then(|| AcsError::InvalidTopology {
                reason: validation.errors.join("; "),
            });
            (report, failure)
        }
        Err(e) => {
            let report = json!({
                "config": path,
                "valid": false,
                "violations": e.violations(),
                "errors": [e.to_string()],
                "warnings": [],
            });
            (report, Some(e))
        }
    };

    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| miette::miette!("Failed to serialize report: {}", e))?;
    println!("{}", rendered);

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
