// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for recovering from errors.

use std::path::Path;

use super::Violation;

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest supplying the configuration file path
    pub fn supply_config_path() -> Self {
        Self {
            action: "Point acs-pipeline at a configuration file".into(),
            steps: vec![
                "The configuration file path is the only required startup parameter".into(),
                "Supply it as a flag, an environment variable or a context value".into(),
            ],
            commands: vec![
                "acs-pipeline synth --config config/dev.yaml".into(),
                "ACS_CONFIG_FILE=config/dev.yaml acs-pipeline synth".into(),
                "acs-pipeline synth --context config-file-name=config/dev.yaml".into(),
            ],
        }
    }

    /// Suggest fixing an unreadable or malformed document
    pub fn fix_yaml_document(path: &Path) -> Self {
        Self {
            action: format!("Fix {}", path.display()),
            steps: vec![
                "Check that the file exists and is readable".into(),
                "Check for common YAML issues:".into(),
                "  • Keys are kebab-case (e.g. configuration-group-prefix)".into(),
                "  • Every value is a plain string".into(),
                "  • No keys other than the seven documented ones".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest fixing every reported violation
    pub fn fix_violations(violations: &[Violation]) -> Self {
        Self {
            action: "Correct the configuration values".into(),
            steps: violations
                .iter()
                .map(|v| format!("{} → {}", v.field, v.reason))
                .collect(),
            commands: vec![
                "# Re-check without rendering or submitting:".into(),
                "acs-pipeline validate --config <PATH>".into(),
            ],
        }
    }

    /// Suggest fixing a build-instruction template
    pub fn fix_template(template: &Path) -> Self {
        Self {
            action: format!("Fix template {}", template.display()),
            steps: vec![
                "Both buildspec-diff.yml and buildspec-update.yml must exist".into(),
                "The only supported placeholder is ${configGroupPrefix}".into(),
                "The build output directory must be writable".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest fixing a malformed context entry
    pub fn fix_context(entry: &str) -> Self {
        Self {
            action: format!("Fix context value '{}'", entry),
            steps: vec![
                "Context values are KEY=VALUE pairs".into(),
                "Account ids are 12 digits".into(),
            ],
            commands: vec!["acs-pipeline synth --context config-file-name=config/dev.yaml".into()],
        }
    }

    /// Suggest inspecting the pipeline graph
    pub fn inspect_graph() -> Self {
        Self {
            action: "Inspect the generated pipeline".into(),
            steps: vec![
                "Stages must run Checkout_Source → Get_Diffs → Approve_Deploy → Update_Diffs".into(),
                "Artifacts may only flow into later stages".into(),
            ],
            commands: vec![
                "# Visualize the pipeline:".into(),
                "acs-pipeline graph --config <PATH> --format mermaid".into(),
            ],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
