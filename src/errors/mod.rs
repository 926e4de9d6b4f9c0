// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Error types
//!
//! Every failure aborts the run. The variants carry enough context for
//! miette to render a report that tells the operator what to fix.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for acs-pipeline operations
pub type AcsResult<T> = Result<T, AcsError>;

/// A single violated configuration rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// YAML key of the offending field
    pub field: String,
    /// Human-readable rule that was violated
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Main error type for acs-pipeline
#[derive(Error, Debug, Diagnostic)]
pub enum AcsError {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("No configuration file path supplied")]
    #[diagnostic(
        code(acs::missing_path),
        help("Pass --config <PATH>, set ACS_CONFIG_FILE, or use --context config-file-name=<PATH>")
    )]
    MissingPath,

    #[error("Failed to parse configuration '{path}': {cause}")]
    #[diagnostic(code(acs::parse_failure))]
    ParseFailure { path: PathBuf, cause: String },

    #[error("Configuration is invalid ({})", violation_count(.violations))]
    #[diagnostic(code(acs::validation_failure))]
    ValidationFailure {
        violations: Vec<Violation>,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid context value '{entry}'")]
    #[diagnostic(code(acs::invalid_context))]
    InvalidContext {
        entry: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Template Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to render template '{template}': {cause}")]
    #[diagnostic(
        code(acs::template_render_failure),
        help("Templates may only use the ${{configGroupPrefix}} placeholder")
    )]
    TemplateRenderFailure { template: PathBuf, cause: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Topology & Provisioning Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Pipeline topology is invalid: {reason}")]
    #[diagnostic(code(acs::invalid_topology))]
    InvalidTopology { reason: String },

    #[error("Provisioning failed: {message}")]
    #[diagnostic(code(acs::provisioning_error))]
    ProvisioningError { message: String },
}

fn violation_count(violations: &[Violation]) -> String {
    match violations.len() {
        1 => "1 violation".to_string(),
        n => format!("{} violations", n),
    }
}

impl AcsError {
    /// Build a validation failure from the collected violations
    pub fn validation(violations: Vec<Violation>) -> Self {
        let help = if violations.is_empty() {
            None
        } else {
            Some(
                violations
                    .iter()
                    .map(|v| format!("• {}", v))
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        };

        Self::ValidationFailure { violations, help }
    }

    /// Build a parse failure for the given document path
    pub fn parse_failure(path: impl Into<PathBuf>, cause: impl fmt::Display) -> Self {
        Self::ParseFailure {
            path: path.into(),
            cause: cause.to_string(),
        }
    }

    /// Build a render failure for the given template
    pub fn render_failure(template: impl Into<PathBuf>, cause: impl fmt::Display) -> Self {
        Self::TemplateRenderFailure {
            template: template.into(),
            cause: cause.to_string(),
        }
    }

    /// Build a provisioning error
    pub fn provisioning(message: impl Into<String>) -> Self {
        Self::ProvisioningError {
            message: message.into(),
        }
    }

    /// Violations carried by a validation failure, if any
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::ValidationFailure { violations, .. } => violations,
            _ => &[],
        }
    }

    /// Suggested next steps for this error
    pub fn recovery(&self) -> RecoverySuggestion {
        match self {
            Self::MissingPath => RecoverySuggestion::supply_config_path(),
            Self::ParseFailure { path, .. } => RecoverySuggestion::fix_yaml_document(path),
            Self::ValidationFailure { violations, .. } => {
                RecoverySuggestion::fix_violations(violations)
            }
            Self::TemplateRenderFailure { template, .. } => {
                RecoverySuggestion::fix_template(template)
            }
            Self::InvalidContext { entry, .. } => RecoverySuggestion::fix_context(entry),
            Self::InvalidTopology { .. } | Self::ProvisioningError { .. } => {
                RecoverySuggestion::inspect_graph()
            }
        }
    }
}
