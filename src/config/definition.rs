// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Configuration definition structures
//!
//! Defines the schema of the pipeline configuration file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::config::ConfigValidator;
use crate::errors::{AcsError, AcsResult};

/// Configuration document as it appears on disk
///
/// Every field is optional here so that an absent key is reported by
/// [`ConfigValidator`] as a violation of that field rather than as a parse
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    #[serde(rename = "configuration-group-prefix", default)]
    pub configuration_group_prefix: Option<String>,

    #[serde(rename = "github-repo-owner", default)]
    pub github_repo_owner: Option<String>,

    #[serde(rename = "source-github-repo-name", default)]
    pub source_repo_name: Option<String>,

    #[serde(rename = "source-github-repo-branch", default)]
    pub source_repo_branch: Option<String>,

    #[serde(rename = "cicd-github-repo-name", default)]
    pub cicd_repo_name: Option<String>,

    #[serde(rename = "cicd-github-repo-branch", default)]
    pub cicd_repo_branch: Option<String>,

    #[serde(rename = "manual-approval-notify-email", default)]
    pub approval_notify_email: Option<String>,
}

impl ConfigDocument {
    /// Parse a document from YAML without validating it
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

/// Validated pipeline configuration
///
/// Only obtainable through [`Configuration::load`], [`Configuration::from_yaml`]
/// or [`Configuration::try_from`], all of which run the full rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    configuration_group_prefix: String,
    github_repo_owner: String,
    source_repo_name: String,
    source_repo_branch: String,
    cicd_repo_name: String,
    cicd_repo_branch: String,
    approval_notify_email: String,
}

impl Configuration {
    /// Load and validate the configuration file at `path`
    pub fn load(path: &str) -> AcsResult<Self> {
        if path.trim().is_empty() {
            return Err(AcsError::MissingPath);
        }

        let path = Path::new(path);
        debug!(path = %path.display(), "reading configuration");

        let content =
            std::fs::read_to_string(path).map_err(|e| AcsError::parse_failure(path, e))?;
        let document =
            ConfigDocument::from_yaml(&content).map_err(|e| AcsError::parse_failure(path, e))?;

        let configuration = Self::try_from(document)?;
        info!(
            prefix = %configuration.configuration_group_prefix,
            path = %path.display(),
            "configuration loaded"
        );

        Ok(configuration)
    }

    /// Parse and validate a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> AcsResult<Self> {
        let document =
            ConfigDocument::from_yaml(yaml).map_err(|e| AcsError::parse_failure("<inline>", e))?;
        Self::try_from(document)
    }

    pub fn configuration_group_prefix(&self) -> &str {
        &self.configuration_group_prefix
    }

    pub fn github_repo_owner(&self) -> &str {
        &self.github_repo_owner
    }

    pub fn source_repo_name(&self) -> &str {
        &self.source_repo_name
    }

    pub fn source_repo_branch(&self) -> &str {
        &self.source_repo_branch
    }

    pub fn cicd_repo_name(&self) -> &str {
        &self.cicd_repo_name
    }

    pub fn cicd_repo_branch(&self) -> &str {
        &self.cicd_repo_branch
    }

    pub fn approval_notify_email(&self) -> &str {
        &self.approval_notify_email
    }
}

impl TryFrom<ConfigDocument> for Configuration {
    type Error = AcsError;

    fn try_from(document: ConfigDocument) -> AcsResult<Self> {
        let violations = ConfigValidator::validate(&document);
        if !violations.is_empty() {
            return Err(AcsError::validation(violations));
        }

        // The validator guarantees every field is present and non-blank.
        Ok(Self {
            configuration_group_prefix: document.configuration_group_prefix.unwrap_or_default(),
            github_repo_owner: document.github_repo_owner.unwrap_or_default(),
            source_repo_name: document.source_repo_name.unwrap_or_default(),
            source_repo_branch: document.source_repo_branch.unwrap_or_default(),
            cicd_repo_name: document.cicd_repo_name.unwrap_or_default(),
            cicd_repo_branch: document.cicd_repo_branch.unwrap_or_default(),
            approval_notify_email: document.approval_notify_email.unwrap_or_default(),
        })
    }
}
