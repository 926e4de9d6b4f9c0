// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Stack definition
//!
//! The stack is everything handed to the provisioner in one submission:
//! its identity and tags, the supporting resources (artifact bucket, log
//! groups, build projects and their policies) and the pipeline topology.

mod account;
mod builder;

pub use account::DeployAccount;
pub use builder::{
    StackBuilder, ARTIFACT_BUCKET_ID, BUILDSPEC_DIFF, BUILDSPEC_UPDATE, DIFF_LOG_GROUP_ID,
    DIFF_PROJECT_ID, GITHUB_TOKEN_SECRET, PIPELINE_ID, UPDATE_LOG_GROUP_ID, UPDATE_PROJECT_ID,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::topology::{Action, ActionKind, Topology};

/// Everything submitted to the provisioner for one configuration group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackDefinition {
    /// Stack name, unique per configuration group
    pub name: String,

    pub description: String,

    /// Tags applied to every resource in the stack
    pub tags: BTreeMap<String, String>,

    pub termination_protection: bool,

    /// Account every policy resource is scoped to
    pub account: DeployAccount,

    pub artifact_bucket: BucketSpec,

    pub log_groups: Vec<LogGroupSpec>,

    pub projects: Vec<BuildProject>,

    pub pipeline: Topology,
}

impl StackDefinition {
    /// Get a build project by logical id
    pub fn get_project(&self, id: &str) -> Option<&BuildProject> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Get a log group by logical id
    pub fn get_log_group(&self, id: &str) -> Option<&LogGroupSpec> {
        self.log_groups.iter().find(|g| g.id == id)
    }

    /// Build project run by an action, if it is a build action
    pub fn project_for(&self, action: &Action) -> Option<&BuildProject> {
        match &action.kind {
            ActionKind::Build { project } => self.get_project(project),
            _ => None,
        }
    }
}

/// What happens to a resource when the stack is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemovalPolicy {
    Destroy,
}

/// Artifact storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSpec {
    pub id: String,
    pub removal_policy: RemovalPolicy,
    pub auto_delete_objects: bool,
    pub lifecycle_rules: Vec<LifecycleRule>,
}

/// Object expiration rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRule {
    pub expiration_days: u32,
}

/// Log group receiving build output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogGroupSpec {
    pub id: String,
    pub retention_days: u32,
    pub removal_policy: RemovalPolicy,
}

/// Build project executed by a build action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildProject {
    pub id: String,

    pub description: String,

    /// Rendered build instructions
    pub buildspec: PathBuf,

    pub environment: BuildEnvironment,

    pub grant_report_group_permissions: bool,

    /// Maximum simultaneous builds of this project
    pub concurrent_build_limit: u32,

    /// Logical id of the log group the build logs to
    pub log_group: String,

    /// Permissions granted to the build role
    pub policy_statements: Vec<PolicyStatement>,
}

impl BuildProject {
    /// Check whether any statement grants `action`
    pub fn grants(&self, action: &str) -> bool {
        self.policy_statements
            .iter()
            .any(|s| s.actions.iter().any(|a| a == action))
    }
}

/// Build container settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildEnvironment {
    pub build_image: String,
    pub compute_type: String,
}

/// A single permission grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

impl PolicyStatement {
    pub fn new<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether any action is a whole-service wildcard such as `appconfig:*`
    pub fn has_service_wildcard(&self) -> bool {
        self.actions.iter().any(|a| a == "*" || a.ends_with(":*"))
    }
}
