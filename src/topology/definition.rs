// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Topology definition structures
//!
//! Plain values describing the pipeline: stages in order, the actions
//! inside each stage, and the artifacts that connect them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed stage order. Diff before approve before update.
pub const STAGE_ORDER: [&str; 4] = [
    CHECKOUT_SOURCE_STAGE,
    GET_DIFFS_STAGE,
    APPROVE_DEPLOY_STAGE,
    UPDATE_DIFFS_STAGE,
];

pub const CHECKOUT_SOURCE_STAGE: &str = "Checkout_Source";
pub const GET_DIFFS_STAGE: &str = "Get_Diffs";
pub const APPROVE_DEPLOY_STAGE: &str = "Approve_Deploy";
pub const UPDATE_DIFFS_STAGE: &str = "Update_Diffs";

/// Named artifact handle passed between actions
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Artifact(String);

impl Artifact {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pipeline execution model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineType {
    V1,
}

/// Pipeline topology submitted for provisioning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    /// Logical id of the pipeline resource
    pub name: String,

    pub pipeline_type: PipelineType,

    pub cross_account_keys: bool,

    pub enable_key_rotation: bool,

    /// Logical id of the bucket artifacts are stored in
    pub artifact_bucket: String,

    /// Stages in execution order
    pub stages: Vec<Stage>,
}

impl Topology {
    /// Get a stage by name
    pub fn get_stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Get all stage names in order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Iterate over every action with the index of its stage
    pub fn actions(&self) -> impl Iterator<Item = (usize, &Stage, &Action)> {
        self.stages
            .iter()
            .enumerate()
            .flat_map(|(idx, stage)| stage.actions.iter().map(move |action| (idx, stage, action)))
    }

    /// Find an action by name
    pub fn get_action(&self, name: &str) -> Option<&Action> {
        self.actions()
            .map(|(_, _, action)| action)
            .find(|action| action.name == name)
    }
}

/// A named phase of the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage name (unique within the pipeline)
    pub name: String,

    /// Actions in this stage; they have no ordering among themselves
    pub actions: Vec<Action>,
}

impl Stage {
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }
}

/// A unit of work within a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action name (unique within the pipeline)
    pub name: String,

    /// What the action does
    pub kind: ActionKind,

    /// Consumed artifacts; the first one is the primary input
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<Artifact>,

    /// Produced artifacts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Artifact>,
}

impl Action {
    /// Primary input, if any
    pub fn primary_input(&self) -> Option<&Artifact> {
        self.inputs.first()
    }

    /// Inputs after the primary one
    pub fn extra_inputs(&self) -> &[Artifact] {
        self.inputs.get(1..).unwrap_or(&[])
    }

    /// Short label for the kind of action
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ActionKind::Source { .. } => "source",
            ActionKind::Build { .. } => "build",
            ActionKind::ManualApproval { .. } => "approval",
        }
    }
}

/// Action kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActionKind {
    /// Fetch a GitHub repository
    #[serde(rename_all = "camelCase")]
    Source {
        owner: String,
        repo: String,
        branch: String,
        trigger: SourceTrigger,
        oauth_token: SecretRef,
    },

    /// Run a build project
    Build {
        /// Logical id of the build project
        project: String,
    },

    /// Suspend until a human approves or rejects
    #[serde(rename_all = "camelCase")]
    ManualApproval {
        notify_emails: Vec<String>,
        additional_information: String,
        /// Stage whose output the approver is asked to review
        review_stage: String,
    },
}

/// How a source action reacts to upstream changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceTrigger {
    /// Start the pipeline on every push to the branch
    Webhook,
    /// Never start the pipeline
    None,
}

/// Reference to a secret resolved by the provisioning platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub secret_name: String,
}

impl SecretRef {
    pub fn new(secret_name: impl Into<String>) -> Self {
        Self {
            secret_name: secret_name.into(),
        }
    }
}
