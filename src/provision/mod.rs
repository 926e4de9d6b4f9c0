// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Provisioning collaborators
//!
//! This module provides the provisioner trait the stack is submitted
//! through, and the bundled implementation that writes a synthesized
//! manifest to disk.

mod manifest;

pub use manifest::{AssetEntry, ManifestProvisioner, SynthesizedStack, DEFAULT_OUT_DIR};

use async_trait::async_trait;
use std::path::PathBuf;

use crate::errors::AcsError;
use crate::stack::StackDefinition;

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Name of the submitted stack
    pub stack_name: String,

    /// Where the provisioner recorded the stack
    pub location: PathBuf,

    /// BLAKE3 digest of the submitted description
    pub digest: String,

    /// Build-instruction assets shipped with the stack
    pub assets: Vec<AssetEntry>,
}

/// Trait for provisioning collaborators
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Short name used in logs and CLI output
    fn name(&self) -> &str;

    /// Submit a stack for provisioning
    ///
    /// Called at most once per run, with a stack that already passed
    /// validation. Failures are surfaced as-is; there is no retry.
    async fn submit(&self, stack: &StackDefinition) -> Result<Submission, AcsError>;
}
