// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Pipeline topology
//!
//! This module defines the ordered stage/action/artifact graph of the
//! delivery pipeline, how it is built from a configuration, and how it is
//! checked before submission.

mod builder;
mod definition;
mod graph;
mod validation;

pub use builder::*;
pub use definition::*;
pub use graph::{ActionNode, ArtifactEdge, ArtifactGraph};
pub use validation::{TopologyValidator, ValidationResult};
