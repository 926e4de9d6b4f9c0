// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! # acs-pipeline - Application configuration store delivery pipeline
//!
//! `acs-pipeline` defines the CI/CD pipeline stack that delivers one
//! configuration group of the application configuration store.
//!
//! ## Features
//!
//! - **Strict configuration** - Typed loading with field-level violations
//! - **Fixed topology** - Checkout_Source, Get_Diffs, Approve_Deploy, Update_Diffs
//! - **Scoped permissions** - Every grant is bound to the deploying account
//! - **Reproducible output** - Same configuration, same manifest
//!
//! ## Quick Start
//!
//! ```bash
//! # Check a configuration file
//! acs-pipeline validate --config config/dev.yaml
//!
//! # Render build instructions and write the stack manifest
//! acs-pipeline synth --config config/dev.yaml --account 123456789012
//!
//! # Show the topology
//! acs-pipeline graph --config config/dev.yaml --format mermaid
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod provision;
pub mod stack;
pub mod synth;
pub mod templates;
pub mod topology;
pub mod utils;

// Re-export commonly used types
pub use config::Configuration;
pub use errors::{AcsError, AcsResult};
pub use provision::{Provisioner, Submission};
pub use stack::StackDefinition;
pub use synth::{synthesize, SynthOptions};
pub use topology::Topology;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
