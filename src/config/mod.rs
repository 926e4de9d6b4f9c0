// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Pipeline configuration
//!
//! Loads the YAML document that parameterizes the pipeline and turns it
//! into a validated, immutable [`Configuration`].

mod definition;
mod validation;

pub use definition::{ConfigDocument, Configuration};
pub use validation::{ConfigValidator, PREFIX_MESSAGE, PREFIX_PATTERN};
