// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Build-instruction rendering
//!
//! The diff and update build projects read their instructions from files
//! rendered here: every template in the templates directory gets the
//! configuration group prefix substituted in and is written under the same
//! name into the build output directory.

use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::errors::{AcsError, AcsResult};
use crate::stack::{BUILDSPEC_DIFF, BUILDSPEC_UPDATE};

/// The only variable templates may reference
pub const PREFIX_VARIABLE: &str = "configGroupPrefix";

/// Default directory holding the templates
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Default directory rendered files are written to
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Templates that must exist for the stack to be buildable
pub const REQUIRED_TEMPLATES: [&str; 2] = [BUILDSPEC_DIFF, BUILDSPEC_UPDATE];

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}")
            .expect("placeholder pattern is a valid regex")
    })
}

/// A template written to the build output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// File name shared by template and output
    pub name: String,
    /// Where the rendered file was written
    pub path: PathBuf,
    /// Number of placeholders substituted
    pub placeholders: usize,
}

/// Renders build-instruction templates
#[derive(Debug, Clone)]
pub struct BuildspecRenderer {
    templates_dir: PathBuf,
    output_dir: PathBuf,
}

impl BuildspecRenderer {
    pub fn new(templates_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Render every template with `prefix` substituted
    ///
    /// Nothing is written until every template has rendered. Fails without
    /// retrying on the first I/O or substitution error.
    pub fn render(&self, prefix: &str) -> AcsResult<Vec<RenderedTemplate>> {
        let templates = self.list_templates()?;

        for required in REQUIRED_TEMPLATES {
            if !templates.iter().any(|path| file_name(path) == required) {
                return Err(AcsError::render_failure(
                    self.templates_dir.join(required),
                    "required template is missing",
                ));
            }
        }

        let mut pending = Vec::with_capacity(templates.len());
        for template in templates {
            let content = std::fs::read_to_string(&template)
                .map_err(|e| AcsError::render_failure(&template, e))?;
            let (output, placeholders) = substitute(&content, prefix)
                .map_err(|cause| AcsError::render_failure(&template, cause))?;
            pending.push((template, output, placeholders));
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            AcsError::render_failure(
                &self.output_dir,
                format!("cannot create output directory: {}", e),
            )
        })?;

        let mut rendered = Vec::with_capacity(pending.len());

        for (template, output, placeholders) in pending {
            let name = file_name(&template).to_string();
            let path = self.output_dir.join(&name);
            std::fs::write(&path, output).map_err(|e| AcsError::render_failure(&path, e))?;

            debug!(
                template = %template.display(),
                output = %path.display(),
                placeholders,
                "template rendered"
            );
            rendered.push(RenderedTemplate {
                name,
                path,
                placeholders,
            });
        }

        info!(
            count = rendered.len(),
            output_dir = %self.output_dir.display(),
            "build instructions rendered"
        );

        Ok(rendered)
    }

    /// Regular files directly inside the templates directory, sorted by name
    fn list_templates(&self) -> AcsResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.templates_dir)
            .map_err(|e| AcsError::render_failure(&self.templates_dir, e))?;

        let mut templates = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| AcsError::render_failure(&self.templates_dir, e))?
                .path();

            if path.is_file() {
                templates.push(path);
            }
        }

        templates.sort();
        Ok(templates)
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Replace every `${configGroupPrefix}` in `content`
///
/// Returns the rendered text and the number of substitutions. Any other
/// variable is undefined and fails the render.
pub fn substitute(content: &str, prefix: &str) -> Result<(String, usize), String> {
    let regex = placeholder_regex();

    if let Some(unknown) = regex
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .find(|name| name != PREFIX_VARIABLE)
    {
        return Err(format!("undefined variable '{}'", unknown));
    }

    let count = regex.find_iter(content).count();
    let output = regex.replace_all(content, |_: &Captures| prefix.to_string());

    Ok((output.into_owned(), count))
}
