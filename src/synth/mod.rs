// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Synthesis
//!
//! Runs the whole definition step: load the configuration, render the
//! build instructions, build and check the stack, then submit it. Any
//! failure before submission returns before the provisioner is called.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Configuration;
use crate::errors::{AcsError, AcsResult};
use crate::provision::{Provisioner, Submission};
use crate::stack::{DeployAccount, StackBuilder, StackDefinition};
use crate::templates::{
    BuildspecRenderer, RenderedTemplate, DEFAULT_BUILD_DIR, DEFAULT_TEMPLATES_DIR,
};
use crate::topology::TopologyValidator;

/// Options for a synthesis run
#[derive(Debug, Clone)]
pub struct SynthOptions {
    /// Configuration file path (may be blank, which fails the run)
    pub config_path: String,
    /// Directory holding the build-instruction templates
    pub templates_dir: PathBuf,
    /// Directory rendered build instructions are written to
    pub build_dir: PathBuf,
    /// Account permissions are scoped to
    pub account: DeployAccount,
}

impl SynthOptions {
    pub fn new(config_path: impl Into<String>) -> Self {
        Self {
            config_path: config_path.into(),
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            account: DeployAccount::default(),
        }
    }
}

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct SynthOutcome {
    pub stack: StackDefinition,
    pub rendered: Vec<RenderedTemplate>,
    pub warnings: Vec<String>,
    pub submission: Submission,
}

/// Build a stack and check it, without touching the filesystem
///
/// Returns the stack together with validation warnings; validation errors
/// become [`AcsError::InvalidTopology`].
pub fn plan(
    config: &Configuration,
    account: DeployAccount,
    build_dir: impl Into<PathBuf>,
) -> AcsResult<(StackDefinition, Vec<String>)> {
    let stack = StackBuilder::new(account, build_dir).build(config);
    let validation = TopologyValidator::validate(&stack);

    if !validation.is_valid() {
        return Err(AcsError::InvalidTopology {
            reason: validation.errors.join("; "),
        });
    }

    for warning in &validation.warnings {
        warn!(stack = %stack.name, "{}", warning);
    }

    Ok((stack, validation.warnings))
}

/// Run the full definition step and submit the result
pub async fn synthesize(
    options: &SynthOptions,
    provisioner: &dyn Provisioner,
) -> AcsResult<SynthOutcome> {
    let config = Configuration::load(&options.config_path)?;

    let renderer = BuildspecRenderer::new(&options.templates_dir, &options.build_dir);
    let rendered = renderer.render(config.configuration_group_prefix())?;

    let (stack, warnings) = plan(&config, options.account.clone(), &options.build_dir)?;

    if let Some(missing) = TopologyValidator::validate_files(&stack).into_iter().next() {
        return Err(AcsError::render_failure(&options.build_dir, missing));
    }

    info!(stack = %stack.name, provisioner = provisioner.name(), "submitting stack");
    let submission = provisioner.submit(&stack).await?;

    Ok(SynthOutcome {
        stack,
        rendered,
        warnings,
        submission,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::{BUILDSPEC_DIFF, BUILDSPEC_UPDATE};
    use crate::topology::STAGE_ORDER;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
configuration-group-prefix: "abc"
github-repo-owner: "o"
source-github-repo-name: "s"
source-github-repo-branch: "b"
cicd-github-repo-name: "c"
cicd-github-repo-branch: "d"
manual-approval-notify-email: "e"
"#;

    /// Records submitted stack names instead of provisioning anything
    #[derive(Default)]
    struct RecordingProvisioner {
        submitted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Provisioner for RecordingProvisioner {
        fn name(&self) -> &str {
            "recording"
        }

        async fn submit(&self, stack: &StackDefinition) -> Result<Submission, AcsError> {
            self.submitted.lock().unwrap().push(stack.name.clone());
            Ok(Submission {
                stack_name: stack.name.clone(),
                location: PathBuf::from("memory"),
                digest: String::new(),
                assets: vec![],
            })
        }
    }

    struct FailingProvisioner;

    #[async_trait]
    impl Provisioner for FailingProvisioner {
        fn name(&self) -> &str {
            "failing"
        }

        async fn submit(&self, _stack: &StackDefinition) -> Result<Submission, AcsError> {
            Err(AcsError::provisioning("rejected"))
        }
    }

    fn setup_project(config: &str) -> (TempDir, SynthOptions) {
        let temp = TempDir::new().unwrap();
        let templates = temp.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::write(templates.join(BUILDSPEC_DIFF), "diff ${configGroupPrefix}\n").unwrap();
        std::fs::write(templates.join(BUILDSPEC_UPDATE), "update ${configGroupPrefix}\n").unwrap();

        let config_path = temp.path().join("config.yaml");
        std::fs::write(&config_path, config).unwrap();

        let options = SynthOptions {
            config_path: config_path.to_string_lossy().to_string(),
            templates_dir: templates,
            build_dir: temp.path().join("build"),
            account: DeployAccount::default(),
        };

        (temp, options)
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[tokio::test]
    async fn test_minimal_configuration_end_to_end() {
        let (temp, options) = setup_project(MINIMAL);
        let provisioner = RecordingProvisioner::default();

        let outcome = synthesize(&options, &provisioner).await.unwrap();

        assert_eq!(outcome.stack.pipeline.stage_names(), STAGE_ORDER.to_vec());
        assert_eq!(outcome.rendered.len(), 2);
        assert!(outcome.warnings.is_empty());
        assert_eq!(
            *provisioner.submitted.lock().unwrap(),
            vec!["acs-codepipeline-abc".to_string()]
        );
        assert_eq!(read(&temp.path().join("build").join(BUILDSPEC_DIFF)), "diff abc\n");
    }

    #[tokio::test]
    async fn test_blank_email_submits_nothing() {
        let (temp, options) = setup_project(&MINIMAL.replace("\"e\"", "\"\""));
        let provisioner = RecordingProvisioner::default();

        let err = synthesize(&options, &provisioner).await.unwrap_err();

        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "manual-approval-notify-email");
        assert!(provisioner.submitted.lock().unwrap().is_empty());
        assert!(!temp.path().join("build").exists());
    }

    #[tokio::test]
    async fn test_blank_path_submits_nothing() {
        let (_temp, mut options) = setup_project(MINIMAL);
        options.config_path = String::new();
        let provisioner = RecordingProvisioner::default();

        let result = synthesize(&options, &provisioner).await;
        assert!(matches!(result, Err(AcsError::MissingPath)));
        assert!(provisioner.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_template_failure_submits_nothing() {
        let (temp, options) = setup_project(MINIMAL);
        std::fs::remove_file(temp.path().join("templates").join(BUILDSPEC_DIFF)).unwrap();
        let provisioner = RecordingProvisioner::default();

        let result = synthesize(&options, &provisioner).await;
        assert!(matches!(result, Err(AcsError::TemplateRenderFailure { .. })));
        assert!(provisioner.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provisioning_error_is_surfaced() {
        let (_temp, options) = setup_project(MINIMAL);

        let result = synthesize(&options, &FailingProvisioner).await;
        assert!(matches!(result, Err(AcsError::ProvisioningError { .. })));
    }

    #[test]
    fn test_plan_twice_is_identical() {
        let config = Configuration::from_yaml(MINIMAL).unwrap();

        let (first, _) = plan(&config, DeployAccount::default(), "build").unwrap();
        let (second, _) = plan(&config, DeployAccount::default(), "build").unwrap();
        assert_eq!(first, second);
    }
}
