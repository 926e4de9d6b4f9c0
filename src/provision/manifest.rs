// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Manifest provisioner
//!
//! Writes the stack as a JSON manifest plus content-addressed copies of
//! its build instructions, the way a cloud assembly directory is laid out.

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{Provisioner, Submission};
use crate::errors::{AcsError, AcsResult};
use crate::stack::StackDefinition;

/// Default output directory
pub const DEFAULT_OUT_DIR: &str = "cdk.out";

/// A build-instruction file copied next to the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    /// Project the asset belongs to
    pub project: String,
    /// BLAKE3 digest of the file content
    pub hash: String,
    /// File name relative to the output directory
    pub file: String,
}

/// Manifest document written for each stack
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedStack<'a> {
    pub version: &'static str,
    pub stack: &'a StackDefinition,
    pub assets: &'a [AssetEntry],
}

/// Provisioner writing manifests to a directory
#[derive(Debug, Clone)]
pub struct ManifestProvisioner {
    out_dir: PathBuf,
}

impl ManifestProvisioner {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Path of the manifest for a stack
    pub fn manifest_path(&self, stack_name: &str) -> PathBuf {
        self.out_dir.join(format!("{}.template.json", stack_name))
    }

    /// Copy each project's build instructions under a content-addressed name
    fn write_assets(&self, stack: &StackDefinition) -> AcsResult<Vec<AssetEntry>> {
        let mut assets = Vec::with_capacity(stack.projects.len());

        for project in &stack.projects {
            let content = std::fs::read(&project.buildspec).map_err(|e| {
                AcsError::provisioning(format!(
                    "cannot read build instructions '{}' for project '{}': {}",
                    project.buildspec.display(),
                    project.id,
                    e
                ))
            })?;

            let hash = blake3::hash(&content).to_hex().to_string();
            let file = format!("asset.{}.yml", hash);
            let target = self.out_dir.join(&file);

            std::fs::write(&target, &content).map_err(|e| {
                AcsError::provisioning(format!("cannot write asset '{}': {}", target.display(), e))
            })?;

            debug!(project = %project.id, asset = %file, "asset staged");
            assets.push(AssetEntry {
                project: project.id.clone(),
                hash,
                file,
            });
        }

        Ok(assets)
    }
}

#[async_trait]
impl Provisioner for ManifestProvisioner {
    fn name(&self) -> &str {
        "manifest"
    }

    async fn submit(&self, stack: &StackDefinition) -> Result<Submission, AcsError> {
        std::fs::create_dir_all(&self.out_dir).map_err(|e| {
            AcsError::provisioning(format!(
                "cannot create output directory '{}': {}",
                self.out_dir.display(),
                e
            ))
        })?;

        let assets = self.write_assets(stack)?;

        let document = SynthesizedStack {
            version: "1",
            stack,
            assets: &assets,
        };
        let mut bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| AcsError::provisioning(format!("cannot serialize stack: {}", e)))?;
        bytes.push(b'\n');

        let location = self.manifest_path(&stack.name);
        std::fs::write(&location, &bytes).map_err(|e| {
            AcsError::provisioning(format!("cannot write '{}': {}", location.display(), e))
        })?;

        let digest = blake3::hash(&bytes).to_hex().to_string();
        info!(
            stack = %stack.name,
            location = %location.display(),
            digest = %digest,
            "stack submitted"
        );

        Ok(Submission {
            stack_name: stack.name.clone(),
            location,
            digest,
            assets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::stack::{DeployAccount, StackBuilder, BUILDSPEC_DIFF, BUILDSPEC_UPDATE};
    use std::path::Path;
    use tempfile::TempDir;

    fn stack(build_dir: &Path) -> StackDefinition {
        let config = Configuration::from_yaml(
            r#"
configuration-group-prefix: "abc"
github-repo-owner: "octo-org"
source-github-repo-name: "app-config"
source-github-repo-branch: "main"
cicd-github-repo-name: "app-config-cicd"
cicd-github-repo-branch: "main"
manual-approval-notify-email: "ops@example.com"
"#,
        )
        .unwrap();

        StackBuilder::new(DeployAccount::Id("123456789012".into()), build_dir).build(&config)
    }

    fn write_buildspecs(dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(BUILDSPEC_DIFF), "diff abc\n").unwrap();
        std::fs::write(dir.join(BUILDSPEC_UPDATE), "update abc\n").unwrap();
    }

    #[tokio::test]
    async fn test_submit_writes_manifest_and_assets() {
        let temp = TempDir::new().unwrap();
        let build = temp.path().join("build");
        write_buildspecs(&build);

        let provisioner = ManifestProvisioner::new(temp.path().join("out"));
        let submission = provisioner.submit(&stack(&build)).await.unwrap();

        assert_eq!(submission.stack_name, "acs-codepipeline-abc");
        assert_eq!(
            submission.location,
            temp.path().join("out").join("acs-codepipeline-abc.template.json")
        );
        assert_eq!(submission.assets.len(), 2);
        for asset in &submission.assets {
            assert!(temp.path().join("out").join(&asset.file).is_file());
        }

        let manifest: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&submission.location).unwrap()).unwrap();
        assert_eq!(manifest["stack"]["name"], "acs-codepipeline-abc");
        assert_eq!(manifest["stack"]["terminationProtection"], true);
        assert_eq!(manifest["stack"]["pipeline"]["stages"][0]["name"], "Checkout_Source");
        assert_eq!(manifest["assets"][0]["project"], "TheDiffCodeBuild");
        assert_eq!(manifest["stack"]["pipeline"]["pipelineType"], "V1");
        assert_eq!(manifest["stack"]["artifactBucket"]["removalPolicy"], "DESTROY");
        assert_eq!(manifest["stack"]["logGroups"][0]["removalPolicy"], "DESTROY");
    }

    #[tokio::test]
    async fn test_submit_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let build = temp.path().join("build");
        write_buildspecs(&build);

        let provisioner = ManifestProvisioner::new(temp.path().join("out"));
        let first = provisioner.submit(&stack(&build)).await.unwrap();
        let second = provisioner.submit(&stack(&build)).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_buildspec_is_provisioning_error() {
        let temp = TempDir::new().unwrap();
        let provisioner = ManifestProvisioner::new(temp.path().join("out"));

        let result = provisioner.submit(&stack(&temp.path().join("build"))).await;
        assert!(matches!(result, Err(AcsError::ProvisioningError { .. })));
        assert!(!provisioner.manifest_path("acs-codepipeline-abc").exists());
    }
}
