// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Stack builder
//!
//! Assembles the supporting resources around the pipeline topology.

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

use super::{
    BucketSpec, BuildEnvironment, BuildProject, DeployAccount, LifecycleRule, LogGroupSpec,
    PolicyStatement, RemovalPolicy, StackDefinition,
};
use crate::config::Configuration;
use crate::topology::TopologyBuilder;

pub const PIPELINE_ID: &str = "TheCodePipeline";
pub const ARTIFACT_BUCKET_ID: &str = "TheCodePipelineBucket";
pub const DIFF_PROJECT_ID: &str = "TheDiffCodeBuild";
pub const UPDATE_PROJECT_ID: &str = "TheUpdateCodeBuild";
pub const DIFF_LOG_GROUP_ID: &str = "TheDiffCodeBuildLogGroup";
pub const UPDATE_LOG_GROUP_ID: &str = "TheUpdateCodeBuildLogGroup";

pub const BUILDSPEC_DIFF: &str = "buildspec-diff.yml";
pub const BUILDSPEC_UPDATE: &str = "buildspec-update.yml";

/// Logical name of the GitHub token secret
pub const GITHUB_TOKEN_SECRET: &str = "github-token";

const STACK_NAME_PREFIX: &str = "acs-codepipeline-";
const GROUP_PREFIX_TAG: &str = "app.config.group.prefix";
const APP_TAG: &str = "app";
const APP_TAG_VALUE: &str = "application-configuration-store";

const RETENTION_DAYS: u32 = 14;
const BUILD_IMAGE: &str = "aws/codebuild/amazonlinux-aarch64-lambda-standard:corretto21";
const COMPUTE_TYPE: &str = "BUILD_LAMBDA_4GB";

const STS_ASSUME_ROLE: &str = "sts:AssumeRole";

/// Builds a [`StackDefinition`] from a configuration
#[derive(Debug, Clone)]
pub struct StackBuilder {
    account: DeployAccount,
    build_dir: PathBuf,
}

impl StackBuilder {
    /// Create a builder scoping permissions to `account` and reading
    /// rendered build instructions from `build_dir`
    pub fn new(account: DeployAccount, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            account,
            build_dir: build_dir.into(),
        }
    }

    /// Build the stack for a configuration
    pub fn build(&self, config: &Configuration) -> StackDefinition {
        let prefix = config.configuration_group_prefix();

        let mut tags = BTreeMap::new();
        tags.insert(GROUP_PREFIX_TAG.to_string(), prefix.to_string());
        tags.insert(APP_TAG.to_string(), APP_TAG_VALUE.to_string());

        let stack = StackDefinition {
            name: format!("{}{}", STACK_NAME_PREFIX, prefix),
            description: format!(
                "create AWS CodePipeline and related resources for \
                 application-configuration-store-cicd for configuration group: {}",
                prefix
            ),
            tags,
            termination_protection: true,
            account: self.account.clone(),
            artifact_bucket: BucketSpec {
                id: ARTIFACT_BUCKET_ID.into(),
                removal_policy: RemovalPolicy::Destroy,
                auto_delete_objects: true,
                lifecycle_rules: vec![LifecycleRule {
                    expiration_days: RETENTION_DAYS,
                }],
            },
            log_groups: vec![
                Self::log_group(DIFF_LOG_GROUP_ID),
                Self::log_group(UPDATE_LOG_GROUP_ID),
            ],
            projects: vec![self.diff_project(), self.update_project()],
            pipeline: TopologyBuilder::build(config),
        };

        debug!(stack = %stack.name, account = %self.account, "stack definition built");
        stack
    }

    fn log_group(id: &str) -> LogGroupSpec {
        LogGroupSpec {
            id: id.into(),
            retention_days: RETENTION_DAYS,
            removal_policy: RemovalPolicy::Destroy,
        }
    }

    /// Read-only project computing the planned changes
    fn diff_project(&self) -> BuildProject {
        self.project(
            DIFF_PROJECT_ID,
            BUILDSPEC_DIFF,
            "Display planned AppConfig updates in build log",
            DIFF_LOG_GROUP_ID,
            vec![
                PolicyStatement::new(
                    [STS_ASSUME_ROLE],
                    [self.account.role_arn("cdk-*-lookup-role-*")],
                ),
                PolicyStatement::new(
                    ["appconfig:Get*", "appconfig:List*"],
                    [self.account.appconfig_arn()],
                ),
            ],
        )
    }

    /// Mutating project applying the approved changes
    fn update_project(&self) -> BuildProject {
        self.project(
            UPDATE_PROJECT_ID,
            BUILDSPEC_UPDATE,
            "Deploy planned AppConfig updates",
            UPDATE_LOG_GROUP_ID,
            vec![
                PolicyStatement::new(
                    [STS_ASSUME_ROLE],
                    [self.account.role_arn("cdk-*-deploy-role-*")],
                ),
                PolicyStatement::new(
                    [STS_ASSUME_ROLE],
                    [self.account.role_arn("cdk-*-file-publishing-role-*")],
                ),
                PolicyStatement::new(["appconfig:*"], [self.account.appconfig_arn()]),
            ],
        )
    }

    fn project(
        &self,
        id: &str,
        buildspec: &str,
        description: &str,
        log_group: &str,
        policy_statements: Vec<PolicyStatement>,
    ) -> BuildProject {
        BuildProject {
            id: id.into(),
            description: description.into(),
            buildspec: self.build_dir.join(buildspec),
            environment: BuildEnvironment {
                build_image: BUILD_IMAGE.into(),
                compute_type: COMPUTE_TYPE.into(),
            },
            grant_report_group_permissions: false,
            concurrent_build_limit: 1,
            log_group: log_group.into(),
            policy_statements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Configuration {
        Configuration::from_yaml(
            r#"
configuration-group-prefix: "X9z"
github-repo-owner: "octo-org"
source-github-repo-name: "app-config"
source-github-repo-branch: "main"
cicd-github-repo-name: "app-config-cicd"
cicd-github-repo-branch: "main"
manual-approval-notify-email: "ops@example.com"
"#,
        )
        .unwrap()
    }

    fn builder() -> StackBuilder {
        StackBuilder::new(DeployAccount::Id("123456789012".into()), "build")
    }

    #[test]
    fn test_stack_identity() {
        let stack = builder().build(&config());

        assert_eq!(stack.name, "acs-codepipeline-X9z");
        assert!(stack.description.ends_with("configuration group: X9z"));
        assert!(stack.termination_protection);
        assert_eq!(stack.tags.get("app.config.group.prefix").unwrap(), "X9z");
        assert_eq!(
            stack.tags.get("app").unwrap(),
            "application-configuration-store"
        );
    }

    #[test]
    fn test_supporting_resources() {
        let stack = builder().build(&config());

        assert_eq!(stack.artifact_bucket.removal_policy, RemovalPolicy::Destroy);
        assert!(stack.artifact_bucket.auto_delete_objects);
        assert_eq!(stack.artifact_bucket.lifecycle_rules[0].expiration_days, 14);

        for id in [DIFF_LOG_GROUP_ID, UPDATE_LOG_GROUP_ID] {
            let group = stack.get_log_group(id).unwrap();
            assert_eq!(group.retention_days, 14);
        }
    }

    #[test]
    fn test_projects_serialize_builds() {
        let stack = builder().build(&config());

        for project in &stack.projects {
            assert_eq!(project.concurrent_build_limit, 1);
            assert!(!project.grant_report_group_permissions);
            assert!(stack.get_log_group(&project.log_group).is_some());
        }

        let diff = stack.get_project(DIFF_PROJECT_ID).unwrap();
        assert_eq!(diff.buildspec, PathBuf::from("build").join(BUILDSPEC_DIFF));
    }

    #[test]
    fn test_diff_project_is_read_only() {
        let stack = builder().build(&config());
        let diff = stack.get_project(DIFF_PROJECT_ID).unwrap();

        assert!(diff.grants("appconfig:Get*"));
        assert!(diff.grants("appconfig:List*"));
        assert!(!diff.grants("appconfig:*"));
        assert!(diff
            .policy_statements
            .iter()
            .all(|s| !s.has_service_wildcard()));

        let roles: Vec<_> = diff
            .policy_statements
            .iter()
            .filter(|s| s.actions == vec![STS_ASSUME_ROLE.to_string()])
            .flat_map(|s| s.resources.iter())
            .collect();
        assert_eq!(roles, vec!["arn:aws:iam::123456789012:role/cdk-*-lookup-role-*"]);
    }

    #[test]
    fn test_update_project_grants() {
        let stack = builder().build(&config());
        let update = stack.get_project(UPDATE_PROJECT_ID).unwrap();

        assert!(update.grants("appconfig:*"));

        let resources: Vec<_> = update
            .policy_statements
            .iter()
            .flat_map(|s| s.resources.iter().map(String::as_str))
            .collect();
        assert_eq!(
            resources,
            vec![
                "arn:aws:iam::123456789012:role/cdk-*-deploy-role-*",
                "arn:aws:iam::123456789012:role/cdk-*-file-publishing-role-*",
                "arn:aws:appconfig:*:123456789012:*",
            ]
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = config();
        assert_eq!(builder().build(&config), builder().build(&config));
    }
}
