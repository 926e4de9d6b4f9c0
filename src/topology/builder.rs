// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Pipeline topology builder
//!
//! Turns a validated configuration into the fixed four-stage pipeline.

use crate::config::Configuration;
use crate::stack::{
    ARTIFACT_BUCKET_ID, DIFF_PROJECT_ID, GITHUB_TOKEN_SECRET, PIPELINE_ID, UPDATE_PROJECT_ID,
};
use crate::topology::{
    Action, ActionKind, Artifact, PipelineType, SecretRef, SourceTrigger, Stage, Topology,
    APPROVE_DEPLOY_STAGE, CHECKOUT_SOURCE_STAGE, GET_DIFFS_STAGE, UPDATE_DIFFS_STAGE,
};

pub const SOURCE_OUTPUT: &str = "sourceOutput";
pub const CICD_SOURCE_OUTPUT: &str = "cicdSourceOutput";
pub const DIFF_OUTPUT: &str = "diffOutput";

pub const SOURCE_ACTION: &str = "GitHub_Source";
pub const CICD_SOURCE_ACTION: &str = "GitHub_CI_CD_Source";
pub const GET_DIFFS_ACTION: &str = "Get_Diffs";
pub const APPROVE_DEPLOY_ACTION: &str = "Approve_Deploy";
pub const UPDATE_DIFFS_ACTION: &str = "Update_Diffs";

const APPROVAL_INFORMATION: &str =
    "Please review the planned changes. Click on the 'View details' of the 'Get_Diffs' stage above";

/// Builds the pipeline topology
pub struct TopologyBuilder;

impl TopologyBuilder {
    /// Build the topology for a configuration
    pub fn build(config: &Configuration) -> Topology {
        let source_output = Artifact::new(SOURCE_OUTPUT);
        let cicd_source_output = Artifact::new(CICD_SOURCE_OUTPUT);
        let diff_output = Artifact::new(DIFF_OUTPUT);

        let checkout = Stage::new(
            CHECKOUT_SOURCE_STAGE,
            vec![
                Self::source_action(
                    SOURCE_ACTION,
                    config,
                    config.source_repo_name(),
                    config.source_repo_branch(),
                    SourceTrigger::Webhook,
                    source_output.clone(),
                ),
                Self::source_action(
                    CICD_SOURCE_ACTION,
                    config,
                    config.cicd_repo_name(),
                    config.cicd_repo_branch(),
                    SourceTrigger::None,
                    cicd_source_output.clone(),
                ),
            ],
        );

        let get_diffs = Stage::new(
            GET_DIFFS_STAGE,
            vec![Action {
                name: GET_DIFFS_ACTION.into(),
                kind: ActionKind::Build {
                    project: DIFF_PROJECT_ID.into(),
                },
                inputs: vec![source_output, cicd_source_output.clone()],
                outputs: vec![diff_output.clone()],
            }],
        );

        let approve = Stage::new(
            APPROVE_DEPLOY_STAGE,
            vec![Action {
                name: APPROVE_DEPLOY_ACTION.into(),
                kind: ActionKind::ManualApproval {
                    notify_emails: vec![config.approval_notify_email().to_string()],
                    additional_information: APPROVAL_INFORMATION.into(),
                    review_stage: GET_DIFFS_STAGE.into(),
                },
                inputs: vec![],
                outputs: vec![],
            }],
        );

        let update = Stage::new(
            UPDATE_DIFFS_STAGE,
            vec![Action {
                name: UPDATE_DIFFS_ACTION.into(),
                kind: ActionKind::Build {
                    project: UPDATE_PROJECT_ID.into(),
                },
                inputs: vec![diff_output, cicd_source_output],
                outputs: vec![],
            }],
        );

        Topology {
            name: PIPELINE_ID.into(),
            pipeline_type: PipelineType::V1,
            cross_account_keys: false,
            enable_key_rotation: false,
            artifact_bucket: ARTIFACT_BUCKET_ID.into(),
            stages: vec![checkout, get_diffs, approve, update],
        }
    }

    fn source_action(
        name: &str,
        config: &Configuration,
        repo: &str,
        branch: &str,
        trigger: SourceTrigger,
        output: Artifact,
    ) -> Action {
        Action {
            name: name.into(),
            kind: ActionKind::Source {
                owner: config.github_repo_owner().to_string(),
                repo: repo.to_string(),
                branch: branch.to_string(),
                trigger,
                oauth_token: SecretRef::new(GITHUB_TOKEN_SECRET),
            },
            inputs: vec![],
            outputs: vec![output],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::STAGE_ORDER;

    fn config() -> Configuration {
        Configuration::from_yaml(
            r#"
configuration-group-prefix: "abc"
github-repo-owner: "octo-org"
source-github-repo-name: "app-config"
source-github-repo-branch: "main"
cicd-github-repo-name: "app-config-cicd"
cicd-github-repo-branch: "release"
manual-approval-notify-email: "ops@example.com"
"#,
        )
        .unwrap()
    }

    fn artifacts(list: &[Artifact]) -> Vec<&str> {
        list.iter().map(|a| a.name()).collect()
    }

    #[test]
    fn test_stages_in_fixed_order() {
        let topology = TopologyBuilder::build(&config());
        assert_eq!(topology.stage_names(), STAGE_ORDER.to_vec());
    }

    #[test]
    fn test_checkout_sources() {
        let topology = TopologyBuilder::build(&config());
        let checkout = topology.get_stage(CHECKOUT_SOURCE_STAGE).unwrap();
        assert_eq!(checkout.actions.len(), 2);

        match &topology.get_action(SOURCE_ACTION).unwrap().kind {
            ActionKind::Source {
                owner,
                repo,
                branch,
                trigger,
                oauth_token,
            } => {
                assert_eq!(owner, "octo-org");
                assert_eq!(repo, "app-config");
                assert_eq!(branch, "main");
                assert_eq!(*trigger, SourceTrigger::Webhook);
                assert_eq!(oauth_token.secret_name, "github-token");
            }
            other => panic!("Expected source action, got {:?}", other),
        }

        match &topology.get_action(CICD_SOURCE_ACTION).unwrap().kind {
            ActionKind::Source {
                repo,
                branch,
                trigger,
                ..
            } => {
                assert_eq!(repo, "app-config-cicd");
                assert_eq!(branch, "release");
                assert_eq!(*trigger, SourceTrigger::None);
            }
            other => panic!("Expected source action, got {:?}", other),
        }
    }

    #[test]
    fn test_get_diffs_artifacts() {
        let topology = TopologyBuilder::build(&config());
        let action = topology.get_action(GET_DIFFS_ACTION).unwrap();

        assert_eq!(artifacts(&action.inputs), vec![SOURCE_OUTPUT, CICD_SOURCE_OUTPUT]);
        assert_eq!(artifacts(&action.outputs), vec![DIFF_OUTPUT]);
    }

    #[test]
    fn test_update_diffs_artifacts() {
        let topology = TopologyBuilder::build(&config());
        let action = topology.get_action(UPDATE_DIFFS_ACTION).unwrap();

        assert_eq!(artifacts(&action.inputs), vec![DIFF_OUTPUT, CICD_SOURCE_OUTPUT]);
        assert!(action.outputs.is_empty());
    }

    #[test]
    fn test_approval_gate() {
        let topology = TopologyBuilder::build(&config());
        let stage = topology.get_stage(APPROVE_DEPLOY_STAGE).unwrap();
        assert_eq!(stage.actions.len(), 1);

        let action = &stage.actions[0];
        assert!(action.inputs.is_empty());
        assert!(action.outputs.is_empty());

        match &action.kind {
            ActionKind::ManualApproval {
                notify_emails,
                review_stage,
                additional_information,
            } => {
                assert_eq!(notify_emails, &vec!["ops@example.com".to_string()]);
                assert_eq!(review_stage, GET_DIFFS_STAGE);
                assert!(additional_information.contains("Get_Diffs"));
            }
            other => panic!("Expected approval action, got {:?}", other),
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = config();
        assert_eq!(TopologyBuilder::build(&config), TopologyBuilder::build(&config));
    }
}
