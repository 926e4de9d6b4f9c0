// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Topology validation
//!
//! Checks a built stack against the pipeline invariants before it is
//! submitted.

use std::collections::HashSet;

use crate::stack::StackDefinition;
use crate::topology::{
    Action, ActionKind, ArtifactGraph, SourceTrigger, Stage, STAGE_ORDER, UPDATE_DIFFS_STAGE,
};

/// Topology validator
pub struct TopologyValidator;

impl TopologyValidator {
    /// Validate a stack definition
    pub fn validate(stack: &StackDefinition) -> ValidationResult {
        let mut result = ValidationResult::new();
        let topology = &stack.pipeline;

        // Stage order is fixed
        let names = topology.stage_names();
        if names != STAGE_ORDER {
            result.add_error(&format!(
                "Stages must be {} but are {}",
                STAGE_ORDER.join(" → "),
                if names.is_empty() {
                    "empty".to_string()
                } else {
                    names.join(" → ")
                }
            ));
        }

        // Validate artifact flow (duplicate names, unknown producers and cycles)
        match ArtifactGraph::build(topology) {
            Ok(graph) => {
                for edge in graph.backward_edges() {
                    result.add_error(&format!(
                        "Action '{}' consumes '{}' from '{}' which does not run in an earlier stage",
                        edge.to, edge.artifact, edge.from
                    ));
                }
            }
            Err(e) => result.add_error(&e.to_string()),
        }

        // Validate each stage
        for stage in &topology.stages {
            Self::validate_stage(stage, stack, &mut result);
        }

        let triggering = topology
            .actions()
            .filter(|(_, _, action)| {
                matches!(
                    action.kind,
                    ActionKind::Source {
                        trigger: SourceTrigger::Webhook,
                        ..
                    }
                )
            })
            .count();
        if triggering != 1 {
            result.add_warning(&format!(
                "Expected exactly one change-triggering source action, found {}",
                triggering
            ));
        }

        Self::validate_policies(stack, &mut result);

        result
    }

    /// Validate a single stage
    fn validate_stage(stage: &Stage, stack: &StackDefinition, result: &mut ValidationResult) {
        if stage.actions.is_empty() {
            result.add_error(&format!("Stage '{}' has no actions", stage.name));
        }

        for action in &stage.actions {
            match &action.kind {
                ActionKind::Source { .. } => {
                    if !action.inputs.is_empty() {
                        result.add_error(&format!(
                            "Source action '{}' must not consume artifacts",
                            action.name
                        ));
                    }
                }
                ActionKind::Build { project } => {
                    Self::validate_build_action(action, project, stack, result);
                }
                ActionKind::ManualApproval { notify_emails, .. } => {
                    if !action.inputs.is_empty() || !action.outputs.is_empty() {
                        result.add_error(&format!(
                            "Approval action '{}' must not consume or produce artifacts",
                            action.name
                        ));
                    }
                    if notify_emails.is_empty() {
                        result.add_error(&format!(
                            "Approval action '{}' has no notification recipient",
                            action.name
                        ));
                    }
                }
            }
        }
    }

    fn validate_build_action(
        action: &Action,
        project: &str,
        stack: &StackDefinition,
        result: &mut ValidationResult,
    ) {
        let Some(project) = stack.get_project(project) else {
            result.add_error(&format!(
                "Build action '{}' references unknown project '{}'",
                action.name, project
            ));
            return;
        };

        if project.concurrent_build_limit != 1 {
            result.add_error(&format!(
                "Project '{}' allows {} concurrent builds; deploys must be serialized",
                project.id, project.concurrent_build_limit
            ));
        }

        if stack.get_log_group(&project.log_group).is_none() {
            result.add_warning(&format!(
                "Project '{}' logs to unknown log group '{}'",
                project.id, project.log_group
            ));
        }

        if action.primary_input().is_none() {
            result.add_error(&format!(
                "Build action '{}' has no primary input",
                action.name
            ));
        }
    }

    /// Every grant is account-scoped; only the final stage may hold a
    /// whole-service wildcard
    fn validate_policies(stack: &StackDefinition, result: &mut ValidationResult) {
        let mutating: HashSet<&str> = stack
            .pipeline
            .get_stage(UPDATE_DIFFS_STAGE)
            .into_iter()
            .flat_map(|stage| stage.actions.iter())
            .filter_map(|action| stack.project_for(action))
            .map(|project| project.id.as_str())
            .collect();

        for project in &stack.projects {
            for statement in &project.policy_statements {
                for resource in &statement.resources {
                    if !stack.account.scopes(resource) {
                        result.add_error(&format!(
                            "Project '{}': resource '{}' is not scoped to account {}",
                            project.id, resource, stack.account
                        ));
                    }
                }

                if statement.has_service_wildcard() && !mutating.contains(project.id.as_str()) {
                    result.add_error(&format!(
                        "Project '{}': wildcard grant {} is only allowed for the {} stage",
                        project.id,
                        statement.actions.join(", "),
                        UPDATE_DIFFS_STAGE
                    ));
                }
            }
        }
    }

    /// Build-instruction files referenced by the stack that do not exist
    pub fn validate_files(stack: &StackDefinition) -> Vec<String> {
        stack
            .projects
            .iter()
            .filter(|project| !project.buildspec.is_file())
            .map(|project| {
                format!(
                    "Project '{}': build instructions not found: {}",
                    project.id,
                    project.buildspec.display()
                )
            })
            .collect()
    }
}

/// Result of topology validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::stack::{DeployAccount, PolicyStatement, StackBuilder, DIFF_PROJECT_ID};
    use crate::topology::Artifact;
    use tempfile::TempDir;

    fn config() -> Configuration {
        Configuration::from_yaml(
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
        .unwrap()
    }

    fn stack() -> StackDefinition {
        StackBuilder::new(DeployAccount::Id("123456789012".into()), "build").build(&config())
    }

    #[test]
    fn test_built_stack_is_valid() {
        let result = TopologyValidator::validate(&stack());
        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
        assert!(!result.has_warnings(), "unexpected warnings: {:?}", result.warnings);
    }

    #[test]
    fn test_deferred_account_stack_is_valid() {
        let stack = StackBuilder::new(DeployAccount::default(), "build").build(&config());
        assert!(TopologyValidator::validate(&stack).is_valid());
    }

    #[test]
    fn test_reordered_stages_are_rejected() {
        let mut stack = stack();
        stack.pipeline.stages.swap(2, 3);

        let result = TopologyValidator::validate(&stack);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.starts_with("Stages must be")));
    }

    #[test]
    fn test_same_stage_artifact_flow_is_rejected() {
        let mut stack = stack();
        let update = stack.pipeline.stages.remove(3);
        stack.pipeline.stages[1].actions.extend(update.actions);

        let result = TopologyValidator::validate(&stack);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("does not run in an earlier stage")));
    }

    #[test]
    fn test_duplicate_action_reported_once() {
        let mut stack = stack();
        let approval = stack.pipeline.stages[2].actions[0].clone();
        stack.pipeline.stages[2].actions.push(approval);

        let result = TopologyValidator::validate(&stack);
        let duplicates = result
            .errors
            .iter()
            .filter(|e| e.contains("Duplicate action name"))
            .count();
        assert_eq!(duplicates, 1);
    }

    #[test]
    fn test_approval_with_artifacts_is_rejected() {
        let mut stack = stack();
        stack.pipeline.stages[2].actions[0]
            .inputs
            .push(Artifact::new("sourceOutput"));

        let result = TopologyValidator::validate(&stack);
        assert!(result.errors.iter().any(|e| e.contains("Approval action")));
    }

    #[test]
    fn test_concurrent_builds_are_rejected() {
        let mut stack = stack();
        stack.projects[0].concurrent_build_limit = 2;

        let result = TopologyValidator::validate(&stack);
        assert!(result.errors.iter().any(|e| e.contains("serialized")));
    }

    #[test]
    fn test_unscoped_resource_is_rejected() {
        let mut stack = stack();
        stack.projects[0]
            .policy_statements
            .push(PolicyStatement::new(["appconfig:Get*"], ["*"]));

        let result = TopologyValidator::validate(&stack);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("is not scoped to account")));
    }

    #[test]
    fn test_wildcard_outside_final_stage_is_rejected() {
        let mut stack = stack();
        let resource = stack.account.appconfig_arn();
        let diff = stack
            .projects
            .iter_mut()
            .find(|p| p.id == DIFF_PROJECT_ID)
            .unwrap();
        diff.policy_statements
            .push(PolicyStatement::new(["appconfig:*"], [resource]));

        let result = TopologyValidator::validate(&stack);
        assert!(result.errors.iter().any(|e| e.contains("wildcard grant")));
    }

    #[test]
    fn test_second_triggering_source_warns() {
        let mut stack = stack();
        let cicd_source = &mut stack.pipeline.stages[0].actions[1];
        if let ActionKind::Source { trigger, .. } = &mut cicd_source.kind {
            *trigger = SourceTrigger::Webhook;
        }

        let result = TopologyValidator::validate(&stack);
        assert!(result.is_valid());
        assert!(result.has_warnings());
    }

    #[test]
    fn test_missing_build_files_reported() {
        let temp = TempDir::new().unwrap();
        let stack =
            StackBuilder::new(DeployAccount::default(), temp.path()).build(&config());

        assert_eq!(TopologyValidator::validate_files(&stack).len(), 2);

        std::fs::write(temp.path().join("buildspec-diff.yml"), "version: 0.2\n").unwrap();
        let missing = TopologyValidator::validate_files(&stack);
        assert_eq!(missing.len(), 1);
        assert!(missing[0].contains("buildspec-update.yml"));
    }
}
