// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Configuration validation
//!
//! Runs every field rule against a parsed document and collects all
//! violations instead of stopping at the first one.

use regex::Regex;
use std::sync::OnceLock;

use crate::config::ConfigDocument;
use crate::errors::Violation;

/// Pattern the configuration group prefix must match
pub const PREFIX_PATTERN: &str = "^[a-zA-Z0-9]{3}$";

/// Message reported when the prefix does not match [`PREFIX_PATTERN`]
pub const PREFIX_MESSAGE: &str =
    "configuration-group-prefix must be letters or digits and must have a length of 3";

const NOT_BLANK_MESSAGE: &str = "must not be blank";

fn prefix_regex() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(PREFIX_PATTERN).expect("prefix pattern is a valid regex"))
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a parsed document, returning every violation in document order
    pub fn validate(document: &ConfigDocument) -> Vec<Violation> {
        let mut violations = Vec::new();

        let prefix = document.configuration_group_prefix.as_deref().unwrap_or("");
        if !Self::is_valid_prefix(prefix) {
            violations.push(Violation::new("configuration-group-prefix", PREFIX_MESSAGE));
        }

        let required = [
            ("github-repo-owner", &document.github_repo_owner),
            ("source-github-repo-name", &document.source_repo_name),
            ("source-github-repo-branch", &document.source_repo_branch),
            ("cicd-github-repo-name", &document.cicd_repo_name),
            ("cicd-github-repo-branch", &document.cicd_repo_branch),
            (
                "manual-approval-notify-email",
                &document.approval_notify_email,
            ),
        ];

        for (field, value) in required {
            if is_blank(value.as_deref()) {
                violations.push(Violation::new(field, NOT_BLANK_MESSAGE));
            }
        }

        violations
    }

    /// Check a configuration group prefix against [`PREFIX_PATTERN`]
    pub fn is_valid_prefix(prefix: &str) -> bool {
        prefix_regex().is_match(prefix)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_document() -> ConfigDocument {
        ConfigDocument {
            configuration_group_prefix: Some("abc".into()),
            github_repo_owner: Some("octo-org".into()),
            source_repo_name: Some("app-config".into()),
            source_repo_branch: Some("main".into()),
            cicd_repo_name: Some("app-config-cicd".into()),
            cicd_repo_branch: Some("main".into()),
            approval_notify_email: Some("ops@example.com".into()),
        }
    }

    #[test]
    fn test_accepts_alphanumeric_prefixes() {
        assert!(ConfigValidator::is_valid_prefix("ab1"));
        assert!(ConfigValidator::is_valid_prefix("XY9"));
        assert!(ConfigValidator::is_valid_prefix("000"));
    }

    #[test]
    fn test_rejects_malformed_prefixes() {
        for prefix in ["", "ab", "abcd", "ab-1", "a b", "ab\n", "äbc"] {
            assert!(
                !ConfigValidator::is_valid_prefix(prefix),
                "prefix {:?} should be rejected",
                prefix
            );
        }
    }

    #[test]
    fn test_complete_document_has_no_violations() {
        assert!(ConfigValidator::validate(&complete_document()).is_empty());
    }

    #[test]
    fn test_missing_prefix_is_a_violation() {
        let document = ConfigDocument {
            configuration_group_prefix: None,
            ..complete_document()
        };

        let violations = ConfigValidator::validate(&document);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "configuration-group-prefix");
        assert_eq!(violations[0].reason, PREFIX_MESSAGE);
    }

    #[test]
    fn test_whitespace_only_value_is_blank() {
        let document = ConfigDocument {
            cicd_repo_branch: Some("   \t".into()),
            ..complete_document()
        };

        let violations = ConfigValidator::validate(&document);
        assert_eq!(
            violations,
            vec![Violation::new("cicd-github-repo-branch", "must not be blank")]
        );
    }

    #[test]
    fn test_collects_all_violations_in_document_order() {
        let violations = ConfigValidator::validate(&ConfigDocument::default());
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();

        assert_eq!(
            fields,
            vec![
                "configuration-group-prefix",
                "github-repo-owner",
                "source-github-repo-name",
                "source-github-repo-branch",
                "cicd-github-repo-name",
                "cicd-github-repo-branch",
                "manual-approval-notify-email",
            ]
        );
    }
}
