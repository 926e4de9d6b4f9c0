// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Deploying account
//!
//! Every permission in the stack is scoped by this value.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

use crate::errors::{AcsError, AcsResult};

/// Placeholder resolved by the provisioning platform at deploy time
pub const ACCOUNT_TOKEN: &str = "${AWS::AccountId}";

fn account_regex() -> &'static Regex {
    static ACCOUNT: OnceLock<Regex> = OnceLock::new();
    ACCOUNT.get_or_init(|| Regex::new(r"^\d{12}$").expect("account pattern is a valid regex"))
}

/// Account the stack is deployed into
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DeployAccount {
    /// Resolved at deploy time
    #[default]
    Deferred,
    /// A concrete 12-digit account id
    Id(String),
}

impl DeployAccount {
    /// Parse an account id, accepting the deploy-time placeholder as well
    pub fn parse(value: &str) -> AcsResult<Self> {
        let value = value.trim();

        if value == ACCOUNT_TOKEN {
            return Ok(Self::Deferred);
        }

        if account_regex().is_match(value) {
            Ok(Self::Id(value.to_string()))
        } else {
            Err(AcsError::InvalidContext {
                entry: value.to_string(),
                help: Some("Account ids are exactly 12 digits".into()),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Deferred => ACCOUNT_TOKEN,
            Self::Id(id) => id,
        }
    }

    /// IAM role ARN pattern in this account
    pub fn role_arn(&self, role_pattern: &str) -> String {
        format!("arn:aws:iam::{}:role/{}", self.as_str(), role_pattern)
    }

    /// ARN pattern covering every configuration-store resource in this account
    pub fn appconfig_arn(&self) -> String {
        format!("arn:aws:appconfig:*:{}:*", self.as_str())
    }

    /// Whether a resource ARN is scoped to this account
    pub fn scopes(&self, resource: &str) -> bool {
        // arn:partition:service:region:account:resource; the deferred token
        // itself contains colons, so match on the account-prefixed remainder.
        let mut parts = resource.splitn(5, ':');
        if parts.next() != Some("arn") {
            return false;
        }

        parts
            .nth(3)
            .map_or(false, |rest| {
                rest.strip_prefix(self.as_str())
                    .map_or(false, |tail| tail.starts_with(':'))
            })
    }
}

impl fmt::Display for DeployAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeployAccount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeployAccount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}
