//
//  bitbucket-provider
//  api/cloud/pipelines.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pipelines configuration API types.
//!
//! Everything here hangs off `2.0/repositories/{ws}/{slug}/pipelines_config`:
//!
//! - `variables/` - repository pipeline variables
//! - `ssh/key_pair` - the SSH key pair pipelines use
//! - `ssh/known_hosts/` - hosts pipelines trust
//! - `schedules/` - cron-triggered pipeline runs
//!
//! Deployment variables use the same [`PipelineVariable`] body under
//! `deployments_config/environments/{env}/variables`.

use serde::{Deserialize, Serialize};

pub const KNOWN_HOST_KEY_TYPES: &[&str] = &["Ed25519", "ECDSA", "RSA", "DSA"];

pub const REF_TYPES: &[&str] = &["branch", "tag"];

/// A pipeline or deployment variable.
///
/// The API never echoes back the value of a secured variable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineVariable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default)]
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default)]
    pub secured: bool,
}

/// The repository's pipeline SSH key pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SshKeyPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// A host pipelines trust when connecting over SSH.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnownHost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default)]
    pub hostname: String,

    #[serde(default)]
    pub public_key: KnownHostPublicKey,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownHostPublicKey {
    #[serde(default)]
    pub key_type: String,

    #[serde(default)]
    pub key: String,

    #[serde(default, skip_serializing)]
    pub md5_fingerprint: Option<String>,

    #[serde(default, skip_serializing)]
    pub sha256_fingerprint: Option<String>,
}

/// A cron schedule for a pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub cron_pattern: String,

    #[serde(default)]
    pub target: ScheduleTarget,
}

/// What a schedule runs. `type` is always `pipeline_ref_target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTarget {
    #[serde(rename = "type", default = "ref_target_type")]
    pub target_type: String,

    #[serde(default)]
    pub ref_name: String,

    #[serde(default)]
    pub ref_type: String,

    #[serde(default)]
    pub selector: ScheduleSelector,
}

impl Default for ScheduleTarget {
    fn default() -> Self {
        Self {
            target_type: ref_target_type(),
            ref_name: String::new(),
            ref_type: String::new(),
            selector: ScheduleSelector::default(),
        }
    }
}

/// Which pipeline definition the schedule triggers. `type` is `branches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSelector {
    #[serde(rename = "type", default = "branches_selector_type")]
    pub selector_type: String,

    #[serde(default)]
    pub pattern: String,
}

impl Default for ScheduleSelector {
    fn default() -> Self {
        Self {
            selector_type: branches_selector_type(),
            pattern: String::new(),
        }
    }
}

fn ref_target_type() -> String {
    "pipeline_ref_target".to_string()
}

fn branches_selector_type() -> String {
    "branches".to_string()
}

/// Schedules only allow toggling after creation.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleToggle {
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_target_carries_type_tags() {
        let schedule = Schedule {
            enabled: true,
            cron_pattern: "0 30 * * * ? *".to_string(),
            target: ScheduleTarget {
                ref_name: "main".to_string(),
                ref_type: "branch".to_string(),
                selector: ScheduleSelector {
                    pattern: "nightly".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(value["target"]["type"], "pipeline_ref_target");
        assert_eq!(value["target"]["selector"]["type"], "branches");
        assert!(value.get("uuid").is_none());
    }

    #[test]
    fn test_secured_variable_decodes_without_value() {
        let var: PipelineVariable =
            serde_json::from_str(r#"{"uuid": "{v}", "key": "TOKEN", "secured": true}"#).unwrap();
        assert!(var.secured);
        assert!(var.value.is_none());
    }
}
