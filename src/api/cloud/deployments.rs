//
//  bitbucket-provider
//  api/cloud/deployments.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Deployment environment API types, `2.0/repositories/{ws}/{slug}/environments`.

use serde::{Deserialize, Serialize};

pub const DEPLOYMENT_STAGES: &[&str] = &["Test", "Staging", "Production"];

/// A deployment environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub environment_type: EnvironmentType,
}

/// The stage of an environment, e.g. `Staging`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentType {
    #[serde(default)]
    pub name: String,
}

/// Body for `POST .../environments/{uuid}/changes/`.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentChange {
    pub change: EnvironmentChangeFields,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentChangeFields {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_body_shape() {
        let body = EnvironmentChange {
            change: EnvironmentChangeFields {
                name: "qa".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"change": {"name": "qa"}})
        );
    }
}
