//! Environment DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::environment::{GlobalVariable, Repository};

/// Response of the Environment endpoint
///
/// Lists the repositories the API key may submit to, plus global variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub repositories: Vec<Repository>,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub global_variables: Vec<GlobalVariable>,
    #[serde(default, deserialize_with = "super::timestamp::deserialize_optional")]
    pub last_changed: Option<DateTime<Utc>>,
}

impl EnvironmentResponse {
    /// The repository the runner submits into: the first one listed
    pub fn target_repository(&self) -> Option<&Repository> {
        self.repositories.first()
    }
}

pub(crate) fn default_success() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_environment() {
        let json = r#"{
            "success": true,
            "message": "",
            "repositories": [
                {"id": "0b8e7c1e-3f43-4b55-9d0c-6f0d2a1c9e11", "name": "First", "type": "Standard",
                 "workspaceId": "5a3f1f0e-8a36-4d0b-8a43-0c6c2b4f7e20", "workspaceName": "WS"},
                {"id": "1b8e7c1e-3f43-4b55-9d0c-6f0d2a1c9e11", "name": "Second", "type": "Standard",
                 "workspaceId": "5a3f1f0e-8a36-4d0b-8a43-0c6c2b4f7e20", "workspaceName": "WS"}
            ],
            "globalVariables": [{"key": "Region", "value": "EU"}],
            "lastChanged": "2025-01-02T03:04:05Z"
        }"#;

        let env: EnvironmentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(env.repositories.len(), 2);
        assert_eq!(env.target_repository().unwrap().name, "First");
        assert_eq!(env.global_variables[0].value, "EU");
        assert!(env.last_changed.is_some());
    }

    #[test]
    fn test_parse_minimal_environment() {
        let env: EnvironmentResponse = serde_json::from_str("{}").unwrap();
        assert!(env.success);
        assert!(env.target_repository().is_none());
        assert!(env.last_changed.is_none());
    }

    #[test]
    fn test_null_message_and_lists() {
        let json = r#"{"success": false, "message": null, "repositories": null,
            "globalVariables": [{"key": "Region", "value": null}]}"#;

        let env: EnvironmentResponse = serde_json::from_str(json).unwrap();
        assert!(!env.success);
        assert!(env.message.is_empty());
        assert!(env.repositories.is_empty());
        assert!(env.global_variables[0].value.is_empty());
    }

    #[test]
    fn test_null_last_changed() {
        let env: EnvironmentResponse =
            serde_json::from_str(r#"{"repositories": [], "lastChanged": null}"#).unwrap();
        assert!(env.last_changed.is_none());
    }
}
