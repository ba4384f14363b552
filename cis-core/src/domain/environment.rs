//! Environment domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A repository jobs can be submitted into, scoped to a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: Uuid,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub r#type: String,
    pub workspace_id: Uuid,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub workspace_name: String,
}

/// Environment-wide key/value setting. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalVariable {
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub key: String,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_from_camel_case() {
        let json = r#"{
            "id": "0b8e7c1e-3f43-4b55-9d0c-6f0d2a1c9e11",
            "name": "Inbound",
            "type": "Standard",
            "workspaceId": "5a3f1f0e-8a36-4d0b-8a43-0c6c2b4f7e20",
            "workspaceName": "Finance"
        }"#;

        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.name, "Inbound");
        assert_eq!(repo.r#type, "Standard");
        assert_eq!(repo.workspace_name, "Finance");
    }

    #[test]
    fn test_repository_null_strings() {
        let json = r#"{
            "id": "0b8e7c1e-3f43-4b55-9d0c-6f0d2a1c9e11",
            "name": "Inbound",
            "type": null,
            "workspaceId": "5a3f1f0e-8a36-4d0b-8a43-0c6c2b4f7e20",
            "workspaceName": null
        }"#;

        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.name, "Inbound");
        assert!(repo.r#type.is_empty());
        assert!(repo.workspace_name.is_empty());
    }

    #[test]
    fn test_global_variable_defaults() {
        let var: GlobalVariable = serde_json::from_str(r#"{"key": "Region"}"#).unwrap();
        assert_eq!(var.key, "Region");
        assert!(var.value.is_empty());
    }
}
