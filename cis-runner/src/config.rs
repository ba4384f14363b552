//! Runner configuration
//!
//! Settings live in `appsettings.json`. A missing file is bootstrapped with
//! defaults whose placeholder API key fails validation.
//! Keys are snake_case; the PascalCase and camelCase spellings used by the
//! other sample clients are accepted as well.

use cis_core::domain::job::MetadataEntry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Default configuration file name
pub const CONFIG_FILE: &str = "appsettings.json";

/// API key written into a bootstrapped config
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

/// Errors raised while loading or bootstrapping the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to create {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// CIS server base URL (e.g., "https://localhost:60204")
    #[serde(default, alias = "BaseUrl", alias = "baseUrl")]
    pub base_url: String,

    #[serde(default, alias = "ApiKey", alias = "apiKey")]
    pub api_key: String,

    /// Name of the header carrying the API key
    #[serde(default, alias = "ApiKeyHeader", alias = "apiKeyHeader")]
    pub api_key_header: String,

    /// Seconds the fatal error message stays on screen before exit
    #[serde(
        default = "default_error_close_seconds",
        alias = "ErrorCloseSeconds",
        alias = "errorCloseSeconds"
    )]
    pub error_close_seconds: u64,

    /// Seconds between two status checks of a job
    #[serde(
        default = "default_polling_rate_seconds",
        alias = "PollingRateSeconds",
        alias = "pollingRateSeconds"
    )]
    pub polling_rate_seconds: u64,

    /// Submit every input file as its own job
    #[serde(default, alias = "SeparateJobs", alias = "separateJobs")]
    pub separate_jobs: bool,

    /// Skip TLS certificate verification
    #[serde(default, alias = "TrustCerts", alias = "trustCerts")]
    pub trust_certs: bool,

    /// Metadata entries attached to every submitted file
    #[serde(
        default = "default_file_metadata",
        alias = "FileMetadata",
        alias = "fileMetadata"
    )]
    pub file_metadata: Vec<MetadataEntry>,
}

fn default_error_close_seconds() -> u64 {
    5
}

fn default_polling_rate_seconds() -> u64 {
    7
}

fn default_file_metadata() -> Vec<MetadataEntry> {
    vec![MetadataEntry::new(
        "Rust Sample App Submission",
        "Test file uploaded via Rust sample app",
    )]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:60204".to_string(),
            api_key: PLACEHOLDER_API_KEY.to_string(),
            api_key_header: "X-Api-Key".to_string(),
            error_close_seconds: default_error_close_seconds(),
            polling_rate_seconds: default_polling_rate_seconds(),
            separate_jobs: false,
            trust_certs: false,
            file_metadata: default_file_metadata(),
        }
    }
}

impl Config {
    /// Loads the configuration, writing the default one first if `path`
    /// does not exist. The result is always validated.
    pub fn load_or_bootstrap(path: &Path) -> Result<Self, ConfigError> {
        if Self::bootstrap(path)? {
            info!("Created default {} with default values.", path.display());
        }
        let config = Self::load(path)?;
        config.validate().map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    /// Writes the default configuration if none exists. Returns whether a
    /// file was written.
    pub fn bootstrap(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }

        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(&Config::default())
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        std::fs::write(path, json).map_err(write_err)?;
        Ok(true)
    }

    /// Reads and parses the configuration without validating it
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("base_url must start with http:// or https://".to_string());
        }

        if self.api_key.is_empty() {
            return Err("api_key cannot be empty".to_string());
        }

        if self.api_key == PLACEHOLDER_API_KEY {
            return Err("api_key is still the placeholder value".to_string());
        }

        if self.api_key_header.is_empty() {
            return Err("api_key_header cannot be empty".to_string());
        }

        if self.error_close_seconds == 0 {
            return Err("error_close_seconds must be greater than 0".to_string());
        }

        if self.polling_rate_seconds == 0 {
            return Err("polling_rate_seconds must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling_rate_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            api_key: "real-key".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(7));
        assert_eq!(config.error_close_seconds, 5);
        assert!(!config.separate_jobs);
        assert!(!config.trust_certs);
        assert_eq!(config.file_metadata.len(), 1);
    }

    #[test]
    fn test_config_validation() {
        let mut config = valid();
        assert!(config.validate().is_ok());

        config.base_url = String::new();
        assert!(config.validate().is_err());

        config.base_url = "localhost:60204".to_string();
        assert!(config.validate().is_err());

        config = valid();
        config.api_key_header = String::new();
        assert!(config.validate().is_err());

        config = valid();
        config.polling_rate_seconds = 0;
        assert!(config.validate().is_err());

        config = valid();
        config.error_close_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_placeholder_key_is_invalid() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.contains("placeholder"));
    }

    #[test]
    fn test_bootstrap_writes_once_and_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let err = Config::load_or_bootstrap(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(path.exists());
        let written = std::fs::read_to_string(&path).unwrap();

        // Second run: the default is still there and still rejected.
        assert!(!Config::bootstrap(&path).unwrap());
        let err = Config::load_or_bootstrap(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
    }

    #[test]
    fn test_load_accepts_other_casings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{
                "BaseUrl": "https://cis.example.com",
                "ApiKey": "k",
                "ApiKeyHeader": "X-Api-Key",
                "ErrorCloseSeconds": 3,
                "PollingRateSeconds": 2,
                "SeparateJobs": true,
                "TrustCerts": true
            }"#,
        )
        .unwrap();

        let config = Config::load_or_bootstrap(&path).unwrap();
        assert_eq!(config.base_url, "https://cis.example.com");
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert!(config.separate_jobs);
        assert!(config.trust_certs);
        assert_eq!(config.file_metadata, default_file_metadata());
    }

    #[test]
    fn test_load_camel_case_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{
                "baseUrl": "http://localhost:5000",
                "apiKey": "k",
                "apiKeyHeader": "X-Key",
                "fileMetadata": [{"Name": "Author", "Value": "Jane"}]
            }"#,
        )
        .unwrap();

        let config = Config::load_or_bootstrap(&path).unwrap();
        assert_eq!(config.polling_rate_seconds, 7);
        assert_eq!(config.file_metadata, vec![MetadataEntry::new("Author", "Jane")]);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load_or_bootstrap(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
