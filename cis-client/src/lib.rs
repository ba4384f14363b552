//! CIS HTTP Client
//!
//! A small, type-safe client for the CIS ClientIntegration API (v2).
//!
//! Every request carries the configured API key header. The five endpoints
//! are grouped by concern:
//! - Environment discovery (repositories and global variables)
//! - Job lifecycle (submit, status, download, release)
//!
//! # Example
//!
//! ```no_run
//! use cis_client::CisClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CisClient::new("https://localhost:60204", "X-Api-Key", "secret", false)?;
//!
//!     let env = client.get_environment().await?;
//!     for repo in &env.repositories {
//!         println!("{} ({})", repo.name, repo.id);
//!     }
//!     Ok(())
//! }
//! ```

mod disposition;
mod environment;
pub mod error;
mod jobs;

#[cfg(test)]
mod test_support;

pub use disposition::filename_from_disposition;
pub use error::{ClientError, Result};

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// Path appended to the base URL for every endpoint
const API_PREFIX: &str = "api/v2/ClientIntegration";

/// HTTP client for the CIS ClientIntegration API
#[derive(Debug, Clone)]
pub struct CisClient {
    /// Base URL without trailing slash (e.g., "https://localhost:60204")
    base_url: String,
    /// Header carrying the API key
    api_key_header: HeaderName,
    /// API key value
    api_key: HeaderValue,
    /// HTTP client instance
    client: Client,
}

impl CisClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the CIS server
    /// * `api_key_header` - Name of the header carrying the API key
    /// * `api_key` - The API key
    /// * `skip_certificate_verification` - Accept any TLS certificate
    pub fn new(
        base_url: impl Into<String>,
        api_key_header: &str,
        api_key: &str,
        skip_certificate_verification: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(skip_certificate_verification)
            .build()?;

        Self::with_client(base_url, api_key_header, api_key, client)
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        api_key_header: &str,
        api_key: &str,
        client: Client,
    ) -> Result<Self> {
        let base_url = base_url.into();
        let api_key_header = HeaderName::from_bytes(api_key_header.as_bytes()).map_err(|e| {
            ClientError::InvalidRequest(format!("Invalid API key header '{}': {}", api_key_header, e))
        })?;
        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|e| ClientError::InvalidRequest(format!("Invalid API key: {}", e)))?;
        api_key.set_sensitive(true);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key_header,
            api_key,
            client,
        })
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an endpoint, e.g. `Status/<id>`
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_PREFIX, endpoint)
    }

    /// Start a request to an endpoint with the API key attached
    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.client
            .request(method, self.endpoint_url(endpoint))
            .header(self.api_key_header.clone(), self.api_key.clone())
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Turn a non-success status into an [`ClientError::ApiError`]
    async fn ensure_success(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        self.ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content
    async fn handle_empty_response(&self, response: Response) -> Result<()> {
        self.ensure_success(response).await.map(|_| ())
    }
}
