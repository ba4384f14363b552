//! Environment endpoint

use crate::CisClient;
use crate::error::Result;
use cis_core::dto::environment::EnvironmentResponse;
use reqwest::Method;

impl CisClient {
    /// Get the environment for the API key
    ///
    /// Lists the repositories available to submit to, based on the
    /// workspaces the key is allowed to use, and the global variables.
    pub async fn get_environment(&self) -> Result<EnvironmentResponse> {
        let response = self.request(Method::GET, "Environment").send().await?;

        self.handle_response(response).await
    }
}
