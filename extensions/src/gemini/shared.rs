use std::time::Duration;

use reqwest::Client;
use secrecy::SecretString;
use tracing::{debug, instrument, trace};
use url::Url;

use super::error::GeminiError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Connection settings for the Gemini API.
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub(crate) api_key: SecretString,
    pub(crate) base_url: Url,
    /// Defaults to 60 seconds.
    pub(crate) timeout: Duration,
}

impl GeminiConfig {
    /// # Errors
    /// Returns `GeminiError::InvalidConfiguration` if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeminiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GeminiError::InvalidConfiguration("API key cannot be empty".to_string()));
        }
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|e| GeminiError::InvalidConfiguration(format!("Failed to parse default base URL: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url,
            timeout: Duration::from_secs(60),
        })
    }

    /// Points the client at a different host, e.g. a proxy or a local mock server.
    pub fn base_url(mut self, url: &str) -> Result<Self, GeminiError> {
        self.base_url = Url::parse(url)
            .map_err(|e| GeminiError::InvalidConfiguration(format!("Invalid base URL '{}': {}", url, e)))?;
        Ok(self)
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client plus configuration, shared by every Gemini client built from it.
#[derive(Clone, Debug)]
pub(crate) struct SharedGeminiClient {
    config: GeminiConfig,
    http_client: Client,
}

impl SharedGeminiClient {
    #[instrument(name = "shared_gemini_client_new", skip(config, client_override))]
    pub(crate) fn new(config: GeminiConfig, client_override: Option<Client>) -> Result<Self, GeminiError> {
        let http_client = match client_override {
            Some(client) => client,
            None => {
                debug!(timeout = ?config.timeout, "Building default HTTP client");
                Client::builder()
                    .timeout(config.timeout)
                    .build()
                    .map_err(|e| GeminiError::InvalidConfiguration(format!("Failed to build HTTP client: {}", e)))?
            }
        };
        debug!(base_url = %config.base_url, "Shared Gemini client initialized");
        Ok(Self { config, http_client })
    }

    pub(crate) fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub(crate) fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Builds `{base}/v1beta/{relative_path}`. Authentication goes in a header, not the URL.
    pub(crate) fn build_url(&self, relative_path: &str) -> Result<Url, GeminiError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GeminiError::InvalidConfiguration("Base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("v1beta")
            .extend(relative_path.split('/'));
        trace!(built_url = %url, "Built Gemini API URL");
        Ok(url)
    }
}
