//! HTTP source for the remote suggestion document.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use marketplace_core::{
    config::SuggestionsConfig,
    traits::SuggestionSource,
    types::Suggestion,
    Error, Result,
};

/// Fetches the suggestion list with a single GET per call.
pub struct ReqwestSuggestionSource {
    client: Client,
    url: Url,
}

impl ReqwestSuggestionSource {
    /// Build a source from configuration.
    pub fn new(config: &SuggestionsConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::remote_fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.remote_url.clone(),
        })
    }

    /// The URL this source fetches from.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl SuggestionSource for ReqwestSuggestionSource {
    async fn fetch(&self) -> Result<Vec<Suggestion>> {
        tracing::debug!(url = %self.url, "Fetching marketplace suggestions");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| Error::remote_fetch(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::remote_fetch(format!("Unexpected status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::remote_fetch(format!("Failed to read body: {}", e)))?;

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| Error::malformed_payload(format!("Body is not JSON: {}", e)))?;

        match value {
            Value::Array(items) => Ok(items),
            other => Err(Error::malformed_payload(format!(
                "Expected a JSON array, got {}",
                json_kind(&other)
            ))),
        }
    }
}
