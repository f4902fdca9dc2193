use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::ApiError;

/// Client for the external message-composition service. The service owns
/// all prompt engineering; this side only depends on the request/response
/// shapes.
#[derive(Clone)]
pub struct PromptComposer {
    base_url: String,
    client: Client,
}

impl PromptComposer {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub async fn system_message(
        &self,
        query: &str,
        embed_sources: bool,
    ) -> Result<String, ApiError> {
        let url = format!("{}/process-system-message", self.base_url);
        let body = json!({ "query": query, "embed_sources": embed_sources });
        let payload = self.post_json(&url, &body).await?;

        payload
            .get("system_message")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::Upstream("composer returned no system_message".to_string()))
    }

    pub async fn user_message(&self, results: &Value) -> Result<String, ApiError> {
        let url = format!("{}/process-user-message", self.base_url);
        let body = json!({ "results": results.to_string() });
        let payload = self.post_json(&url, &body).await?;

        payload
            .get("user_message")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::Upstream("composer returned no user_message".to_string()))
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "composer request failed: {}",
                response.status()
            )));
        }

        response.json().await.map_err(ApiError::upstream)
    }
}
