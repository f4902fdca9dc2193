use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::provider::LlmProvider;
use super::types::{ChatRequest, ToolCall, ToolChatOutcome, ToolSpec};
use crate::core::errors::ApiError;

/// Provider for any OpenAI-compatible chat/embeddings endpoint.
#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.post(url);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }
        builder
    }

    fn chat_body(request: &ChatRequest, model_id: &str, stream: bool) -> Value {
        let mut body = json!({
            "model": model_id,
            "messages": &request.messages,
            "stream": stream,
        });
        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
        }
        body
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError> {
        let body = Self::chat_body(&request, model_id, false);

        let res = self
            .post("/chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("chat error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::upstream)?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(content)
    }

    async fn stream_chat(
        &self,
        request: ChatRequest,
        model_id: &str,
    ) -> Result<mpsc::Receiver<Result<String, ApiError>>, ApiError> {
        let body = Self::chat_body(&request, model_id, true);

        let res = self
            .post("/chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("chat stream error: {}", text)));
        }

        let (tx, rx) = mpsc::channel(32);
        let mut stream = res.bytes_stream();

        tokio::spawn(async move {
            // SSE events can split across network chunks; carry the
            // remainder between reads.
            let mut buffer = String::new();
            while let Some(item) = stream.next().await {
                match item {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        while let Some(pos) = buffer.find('\n') {
                            let line = buffer[..pos].trim().to_string();
                            buffer.drain(..=pos);
                            if line.is_empty() {
                                continue;
                            }
                            if line == "data: [DONE]" {
                                return;
                            }
                            if let Some(data) = line.strip_prefix("data: ") {
                                if let Ok(event) = serde_json::from_str::<Value>(data) {
                                    if let Some(content) =
                                        event["choices"][0]["delta"]["content"].as_str()
                                    {
                                        if !content.is_empty()
                                            && tx.send(Ok(content.to_string())).await.is_err()
                                        {
                                            return;
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(ApiError::upstream(e))).await;
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn chat_with_tools(
        &self,
        request: ChatRequest,
        tools: &[ToolSpec],
        model_id: &str,
    ) -> Result<ToolChatOutcome, ApiError> {
        let mut body = Self::chat_body(&request, model_id, false);
        if let Some(obj) = body.as_object_mut() {
            let tool_entries: Vec<Value> = tools
                .iter()
                .map(|tool| json!({ "type": "function", "function": tool }))
                .collect();
            obj.insert("tools".to_string(), json!(tool_entries));
            obj.insert("tool_choice".to_string(), json!("auto"));
        }

        let res = self
            .post("/chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("tool chat error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::upstream)?;
        let message = &payload["choices"][0]["message"];

        let content = message["content"].as_str().map(|s| s.to_string());
        let mut tool_calls = Vec::new();
        if let Some(calls) = message["tool_calls"].as_array() {
            for call in calls {
                let name = call["function"]["name"].as_str().unwrap_or_default();
                let arguments = call["function"]["arguments"].as_str().unwrap_or_default();
                if !name.is_empty() {
                    tool_calls.push(ToolCall {
                        name: name.to_string(),
                        arguments: arguments.to_string(),
                    });
                }
            }
        }

        Ok(ToolChatOutcome {
            content,
            tool_calls,
        })
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        let body = json!({
            "model": model_id,
            "input": inputs,
        });

        let res = self
            .post("/embeddings")
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("embed error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::upstream)?;

        let mut embeddings = Vec::new();
        if let Some(data) = payload["data"].as_array() {
            for item in data {
                if let Some(vals) = item["embedding"].as_array() {
                    let vec: Vec<f32> = vals
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect();
                    embeddings.push(vec);
                }
            }
        }

        if embeddings.len() != inputs.len() {
            return Err(ApiError::Upstream(format!(
                "embedding count mismatch: requested {}, received {}",
                inputs.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings)
    }
}
