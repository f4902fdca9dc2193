use async_trait::async_trait;
use tokio::sync::mpsc;

use super::types::{ChatRequest, ToolChatOutcome, ToolSpec};
use crate::core::errors::ApiError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError>;

    /// chat completion (streaming). The receiver yields content deltas in
    /// arrival order; channel close is the terminal signal.
    async fn stream_chat(
        &self,
        request: ChatRequest,
        model_id: &str,
    ) -> Result<mpsc::Receiver<Result<String, ApiError>>, ApiError>;

    /// chat completion with a tool registry, tool choice left to the model
    async fn chat_with_tools(
        &self,
        request: ChatRequest,
        tools: &[ToolSpec],
        model_id: &str,
    ) -> Result<ToolChatOutcome, ApiError>;

    /// generate embeddings, one vector per input, order-preserving
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError>;
}
