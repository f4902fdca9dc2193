use std::io::Write;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::answer::{stream_answer, AnswerOptions, AnswerResponse};
use crate::core::errors::ApiError;
use crate::rag::{gather_sources, RetrievalConfig};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequestBody {
    pub message: String,
    #[serde(default = "default_true")]
    pub return_sources: bool,
    #[serde(default = "default_true")]
    pub return_follow_up_questions: bool,
    #[serde(default, rename = "embedSourcesInLLMResponse")]
    pub embed_sources_in_llm_response: bool,
    #[serde(default = "default_chunk_size")]
    pub text_chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub text_chunk_overlap: usize,
    #[serde(default = "default_similarity_results")]
    pub number_of_similarity_results: usize,
    #[serde(default = "default_pages_to_scan")]
    pub number_of_pages_to_scan: usize,
}

fn default_true() -> bool {
    true
}

fn default_chunk_size() -> usize {
    800
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_similarity_results() -> usize {
    2
}

fn default_pages_to_scan() -> usize {
    4
}

/// The main pipeline: discovery → per-source retrieval → streamed answer.
///
/// Deltas are forwarded to stdout as they arrive; the JSON response is
/// emitted once, after the stream completes.
pub async fn answer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnswerRequestBody>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    let config = RetrievalConfig {
        chunk_size: body.text_chunk_size,
        chunk_overlap: body.text_chunk_overlap,
        top_k: body.number_of_similarity_results,
        page_limit: body.number_of_pages_to_scan,
        ..RetrievalConfig::default()
    };

    tracing::info!(%request_id, "Answering: {:?}", body.message);

    let outcome = gather_sources(
        &state.http,
        &state.settings,
        state.embedder.as_ref(),
        &body.message,
        &config,
    )
    .await
    .map_err(|err| {
        tracing::error!(%request_id, "Retrieval failed: {}", err);
        err
    })?;

    let options = AnswerOptions {
        return_sources: body.return_sources,
        return_follow_up_questions: body.return_follow_up_questions,
        embed_sources: body.embed_sources_in_llm_response,
    };

    let response = stream_answer(
        state.llm.as_ref(),
        &state.settings.chat_model,
        &state.composer,
        &body.message,
        &outcome,
        options,
        |delta| {
            print!("{}", delta);
            let _ = std::io::stdout().flush();
        },
    )
    .await
    .map_err(|err| {
        tracing::error!(%request_id, "Answer stream failed: {}", err);
        err
    })?;

    Ok(Json(response))
}
