use serde::Serialize;

use crate::composer::PromptComposer;
use crate::core::errors::ApiError;
use crate::llm::types::{ChatMessage, ChatRequest};
use crate::llm::LlmProvider;
use crate::rag::orchestrator::{RetrievalOutcome, SourceAttribution};

#[derive(Debug, Clone, Copy)]
pub struct AnswerOptions {
    pub return_sources: bool,
    pub return_follow_up_questions: bool,
    pub embed_sources: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceAttribution>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_questions: Option<Vec<String>>,
}

/// Streams the grounded answer and assembles the final response.
///
/// Deltas are forwarded to `on_delta` in arrival order while being
/// accumulated; the `AnswerResponse` is assembled only after the stream's
/// terminal signal (channel close), never before. Any error before or
/// during streaming is fatal for the request.
pub async fn stream_answer(
    llm: &dyn LlmProvider,
    chat_model: &str,
    composer: &PromptComposer,
    query: &str,
    outcome: &RetrievalOutcome,
    options: AnswerOptions,
    mut on_delta: impl FnMut(&str),
) -> Result<AnswerResponse, ApiError> {
    let system_message = composer.system_message(query, options.embed_sources).await?;
    let results = serde_json::to_value(&outcome.chunk_groups).map_err(ApiError::internal)?;
    let user_message = composer.user_message(&results).await?;

    let request = ChatRequest::new(vec![
        ChatMessage::system(system_message),
        ChatMessage::user(user_message),
    ]);

    let mut deltas = llm.stream_chat(request, chat_model).await?;
    let mut answer = String::new();
    while let Some(delta) = deltas.recv().await {
        let delta = delta?;
        on_delta(&delta);
        answer.push_str(&delta);
    }

    let sources = options
        .return_sources
        .then(|| outcome.attributions.clone());
    let follow_up_questions = if options.return_follow_up_questions {
        Some(generate_follow_up_questions(llm, chat_model, query, &answer).await?)
    } else {
        None
    };

    Ok(AnswerResponse {
        answer,
        sources,
        follow_up_questions,
    })
}

/// Second, non-streaming call proposing follow-up questions conditioned
/// on the completed answer.
pub async fn generate_follow_up_questions(
    llm: &dyn LlmProvider,
    chat_model: &str,
    query: &str,
    answer: &str,
) -> Result<Vec<String>, ApiError> {
    let request = ChatRequest::new(vec![
        ChatMessage::system(
            "You suggest follow-up questions. Respond with a JSON array of exactly \
             three short questions and nothing else.",
        ),
        ChatMessage::user(format!(
            "Original question: {}\n\nAnswer given:\n{}\n\nPropose three follow-up questions.",
            query, answer
        )),
    ]);

    let content = llm.chat(request, chat_model).await?;
    parse_question_list(&content).ok_or_else(|| {
        ApiError::Upstream("follow-up generation returned no parseable question list".to_string())
    })
}

/// Accepts a bare JSON array, or one wrapped in code fences or prose.
fn parse_question_list(content: &str) -> Option<Vec<String>> {
    let trimmed = content.trim();
    if let Ok(questions) = serde_json::from_str::<Vec<String>>(trimmed) {
        return Some(questions);
    }

    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Vec<String>>(&trimmed[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json_array() {
        let parsed = parse_question_list(r#"["a?", "b?", "c?"]"#).expect("should parse");
        assert_eq!(parsed, vec!["a?", "b?", "c?"]);
    }

    #[test]
    fn parses_fenced_json_array() {
        let content = "```json\n[\"one?\", \"two?\"]\n```";
        let parsed = parse_question_list(content).expect("should parse");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn rejects_non_array_content() {
        assert!(parse_question_list("no questions here").is_none());
    }
}
