use serde::{Deserialize, Serialize};

use super::chunker::TextSplitter;
use super::RetrievalConfig;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;
use crate::vector_math::rank_descending_by_cosine;

/// One fetched page after extraction. `text` may be empty on a soft miss.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub link: String,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChunk {
    pub source_link: String,
    pub source_title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedChunk {
    #[serde(flatten)]
    pub chunk: TextChunk,
    pub score: f32,
}

/// Ephemeral similarity index over one source's chunks.
///
/// Each source gets its own index; chunks and embeddings are never mixed
/// across sources and the whole structure is dropped when the request
/// finishes.
pub struct SourceIndex {
    chunks: Vec<TextChunk>,
    embeddings: Vec<Vec<f32>>,
}

impl SourceIndex {
    /// Chunks, embeds, and indexes one extracted page.
    ///
    /// Returns `Ok(None)` when the page is discarded: extraction produced
    /// less text than the informative-length floor. The floor is checked
    /// here, once, before chunking; nothing re-checks it downstream.
    pub async fn build(
        embedder: &dyn LlmProvider,
        model_id: &str,
        page: &ExtractedPage,
        config: &RetrievalConfig,
    ) -> Result<Option<Self>, ApiError> {
        if page.text.chars().count() < config.min_informative_len {
            tracing::debug!(
                "Discarding {}: extracted text below {} chars",
                page.link,
                config.min_informative_len
            );
            return Ok(None);
        }

        let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap);
        let contents = splitter.split(&page.text);
        if contents.is_empty() {
            return Ok(None);
        }

        let embeddings = embedder.embed(&contents, model_id).await?;
        let chunks = contents
            .into_iter()
            .map(|content| TextChunk {
                source_link: page.link.clone(),
                source_title: page.title.clone(),
                content,
            })
            .collect();

        Ok(Some(Self { chunks, embeddings }))
    }

    /// Top-`top_k` chunks by similarity to the query, descending; equal
    /// scores keep original chunk order.
    pub async fn query(
        &self,
        embedder: &dyn LlmProvider,
        model_id: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, ApiError> {
        let mut query_vectors = embedder.embed(&[query.to_string()], model_id).await?;
        let query_vector = query_vectors
            .pop()
            .ok_or_else(|| ApiError::Upstream("no embedding returned for query".to_string()))?;

        let ranked = rank_descending_by_cosine(&query_vector, &self.embeddings)?;
        Ok(ranked
            .into_iter()
            .take(top_k)
            .map(|(idx, score)| RetrievedChunk {
                chunk: self.chunks[idx].clone(),
                score,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use crate::llm::types::{ChatRequest, ToolChatOutcome, ToolSpec};

    /// Embeds each text as a 2-d vector derived from its first byte, so
    /// similarity ordering is fully deterministic.
    struct ByteEmbedder;

    #[async_trait]
    impl LlmProvider for ByteEmbedder {
        fn name(&self) -> &str {
            "byte-embedder"
        }

        async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            unimplemented!("not used by index tests")
        }

        async fn stream_chat(
            &self,
            _request: ChatRequest,
            _model_id: &str,
        ) -> Result<mpsc::Receiver<Result<String, ApiError>>, ApiError> {
            unimplemented!("not used by index tests")
        }

        async fn chat_with_tools(
            &self,
            _request: ChatRequest,
            _tools: &[ToolSpec],
            _model_id: &str,
        ) -> Result<ToolChatOutcome, ApiError> {
            unimplemented!("not used by index tests")
        }

        async fn embed(
            &self,
            inputs: &[String],
            _model_id: &str,
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs
                .iter()
                .map(|input| {
                    let lead = input.bytes().next().unwrap_or(0) as f32;
                    vec![lead, 1.0]
                })
                .collect())
        }
    }

    fn page(text: &str) -> ExtractedPage {
        ExtractedPage {
            link: "https://example.com/page".to_string(),
            title: "Example".to_string(),
            text: text.to_string(),
        }
    }

    fn config() -> RetrievalConfig {
        RetrievalConfig {
            chunk_size: 200,
            chunk_overlap: 40,
            ..RetrievalConfig::default()
        }
    }

    #[tokio::test]
    async fn short_pages_are_discarded() {
        let index = SourceIndex::build(&ByteEmbedder, "m", &page("too short"), &config())
            .await
            .expect("build should not fail");
        assert!(index.is_none());
    }

    #[tokio::test]
    async fn empty_pages_are_discarded() {
        let index = SourceIndex::build(&ByteEmbedder, "m", &page(""), &config())
            .await
            .expect("build should not fail");
        assert!(index.is_none());
    }

    #[tokio::test]
    async fn informative_pages_are_indexed_and_queryable() {
        let text = "A sentence about coffee roasting in Boston. ".repeat(10);
        let index = SourceIndex::build(&ByteEmbedder, "m", &page(&text), &config())
            .await
            .expect("build should not fail")
            .expect("page should be indexed");
        assert!(!index.is_empty());

        let retrieved = index
            .query(&ByteEmbedder, "m", "Anything", 2)
            .await
            .expect("query should not fail");
        assert!(retrieved.len() <= 2);
        assert!(retrieved
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score));
        assert_eq!(retrieved[0].chunk.source_link, "https://example.com/page");
    }

    #[tokio::test]
    async fn top_k_is_an_upper_bound() {
        let text = "Coffee. ".repeat(40);
        let index = SourceIndex::build(&ByteEmbedder, "m", &page(&text), &config())
            .await
            .expect("build should not fail")
            .expect("page should be indexed");

        let retrieved = index
            .query(&ByteEmbedder, "m", "Coffee", 50)
            .await
            .expect("query should not fail");
        assert_eq!(retrieved.len(), index.len().min(50));
    }
}
