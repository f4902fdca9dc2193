use std::collections::HashSet;

use futures_util::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::index::{ExtractedPage, RetrievedChunk, SourceIndex};
use super::RetrievalConfig;
use crate::core::config::Settings;
use crate::core::errors::ApiError;
use crate::discovery::{discover_sources, SearchResult};
use crate::extract::fetch_page_text;
use crate::llm::LlmProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub title: String,
    pub link: String,
}

/// Merged output of the per-source pipelines.
///
/// `chunk_groups` holds one ranked chunk list per surviving source, in
/// discovery order. `attributions` is deduplicated by link across the
/// whole set.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalOutcome {
    pub chunk_groups: Vec<Vec<RetrievedChunk>>,
    pub attributions: Vec<SourceAttribution>,
}

/// Runs discovery, then fans out extract → index → query per source.
///
/// Sources that fail any step contribute nothing; the request fails only
/// if discovery itself fails. Surviving sources keep discovery order.
pub async fn gather_sources(
    client: &Client,
    settings: &Settings,
    embedder: &dyn LlmProvider,
    query: &str,
    config: &RetrievalConfig,
) -> Result<RetrievalOutcome, ApiError> {
    let sources = discover_sources(
        client,
        &settings.search_base_url,
        &settings.search_api_key,
        query,
        config.page_limit,
    )
    .await?;

    let tasks = sources.iter().map(|source| {
        process_source(
            client,
            embedder,
            &settings.embedding_model,
            query,
            source,
            config,
        )
    });
    let settled = join_all(tasks).await;

    let chunk_groups: Vec<Vec<RetrievedChunk>> = settled.into_iter().flatten().collect();
    let attributions = dedup_attributions(&chunk_groups);

    tracing::info!(
        "Retrieval complete: {} of {} sources contributed chunks",
        chunk_groups.len(),
        sources.len()
    );

    Ok(RetrievalOutcome {
        chunk_groups,
        attributions,
    })
}

/// One source's pipeline. Every failure mode is absorbed into `None`.
async fn process_source(
    client: &Client,
    embedder: &dyn LlmProvider,
    embedding_model: &str,
    query: &str,
    source: &SearchResult,
    config: &RetrievalConfig,
) -> Option<Vec<RetrievedChunk>> {
    let text = fetch_page_text(client, &source.link).await;
    let page = ExtractedPage {
        link: source.link.clone(),
        title: source.title.clone(),
        text,
    };

    let index = match SourceIndex::build(embedder, embedding_model, &page, config).await {
        Ok(Some(index)) => index,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!("Indexing failed for {}: {}", source.link, err);
            return None;
        }
    };

    match index.query(embedder, embedding_model, query, config.top_k).await {
        Ok(chunks) if !chunks.is_empty() => Some(chunks),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!("Similarity query failed for {}: {}", source.link, err);
            None
        }
    }
}

/// First occurrence per unique link, iterating chunks in merged order.
pub fn dedup_attributions(chunk_groups: &[Vec<RetrievedChunk>]) -> Vec<SourceAttribution> {
    let mut seen = HashSet::new();
    let mut attributions = Vec::new();

    for chunk in chunk_groups.iter().flatten() {
        if seen.insert(chunk.chunk.source_link.clone()) {
            attributions.push(SourceAttribution {
                title: chunk.chunk.source_title.clone(),
                link: chunk.chunk.source_link.clone(),
            });
        }
    }

    attributions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::index::TextChunk;

    fn retrieved(link: &str, title: &str, content: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk: TextChunk {
                source_link: link.to_string(),
                source_title: title.to_string(),
                content: content.to_string(),
            },
            score: 0.5,
        }
    }

    #[test]
    fn attributions_are_deduplicated_by_link() {
        let groups = vec![
            vec![
                retrieved("https://a.example", "A", "first"),
                retrieved("https://a.example", "A", "second"),
            ],
            vec![
                retrieved("https://b.example", "B", "third"),
                retrieved("https://a.example", "A again", "fourth"),
            ],
        ];

        let attributions = dedup_attributions(&groups);
        assert_eq!(attributions.len(), 2);
        assert_eq!(attributions[0].link, "https://a.example");
        assert_eq!(attributions[0].title, "A");
        assert_eq!(attributions[1].link, "https://b.example");
    }

    #[test]
    fn attribution_order_follows_chunk_order() {
        let groups = vec![
            vec![retrieved("https://z.example", "Z", "z")],
            vec![retrieved("https://a.example", "A", "a")],
        ];

        let attributions = dedup_attributions(&groups);
        assert_eq!(attributions[0].link, "https://z.example");
        assert_eq!(attributions[1].link, "https://a.example");
    }

    #[test]
    fn no_chunks_means_no_attributions() {
        let attributions = dedup_attributions(&[]);
        assert!(attributions.is_empty());
    }
}
