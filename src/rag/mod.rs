pub mod chunker;
pub mod index;
pub mod orchestrator;

pub use chunker::TextSplitter;
pub use index::{ExtractedPage, RetrievedChunk, SourceIndex, TextChunk};
pub use orchestrator::{gather_sources, RetrievalOutcome, SourceAttribution};

/// Per-request retrieval tuning, threaded explicitly through every
/// pipeline stage. Concurrent requests each carry their own copy.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, in characters.
    pub chunk_overlap: usize,
    /// Chunks retained per source.
    pub top_k: usize,
    /// Sources taken from discovery.
    pub page_limit: usize,
    /// Pages with less extracted text than this are discarded outright.
    pub min_informative_len: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 200,
            top_k: 2,
            page_limit: 4,
            min_informative_len: 250,
        }
    }
}
