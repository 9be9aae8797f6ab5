//! krishi-hybrid
//!
//! Vector-first retrieval with a keyword fallback, plus the helpers that turn
//! retrieved documents into prompt context and answers.
//!
//! Per query: if the embedding index is ready, embed the query, scan, keep the
//! top `k` hits scoring above the relevance threshold. If that path is
//! unavailable, fails for this call, or keeps nothing, rank by keyword overlap
//! instead. The two paths never mix results.

pub mod answer;
mod context;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use krishi_core::config::Settings;
use krishi_core::traits::{Embedder, Retriever};
use krishi_core::{Corpus, ScoredDocument};
use krishi_index::{IndexBuilder, IndexState};
use krishi_lexical::LexicalIndex;

pub use answer::{validate_query, Answer, AnswerBackend, AnswerMethod, Assistant, NO_MATCH_ANSWER};
pub use context::{filter_by_category, format_context};

pub struct HybridRetriever {
    corpus: Corpus,
    index: IndexState,
    lexical: LexicalIndex,
    relevance_threshold: f32,
}

/// Snapshot of what the retriever is running on.
#[derive(Debug, Clone, Serialize)]
pub struct RetrieverStatus {
    pub documents: usize,
    pub vector_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim: Option<usize>,
    pub relevance_threshold: f32,
}

impl HybridRetriever {
    /// `index` must have been built over `corpus`.
    pub fn new(corpus: Corpus, index: IndexState, relevance_threshold: f32) -> Self {
        let lexical = LexicalIndex::new(&corpus);
        Self { corpus, index, lexical, relevance_threshold }
    }

    /// Build the embedding index (when an embedder is available) and wrap it.
    pub fn build(corpus: Corpus, embedder: Option<Arc<dyn Embedder>>, settings: &Settings, progress: bool) -> Self {
        let index = match embedder {
            Some(embedder) => IndexBuilder::new(settings.embedding.batch_size).with_progress(progress).build(&corpus, embedder),
            None => IndexState::unavailable("no embedding backend loaded"),
        };
        Self::new(corpus, index, settings.retrieval.relevance_threshold)
    }

    pub fn corpus(&self) -> &Corpus { &self.corpus }
    pub fn index(&self) -> &IndexState { &self.index }
    pub fn relevance_threshold(&self) -> f32 { self.relevance_threshold }

    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<ScoredDocument> {
        if top_k == 0 { return Vec::new(); }
        let hits = self.vector_search(query, top_k);
        if !hits.is_empty() { return hits; }
        self.lexical_search(query, top_k)
    }

    /// Vector path only: hits above the threshold, or empty when the index is
    /// unavailable or the query could not be embedded.
    pub fn vector_search(&self, query: &str, top_k: usize) -> Vec<ScoredDocument> {
        let Some(index) = self.index.as_ready() else {
            debug!("embedding index unavailable");
            return Vec::new();
        };
        let hits = match index.search(query, top_k) {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "query embedding failed; using keyword matching for this query");
                return Vec::new();
            }
        };
        let results: Vec<ScoredDocument> = hits
            .into_iter()
            .filter(|h| h.score > self.relevance_threshold)
            .filter_map(|h| index.corpus().get(h.position).map(|doc| ScoredDocument::vector(doc.clone(), h.score)))
            .collect();
        debug!(results = results.len(), threshold = self.relevance_threshold, "vector search");
        results
    }

    /// Keyword path only. Results carry no relevance score.
    pub fn lexical_search(&self, query: &str, top_k: usize) -> Vec<ScoredDocument> {
        self.lexical
            .search(query, top_k)
            .into_iter()
            .filter_map(|h| self.corpus.get(h.position).cloned().map(ScoredDocument::lexical))
            .collect()
    }

    pub fn status(&self) -> RetrieverStatus {
        let ready = self.index.as_ready();
        RetrieverStatus {
            documents: self.corpus.len(),
            vector_ready: ready.is_some(),
            unavailable_reason: self.index.unavailable_reason().map(str::to_string),
            embedder: ready.map(|i| i.embedder_id().to_string()),
            dim: ready.map(|i| i.dim()),
            relevance_threshold: self.relevance_threshold,
        }
    }
}

impl Retriever for HybridRetriever {
    fn retrieve(&self, query: &str, top_k: usize) -> Vec<ScoredDocument> { Self::retrieve(self, query, top_k) }
}
