use crate::error::Result;
use crate::types::ScoredDocument;

/// Text → fixed-dimension vector capability.
///
/// Implementations must be deterministic: embedding the same string twice
/// yields vectors with cosine similarity 1.0 within float tolerance. A backend
/// that cannot serve a call returns [`crate::Error::BackendUnavailable`].
pub trait Embedder: Send + Sync {
    /// Stable identifier for the backend/model (e.g. `hashing:xxh64:d384`).
    fn id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

pub trait Retriever: Send + Sync {
    /// Ranked documents for `query`, at most `top_k` of them.
    fn retrieve(&self, query: &str, top_k: usize) -> Vec<ScoredDocument>;
}

impl<T: Retriever + ?Sized> Retriever for std::sync::Arc<T> {
    fn retrieve(&self, query: &str, top_k: usize) -> Vec<ScoredDocument> { (**self).retrieve(query, top_k) }
}

impl<T: Retriever + ?Sized> Retriever for &T {
    fn retrieve(&self, query: &str, top_k: usize) -> Vec<ScoredDocument> { (**self).retrieve(query, top_k) }
}
