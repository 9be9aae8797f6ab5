//! krishi-index
//!
//! In-memory embedding index over the knowledge corpus: one unit-length
//! vector per document, stored in corpus order, searched by an exact
//! inner-product scan. Built once by [`IndexBuilder`], read-only afterwards.

mod build;
mod normalize;
mod search;

use std::fmt;
use std::sync::Arc;

use krishi_core::traits::Embedder;
use krishi_core::Corpus;

pub use build::IndexBuilder;
pub use normalize::{dot, l2_normalize};
pub use search::VectorHit;

/// Immutable vectors plus the parallel document list.
///
/// Row `i` of the vectors belongs to `corpus[i]`; the embedder is kept so that
/// queries are embedded by the same model as the documents.
pub struct EmbeddingIndex {
    embedder: Arc<dyn Embedder>,
    vectors: Vec<Vec<f32>>,
    corpus: Corpus,
    dim: usize,
}

impl EmbeddingIndex {
    pub fn corpus(&self) -> &Corpus { &self.corpus }
    pub fn dim(&self) -> usize { self.dim }
    pub fn len(&self) -> usize { self.vectors.len() }
    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }
    pub fn embedder_id(&self) -> &str { self.embedder.id() }
    pub fn vector(&self, position: usize) -> Option<&[f32]> { self.vectors.get(position).map(Vec::as_slice) }
}

impl fmt::Debug for EmbeddingIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingIndex")
            .field("embedder", &self.embedder.id())
            .field("rows", &self.vectors.len())
            .field("dim", &self.dim)
            .finish()
    }
}

/// Outcome of an index build. `Unavailable` routes every query to the
/// keyword fallback.
#[derive(Debug)]
pub enum IndexState {
    Ready(EmbeddingIndex),
    Unavailable { reason: String },
}

impl IndexState {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable { reason: reason.into() }
    }

    pub fn is_ready(&self) -> bool { matches!(self, Self::Ready(_)) }

    pub fn as_ready(&self) -> Option<&EmbeddingIndex> {
        match self {
            Self::Ready(index) => Some(index),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}
