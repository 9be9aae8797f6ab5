use krishi_core::{Error, Result};

use crate::normalize::{dot, l2_normalize};
use crate::EmbeddingIndex;

/// A raw scan hit: corpus position and cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorHit {
    pub position: usize,
    pub score: f32,
}

impl EmbeddingIndex {
    /// Exact top-`k` by inner product against every stored row.
    ///
    /// Ties are broken by corpus position so repeated calls rank identically.
    /// No relevance threshold is applied here.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<VectorHit>> {
        if k == 0 || self.vectors.is_empty() { return Ok(Vec::new()); }
        let mut q = self.embed_query(query)?;
        l2_normalize(&mut q);
        let mut hits: Vec<VectorHit> = self.vectors.iter().enumerate()
            .map(|(position, row)| VectorHit { position, score: dot(row, &q) })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.position.cmp(&b.position)));
        hits.truncate(k);
        Ok(hits)
    }

    fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let q = self.embedder.embed_batch(&[query.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::BackendUnavailable("no vector returned for query".into()))?;
        if q.len() != self.dim {
            return Err(Error::BackendUnavailable(format!("query vector has {} dimensions, index has {}", q.len(), self.dim)));
        }
        Ok(q)
    }
}
