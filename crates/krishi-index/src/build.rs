use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use krishi_core::traits::Embedder;
use krishi_core::{Corpus, Document, Error, Result};

use crate::normalize::l2_normalize;
use crate::{EmbeddingIndex, IndexState};

pub struct IndexBuilder {
    batch_size: usize,
    progress: bool,
}

impl Default for IndexBuilder {
    fn default() -> Self { Self { batch_size: 16, progress: false } }
}

impl IndexBuilder {
    pub fn new(batch_size: usize) -> Self { Self { batch_size: batch_size.max(1), progress: false } }

    /// Draw a progress bar on stderr while embedding.
    pub fn with_progress(mut self, progress: bool) -> Self { self.progress = progress; self }

    /// Embed every document and assemble the index.
    ///
    /// Never fails: a backend error, a short batch or a dimension mismatch is
    /// logged and yields [`IndexState::Unavailable`].
    pub fn build(&self, corpus: &Corpus, embedder: Arc<dyn Embedder>) -> IndexState {
        let start = Instant::now();
        match self.embed_corpus(corpus, embedder.as_ref()) {
            Ok(vectors) => {
                info!(documents = vectors.len(), dim = embedder.dim(), embedder = embedder.id(), elapsed_ms = start.elapsed().as_millis() as u64, "embedding index built");
                IndexState::Ready(EmbeddingIndex { dim: embedder.dim(), embedder, vectors, corpus: corpus.clone() })
            }
            Err(e) => {
                warn!(error = %e, "embedding index unavailable; retrieval will use keyword matching");
                IndexState::unavailable(e.to_string())
            }
        }
    }

    fn embed_corpus(&self, corpus: &Corpus, embedder: &dyn Embedder) -> Result<Vec<Vec<f32>>> {
        let dim = embedder.dim();
        if dim == 0 { return Err(Error::BackendUnavailable(format!("{} reports zero dimensions", embedder.id()))); }
        let texts: Vec<String> = corpus.iter().map(Document::embedding_text).collect();
        let pb = self.progress_bar(texts.len());
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let embedded = embedder.embed_batch(batch)?;
            if embedded.len() != batch.len() {
                return Err(Error::BackendUnavailable(format!("backend returned {} vectors for {} texts", embedded.len(), batch.len())));
            }
            for mut v in embedded {
                if v.len() != dim {
                    return Err(Error::BackendUnavailable(format!("expected {dim}-dimensional vectors, got {}", v.len())));
                }
                l2_normalize(&mut v);
                vectors.push(v);
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();
        Ok(vectors)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress { return ProgressBar::hidden(); }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%)") {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}
