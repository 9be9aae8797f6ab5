use std::sync::Arc;

use krishi_core::traits::Embedder;
use krishi_core::{Corpus, Document, Error, Result};
use krishi_embed::HashingEmbedder;
use krishi_index::{IndexBuilder, IndexState};

fn doc(id: &str, title: &str, content: &str) -> Document {
    Document {
        id: id.to_string(),
        category: "crops".to_string(),
        subcategory: String::new(),
        title: title.to_string(),
        content: content.to_string(),
        tags: vec![],
    }
}

fn corpus() -> Corpus {
    Corpus::new(vec![
        doc("wheat", "Wheat Irrigation Timing", "Irrigate wheat at crown root initiation and flowering."),
        doc("rice", "Rice Pest Control", "Scout paddy fields and spray neem oil against planthoppers."),
        doc("maize", "Maize Growing Guide", "Fall armyworm is an invasive pest of maize."),
    ])
}

/// Hashing vectors scaled away from unit length, to exercise normalization.
struct Scaled(HashingEmbedder);

impl Embedder for Scaled {
    fn id(&self) -> &str { "scaled" }
    fn dim(&self) -> usize { self.0.dim() }
    fn max_len(&self) -> usize { 256 }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.0.embed_one(t).into_iter().map(|x| x * 7.5).collect()).collect())
    }
}

struct Broken;

impl Embedder for Broken {
    fn id(&self) -> &str { "broken" }
    fn dim(&self) -> usize { 8 }
    fn max_len(&self) -> usize { 256 }
    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(Error::BackendUnavailable("model weights missing".into()))
    }
}

/// Claims one dimension, produces another.
struct WrongDim;

impl Embedder for WrongDim {
    fn id(&self) -> &str { "wrong-dim" }
    fn dim(&self) -> usize { 8 }
    fn max_len(&self) -> usize { 256 }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0; 4]).collect())
    }
}

/// Drops the last vector of every batch.
struct ShortBatch;

impl Embedder for ShortBatch {
    fn id(&self) -> &str { "short" }
    fn dim(&self) -> usize { 2 }
    fn max_len(&self) -> usize { 256 }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
    }
}

#[test]
fn stored_vectors_are_unit_length_in_corpus_order() {
    let corpus = corpus();
    let state = IndexBuilder::new(2).build(&corpus, Arc::new(Scaled(HashingEmbedder::new(64, 256))));
    let index = state.as_ready().expect("index ready");

    assert_eq!(index.len(), 3);
    assert_eq!(index.dim(), 64);
    for pos in 0..index.len() {
        let v = index.vector(pos).expect("row");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "row {pos} norm={norm}");
        assert_eq!(index.corpus()[pos].id, corpus[pos].id);
    }
}

#[test]
fn document_text_finds_itself_with_similarity_one() {
    let corpus = corpus();
    let state = IndexBuilder::default().build(&corpus, Arc::new(Scaled(HashingEmbedder::new(128, 256))));
    let index = state.as_ready().expect("index ready");

    let hits = index.search(&corpus[1].embedding_text(), 3).expect("search");
    assert_eq!(hits[0].position, 1);
    assert!((hits[0].score - 1.0).abs() < 1e-5, "query is normalized too (score={})", hits[0].score);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn search_respects_k_and_is_deterministic() {
    let corpus = corpus();
    let state = IndexBuilder::default().build(&corpus, Arc::new(HashingEmbedder::new(64, 256)));
    let index = state.as_ready().expect("index ready");

    for k in 0..5 {
        assert!(index.search("wheat pest", k).expect("search").len() <= k);
    }
    assert_eq!(index.search("wheat pest", 3).unwrap(), index.search("wheat pest", 3).unwrap());
    // A query without tokens embeds to zero: every score is 0, ties fall back to corpus order.
    let ties: Vec<usize> = index.search("?!", 3).unwrap().iter().map(|h| h.position).collect();
    assert_eq!(ties, vec![0, 1, 2]);
}

#[test]
fn backend_failure_yields_unavailable_state() {
    let state = IndexBuilder::default().build(&corpus(), Arc::new(Broken));
    assert!(!state.is_ready());
    assert!(state.unavailable_reason().is_some_and(|r| r.contains("model weights missing")));
}

#[test]
fn malformed_backend_output_yields_unavailable_state() {
    assert!(matches!(IndexBuilder::default().build(&corpus(), Arc::new(WrongDim)), IndexState::Unavailable { .. }));
    assert!(matches!(IndexBuilder::new(2).build(&corpus(), Arc::new(ShortBatch)), IndexState::Unavailable { .. }));
}

#[test]
fn empty_corpus_builds_an_empty_index_without_calling_the_backend() {
    let state = IndexBuilder::default().build(&Corpus::default(), Arc::new(WrongDim));
    let index = state.as_ready().expect("empty index is still ready");
    assert!(index.is_empty());
    assert!(index.search("wheat", 3).expect("search").is_empty());
}
