use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use krishi_core::config::Settings;
use krishi_core::traits::Embedder;
use krishi_core::{Corpus, Document, Error, RetrievalMethod, Result};
use krishi_embed::HashingEmbedder;
use krishi_hybrid::HybridRetriever;
use krishi_index::{IndexBuilder, IndexState};

/// Maps words onto a handful of agronomy concepts so that paraphrases land
/// near each other ("watering" ~ "irrigation") without any model files.
struct ConceptEmbedder {
    fail_queries: Arc<AtomicBool>,
}

const CONCEPTS: &[&[&str]] = &[
    &["water", "watering", "irrigation", "irrigate"],
    &["wheat"],
    &["rice", "paddy"],
    &["pest", "pests", "insect", "planthoppers"],
    &["timing", "when", "schedule"],
    &["crop", "crops"],
    &["control", "management"],
];

impl ConceptEmbedder {
    fn new() -> Self { Self { fail_queries: Arc::new(AtomicBool::new(false)) } }

    fn embed_one(text: &str) -> Vec<f32> {
        let mut v = vec![0f32; CONCEPTS.len()];
        for word in text.split(|c: char| !c.is_alphanumeric()).map(str::to_lowercase) {
            if let Some(axis) = CONCEPTS.iter().position(|words| words.contains(&word.as_str())) {
                v[axis] += 1.0;
            }
        }
        v
    }
}

impl Embedder for ConceptEmbedder {
    fn id(&self) -> &str { "concepts" }
    fn dim(&self) -> usize { CONCEPTS.len() }
    fn max_len(&self) -> usize { 256 }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.len() == 1 && self.fail_queries.load(Ordering::SeqCst) {
            return Err(Error::BackendUnavailable("connection reset".into()));
        }
        Ok(texts.iter().map(|t| Self::embed_one(t)).collect())
    }
}

fn doc(id: &str, category: &str, title: &str, content: &str, tags: &[&str]) -> Document {
    Document {
        id: id.to_string(),
        category: category.to_string(),
        subcategory: String::new(),
        title: title.to_string(),
        content: content.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn wheat_and_rice() -> Corpus {
    Corpus::new(vec![
        doc("wheat", "irrigation", "Wheat Irrigation Timing", "Irrigate wheat at crown root initiation, tillering and flowering stages.", &["wheat", "irrigation", "timing"]),
        doc("rice", "pests", "Rice Pest Control", "Scout paddy fields weekly and spray neem oil against planthoppers.", &["rice", "pest", "planthopper"]),
    ])
}

fn with_concepts(corpus: Corpus, threshold: f32) -> HybridRetriever {
    let index = IndexBuilder::default().build(&corpus, Arc::new(ConceptEmbedder::new()));
    HybridRetriever::new(corpus, index, threshold)
}

fn lexical_only(corpus: Corpus) -> HybridRetriever {
    HybridRetriever::new(corpus, IndexState::unavailable("forced off"), 0.15)
}

fn ids(results: &[krishi_core::ScoredDocument]) -> Vec<&str> {
    results.iter().map(|r| r.document.id.as_str()).collect()
}

#[test]
fn lexical_fallback_returns_exactly_the_wheat_document() {
    let retriever = lexical_only(wheat_and_rice());
    let results = retriever.retrieve("when should I water my wheat", 3);

    assert_eq!(ids(&results), vec!["wheat"]);
    assert_eq!(results[0].method, RetrievalMethod::Lexical);
    assert!(results[0].relevance_score.is_none(), "lexical results carry no score");
}

#[test]
fn vector_path_bridges_paraphrase_without_falling_back() {
    let retriever = with_concepts(wheat_and_rice(), 0.15);
    let results = retriever.retrieve("my wheat crop needs watering advice", 3);

    assert_eq!(ids(&results), vec!["wheat"]);
    assert_eq!(results[0].method, RetrievalMethod::Vector);
    let score = results[0].relevance_score.expect("vector results are scored");
    assert!(score > 0.15 && score <= 1.0 + 1e-6, "score={score}");
}

#[test]
fn nothing_above_threshold_falls_back_to_keywords() {
    let retriever = with_concepts(wheat_and_rice(), 0.15);
    // No concept words: the query embeds to zero and every similarity is 0.
    let results = retriever.retrieve("crown root initiation", 3);

    assert_eq!(ids(&results), vec!["wheat"]);
    assert_eq!(results[0].method, RetrievalMethod::Lexical);
}

#[test]
fn failed_query_embedding_falls_back_for_that_call_only() {
    let corpus = wheat_and_rice();
    let embedder = ConceptEmbedder::new();
    let fail = Arc::clone(&embedder.fail_queries);
    let index = IndexBuilder::default().build(&corpus, Arc::new(embedder));
    let retriever = HybridRetriever::new(corpus, index, 0.15);

    fail.store(true, Ordering::SeqCst);
    let degraded = retriever.retrieve("rice pest", 3);
    assert_eq!(ids(&degraded), vec!["rice"]);
    assert_eq!(degraded[0].method, RetrievalMethod::Lexical);

    fail.store(false, Ordering::SeqCst);
    let recovered = retriever.retrieve("rice pest", 3);
    assert_eq!(recovered[0].method, RetrievalMethod::Vector);
    assert!(retriever.index().is_ready(), "index is untouched by a failed call");
}

#[test]
fn retrieve_is_deterministic() {
    let retriever = with_concepts(wheat_and_rice(), 0.0);
    let first = retriever.retrieve("when to irrigate rice paddy against pests", 2);
    let second = retriever.retrieve("when to irrigate rice paddy against pests", 2);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn raising_the_threshold_never_adds_results() {
    let queries = ["water wheat", "rice pest control timing", "crop management", "watering paddy"];
    let thresholds = [-1.0, 0.0, 0.1, 0.3, 0.5, 0.7, 0.9, 0.99];
    for q in queries {
        let mut previous = usize::MAX;
        for t in thresholds {
            let n = with_concepts(wheat_and_rice(), t).vector_search(q, 5).len();
            assert!(n <= previous, "query {q:?}: threshold {t} gave {n} > {previous}");
            previous = n;
        }
    }
}

#[test]
fn results_never_exceed_top_k() {
    let mut docs = Vec::new();
    for i in 0..12 {
        docs.push(doc(&format!("d{i}"), "crops", "Wheat notes", &format!("Irrigate wheat, entry {i}."), &["wheat"]));
    }
    let corpus = Corpus::new(docs);
    let vector = with_concepts(corpus.clone(), 0.0);
    let lexical = lexical_only(corpus);
    for k in 0..15 {
        assert!(vector.retrieve("wheat irrigation", k).len() <= k);
        assert!(lexical.retrieve("wheat irrigation", k).len() <= k);
    }
    assert!(vector.retrieve("wheat irrigation", 0).is_empty());
}

#[test]
fn unavailable_index_never_errors() {
    let retriever = lexical_only(wheat_and_rice());
    assert!(retriever.retrieve("cotton bollworm traps", 3).is_empty());
    assert!(retriever.retrieve("?", 3).is_empty());
    assert_eq!(retriever.retrieve("planthopper", 3)[0].document.id, "rice");
}

#[test]
fn empty_corpus_returns_nothing_either_way() {
    assert!(with_concepts(Corpus::default(), 0.15).retrieve("wheat", 3).is_empty());
    assert!(lexical_only(Corpus::default()).retrieve("wheat", 3).is_empty());
}

#[test]
fn build_without_embedder_is_lexical_only() {
    let retriever = HybridRetriever::build(wheat_and_rice(), None, &Settings::default(), false);
    let status = retriever.status();

    assert!(!status.vector_ready);
    assert_eq!(status.documents, 2);
    assert!(status.embedder.is_none());
    assert_eq!(retriever.retrieve("rice", 1)[0].method, RetrievalMethod::Lexical);
}

#[test]
fn build_with_hashing_embedder_reports_status() {
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(64, 256));
    let retriever = HybridRetriever::build(wheat_and_rice(), Some(embedder), &Settings::default(), false);
    let status = retriever.status();

    assert!(status.vector_ready);
    assert_eq!(status.embedder.as_deref(), Some("hashing:xxh64:d64"));
    assert_eq!(status.dim, Some(64));
    assert!(status.unavailable_reason.is_none());
}

#[test]
fn get_context_formats_numbered_sources() {
    let retriever = lexical_only(wheat_and_rice());
    let (context, docs) = retriever.get_context("wheat rice", 3);

    assert_eq!(docs.len(), 2);
    assert_eq!(
        context,
        "[Source 1: Wheat Irrigation Timing]\nIrrigate wheat at crown root initiation, tillering and flowering stages.\n\n\
         [Source 2: Rice Pest Control]\nScout paddy fields weekly and spray neem oil against planthoppers."
    );

    let (empty, none) = retriever.get_context("cotton", 3);
    assert!(empty.is_empty() && none.is_empty());
}

#[test]
fn category_filter_keeps_matches_or_everything() {
    let retriever = lexical_only(wheat_and_rice());

    assert_eq!(ids(&retriever.retrieve_in_category("wheat rice", 3, Some("pests"))), vec!["rice"]);
    assert_eq!(ids(&retriever.retrieve_in_category("wheat rice", 3, Some("all"))), vec!["wheat", "rice"]);
    assert_eq!(ids(&retriever.retrieve_in_category("wheat rice", 3, Some("market"))), vec!["wheat", "rice"]);
    assert_eq!(ids(&retriever.retrieve_in_category("wheat rice", 3, None)), vec!["wheat", "rice"]);
}

#[test]
fn scored_document_serializes_flat() {
    let retriever = with_concepts(wheat_and_rice(), 0.15);
    let vector = serde_json::to_value(&retriever.retrieve("water wheat", 1)[0]).unwrap();
    assert_eq!(vector["id"], "wheat");
    assert_eq!(vector["method"], "vector");
    assert!(vector["relevance_score"].as_f64().is_some());

    let lexical = serde_json::to_value(&lexical_only(wheat_and_rice()).retrieve("wheat", 1)[0]).unwrap();
    assert!(lexical.get("relevance_score").is_none());
    assert_eq!(lexical["tags"][0], "wheat");
}

#[tokio::test]
async fn concurrent_retrieval_shares_one_index() {
    let retriever = Arc::new(with_concepts(wheat_and_rice(), 0.15));
    let expected = retriever.retrieve("rice pest control", 2);

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let r = Arc::clone(&retriever);
        tasks.push(tokio::task::spawn_blocking(move || r.retrieve("rice pest control", 2)));
    }
    for task in tasks {
        assert_eq!(task.await.expect("join"), expected);
    }
}
