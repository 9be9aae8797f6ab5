//! krishi-lexical
//!
//! Keyword-overlap scoring over the corpus, used when vector search is
//! unavailable or finds nothing above the relevance threshold.
//!
//! A query term is a lower-cased whitespace token longer than two characters.
//! A document scores one point per term found anywhere in its title, content
//! or tags, plus two more per term found inside one of its tags.

use std::collections::BTreeSet;

use tracing::debug;

use krishi_core::{Corpus, Document};

/// Lower-cased searchable text and tags, precomputed per document.
struct Entry {
    searchable: String,
    tags: Vec<String>,
}

pub struct LexicalIndex {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalHit {
    pub position: usize,
    pub score: u32,
}

pub fn query_terms(query: &str) -> BTreeSet<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

impl LexicalIndex {
    pub fn new(corpus: &Corpus) -> Self {
        Self { entries: corpus.iter().map(entry).collect() }
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn score(&self, position: usize, terms: &BTreeSet<String>) -> u32 {
        let Some(e) = self.entries.get(position) else { return 0 };
        let mut score = 0;
        for term in terms {
            if e.searchable.contains(term.as_str()) { score += 1; }
            if e.tags.iter().any(|tag| tag.contains(term.as_str())) { score += 2; }
        }
        score
    }

    /// Documents with a non-zero score, best first, at most `k`.
    /// Equal scores keep corpus order.
    pub fn search(&self, query: &str, k: usize) -> Vec<LexicalHit> {
        let terms = query_terms(query);
        if k == 0 || terms.is_empty() { return Vec::new(); }
        let mut hits: Vec<LexicalHit> = (0..self.entries.len())
            .map(|position| LexicalHit { position, score: self.score(position, &terms) })
            .filter(|h| h.score > 0)
            .collect();
        hits.sort_by(|a, b| b.score.cmp(&a.score).then(a.position.cmp(&b.position)));
        hits.truncate(k);
        debug!(terms = terms.len(), hits = hits.len(), "lexical search");
        hits
    }
}

fn entry(doc: &Document) -> Entry {
    let searchable = format!("{} {} {}", doc.title, doc.content, doc.tags.join(" ")).to_lowercase();
    Entry { searchable, tags: doc.tags.iter().map(|t| t.to_lowercase()).collect() }
}
