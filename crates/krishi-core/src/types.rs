//! Domain types shared by the vector and lexical engines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

/// A knowledge entry.
///
/// - `id`: unique identifier assigned when the corpus is authored
/// - `category`/`subcategory`: free-text classification tags
/// - `title`/`content`: the text that gets embedded
/// - `tags`: lexical hints, used only by the keyword fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    pub title: String,
    pub content: String,
    #[serde(default, alias = "keywords")]
    pub tags: Vec<String>,
}

impl Document {
    /// Text handed to the embedding model. Tags are deliberately left out.
    pub fn embedding_text(&self) -> String {
        format!("{}. {}", self.title, self.content)
    }
}

/// The immutable, ordered document set.
///
/// Position in the corpus is the join key between embedding rows and
/// documents, so the order is fixed at construction. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    docs: Arc<[Document]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

impl Corpus {
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs: docs.into() }
    }

    pub fn get(&self, position: usize) -> Option<&Document> {
        self.docs.get(position)
    }

    pub fn find(&self, id: &str) -> Option<&Document> {
        self.docs.iter().find(|d| d.id == id)
    }

    /// Document counts per category, in order of first appearance.
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut out: Vec<CategoryCount> = Vec::new();
        for doc in self.docs.iter() {
            match slots.get(doc.category.as_str()) {
                Some(&slot) => out[slot].count += 1,
                None => {
                    slots.insert(doc.category.as_str(), out.len());
                    out.push(CategoryCount { name: doc.category.clone(), count: 1 });
                }
            }
        }
        out
    }
}

impl Deref for Corpus {
    type Target = [Document];

    fn deref(&self) -> &[Document] {
        &self.docs
    }
}

impl From<Vec<Document>> for Corpus {
    fn from(docs: Vec<Document>) -> Self {
        Self::new(docs)
    }
}

/// Indicates which ranking path produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMethod {
    Vector,
    Lexical,
}

/// A retrieved document, built fresh for every query.
///
/// `relevance_score` is the cosine similarity for vector results and absent
/// for lexical results, which carry no normalized score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    #[serde(flatten)]
    pub document: Document,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f32>,
    pub method: RetrievalMethod,
}

impl ScoredDocument {
    pub fn vector(document: Document, score: f32) -> Self {
        Self { document, relevance_score: Some(score), method: RetrievalMethod::Vector }
    }

    pub fn lexical(document: Document) -> Self {
        Self { document, relevance_score: None, method: RetrievalMethod::Lexical }
    }
}
