//! Answer assembly on top of retrieval.
//!
//! Generative backends are injected through [`AnswerBackend`] and tried in
//! order. When none of them produces text, the top retrieved document is the
//! answer; when nothing was retrieved, the farmer is pointed to the Kisan Call
//! Center.

use serde::Serialize;
use tracing::{debug, warn};

use krishi_core::traits::Retriever;
use krishi_core::{Error, Result, ScoredDocument};

use crate::context::{filter_by_category, format_context};

pub const NO_MATCH_ANSWER: &str =
    "I couldn't find specific information. Please call Kisan Call Center: 1800-180-1551 for expert advice.";

const MIN_QUERY_CHARS: usize = 3;
const MAX_QUERY_CHARS: usize = 1000;

pub trait AnswerBackend: Send + Sync {
    fn name(&self) -> &str;
    fn generate(&self, query: &str, context: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerMethod {
    Generated { backend: String },
    KnowledgeBase,
    NoMatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub method: AnswerMethod,
    pub sources: Vec<ScoredDocument>,
}

/// Reject queries that are blank, shorter than three characters or longer
/// than a thousand. Returns the trimmed query.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    let len = trimmed.chars().count();
    if len < MIN_QUERY_CHARS {
        return Err(Error::InvalidQuery(format!("query too short (min {MIN_QUERY_CHARS} characters)")));
    }
    if len > MAX_QUERY_CHARS {
        return Err(Error::InvalidQuery(format!("query too long (max {MAX_QUERY_CHARS} characters)")));
    }
    Ok(trimmed)
}

pub struct Assistant<R> {
    retriever: R,
    backends: Vec<Box<dyn AnswerBackend>>,
    top_k: usize,
}

impl<R: Retriever> Assistant<R> {
    pub fn new(retriever: R, top_k: usize) -> Self {
        Self { retriever, backends: Vec::new(), top_k }
    }

    pub fn with_backend(mut self, backend: Box<dyn AnswerBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn answer(&self, query: &str, category: Option<&str>) -> Result<Answer> {
        let query = validate_query(query)?;
        let sources = filter_by_category(self.retriever.retrieve(query, self.top_k), category);
        let Some(top) = sources.first() else {
            return Ok(Answer { text: NO_MATCH_ANSWER.to_string(), method: AnswerMethod::NoMatch, sources });
        };

        let context = format_context(&sources);
        for backend in &self.backends {
            match backend.generate(query, &context) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(backend = backend.name(), "answer generated");
                    let method = AnswerMethod::Generated { backend: backend.name().to_string() };
                    return Ok(Answer { text: text.trim().to_string(), method, sources });
                }
                Ok(_) => warn!(backend = backend.name(), "backend returned an empty answer"),
                Err(e) => warn!(backend = backend.name(), error = %e, "answer backend failed"),
            }
        }

        let text = top.document.content.clone();
        Ok(Answer { text, method: AnswerMethod::KnowledgeBase, sources })
    }
}
