use serde::Serialize;

use krishi_core::types::CategoryCount;
use krishi_core::{Document, RetrievalMethod, ScoredDocument};
use krishi_hybrid::answer::{Answer, AnswerMethod};
use krishi_hybrid::RetrieverStatus;

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    results: &'a [ScoredDocument],
}

#[derive(Serialize)]
struct AnswerOutput<'a> {
    query: &'a str,
    #[serde(flatten)]
    answer: &'a Answer,
}

pub fn format_results_json(query: &str, results: &[ScoredDocument]) -> String {
    serde_json::to_string_pretty(&SearchOutput { query, results }).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

pub fn format_results_human(query: &str, results: &[ScoredDocument]) -> String {
    if results.is_empty() {
        return format!("No knowledge found for: \"{query}\"");
    }
    let mut out = format!("🔍 Found {} results for: \"{}\"\n", results.len(), query);
    for (i, r) in results.iter().enumerate() {
        let d = &r.document;
        out.push_str(&format!("\n  {}. {}  id={}  category={}\n", i + 1, match_label(r), d.id, category_path(d)));
        out.push_str(&format!("     {}\n", d.title));
    }
    out
}

pub fn format_answer_json(query: &str, answer: &Answer) -> String {
    serde_json::to_string_pretty(&AnswerOutput { query, answer }).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

pub fn format_answer_human(answer: &Answer) -> String {
    let mut out = format!("{}\n", answer.text);
    let via = match &answer.method {
        AnswerMethod::Generated { backend } => format!("generated by {backend}"),
        AnswerMethod::KnowledgeBase => "from the knowledge base".to_string(),
        AnswerMethod::NoMatch => return out,
    };
    out.push_str(&format!("\n📚 Sources ({via}):\n"));
    for (i, r) in answer.sources.iter().enumerate() {
        out.push_str(&format!("  {}. {} [{}] {}\n", i + 1, r.document.title, r.document.id, match_label(r)));
    }
    out
}

pub fn format_categories(categories: &[CategoryCount]) -> String {
    categories.iter().map(|c| format!("  {}: {} documents", c.name, c.count)).collect::<Vec<_>>().join("\n")
}

pub fn format_document(doc: &Document) -> String {
    format!("[{}] {}\ncategory: {}\ntags: {}\n\n{}", doc.id, doc.title, category_path(doc), doc.tags.join(", "), doc.content)
}

pub fn format_status(status: &RetrieverStatus) -> String {
    let vector = match (&status.embedder, status.dim) {
        (Some(embedder), Some(dim)) => format!("ready ({embedder}, {dim} dims)"),
        _ => format!("unavailable ({})", status.unavailable_reason.as_deref().unwrap_or("unknown")),
    };
    format!(
        "documents: {}\nvector index: {}\nrelevance threshold: {}",
        status.documents, vector, status.relevance_threshold
    )
}

fn match_label(r: &ScoredDocument) -> String {
    match (r.method, r.relevance_score) {
        (RetrievalMethod::Vector, Some(score)) => format!("score={score:.4}"),
        _ => "keyword match".to_string(),
    }
}

fn category_path(doc: &Document) -> String {
    if doc.subcategory.is_empty() { doc.category.clone() } else { format!("{}/{}", doc.category, doc.subcategory) }
}
