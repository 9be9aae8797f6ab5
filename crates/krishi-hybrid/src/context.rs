use krishi_core::ScoredDocument;

use crate::HybridRetriever;

/// `[Source N: <title>]` blocks separated by a blank line; empty when `docs` is.
pub fn format_context(docs: &[ScoredDocument]) -> String {
    docs.iter()
        .enumerate()
        .map(|(i, d)| format!("[Source {}: {}]\n{}", i + 1, d.document.title, d.document.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Keep results in `category`. `None` and `"all"` keep everything, and so does
/// a filter that would leave nothing.
pub fn filter_by_category(results: Vec<ScoredDocument>, category: Option<&str>) -> Vec<ScoredDocument> {
    let Some(category) = category.filter(|c| !c.is_empty() && *c != "all") else { return results };
    if results.iter().any(|r| r.document.category == category) {
        results.into_iter().filter(|r| r.document.category == category).collect()
    } else {
        results
    }
}

impl HybridRetriever {
    pub fn get_context(&self, query: &str, top_k: usize) -> (String, Vec<ScoredDocument>) {
        let docs = self.retrieve(query, top_k);
        (format_context(&docs), docs)
    }

    pub fn retrieve_in_category(&self, query: &str, top_k: usize, category: Option<&str>) -> Vec<ScoredDocument> {
        filter_by_category(self.retrieve(query, top_k), category)
    }
}
