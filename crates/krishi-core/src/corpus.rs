//! Corpus loader.
//!
//! Reads a JSON array of documents from a single file, or every `*.json` file
//! below a directory in path order. Document order in the files is preserved.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::{Corpus, Document};

pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let files = if path.is_dir() { list_json_files(path) } else { vec![path.to_path_buf()] };
    if files.is_empty() {
        warn!(dir = %path.display(), "no .json corpus files found");
        return Ok(Corpus::default());
    }

    let mut docs = Vec::new();
    for file in &files {
        docs.extend(read_documents(file)?);
    }

    let mut seen = HashSet::new();
    for doc in &docs {
        if !seen.insert(doc.id.as_str()) {
            warn!(id = %doc.id, "duplicate document id in corpus");
        }
    }

    info!(files = files.len(), documents = docs.len(), "loaded corpus");
    Ok(Corpus::new(docs))
}

fn read_documents(file: &Path) -> Result<Vec<Document>> {
    let corpus_err = |reason: String| Error::Corpus { path: file.display().to_string(), reason };
    let raw = fs::read_to_string(file).map_err(|e| corpus_err(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| corpus_err(e.to_string()))
}

fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();
    files
}
