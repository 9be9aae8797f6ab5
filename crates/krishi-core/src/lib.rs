//! krishi-core
//!
//! Shared domain types, traits, configuration and the corpus loader used by the
//! embedding, index, lexical and hybrid crates.

pub mod config;
pub mod corpus;
pub mod error;
pub mod traits;
pub mod types;

pub use corpus::load_corpus;
pub use error::{Error, Result};
pub use types::{Corpus, Document, RetrievalMethod, ScoredDocument};
