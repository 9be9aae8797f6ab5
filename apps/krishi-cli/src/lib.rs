//! Start-up shared by the `krishi` binaries: configuration, corpus, embedding
//! backend and retriever, in that order, before any query is served.

pub mod output;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use krishi_core::config::{Config, Settings};
use krishi_core::load_corpus;
use krishi_embed::load_embedder;
use krishi_hybrid::HybridRetriever;

pub struct App {
    pub settings: Settings,
    pub retriever: Arc<HybridRetriever>,
}

#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Directory holding `config.toml`; the working directory when unset.
    pub config_dir: Option<PathBuf>,
    /// Skip loading the embedding backend entirely.
    pub lexical_only: bool,
    pub progress: bool,
}

/// Log to stderr so stdout carries only results. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn bootstrap(opts: &StartupOptions) -> Result<App> {
    let config = match &opts.config_dir {
        Some(dir) => Config::load_from(dir)?,
        None => Config::load()?,
    };
    let settings = config.settings()?;

    let corpus_path = config.resolve(&settings.corpus.path);
    let corpus = load_corpus(&corpus_path).with_context(|| format!("loading corpus from {}", corpus_path.display()))?;

    let embedder = if opts.lexical_only {
        None
    } else {
        match load_embedder(&settings.embedding, config.base_dir()) {
            Ok(embedder) => Some(embedder),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "no embedding backend; answering with keyword matching only");
                None
            }
        }
    };

    let retriever = HybridRetriever::build(corpus, embedder, &settings, opts.progress);
    Ok(App { settings, retriever: Arc::new(retriever) })
}
