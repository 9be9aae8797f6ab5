//! Embedding backends for the knowledge index.
//!
//! [`EmbeddingModel`] runs a BERT-family sentence encoder (the
//! `all-MiniLM-L6-v2` layout: `config.json`, `tokenizer.json` and
//! `model.safetensors` or `pytorch_model.bin`) with candle, mean-pooling the
//! last hidden state. [`HashingEmbedder`] is the model-free alternative.
//! [`load_embedder`] picks one from configuration.

mod device;
mod hashing;
mod pool;
mod tokenize;

use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use krishi_core::config::{resolve_with_base, EmbeddingBackend, EmbeddingSettings};
use krishi_core::traits::Embedder;

pub use device::select_device;
pub use hashing::HashingEmbedder;
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_batch;

const DEFAULT_MODEL_DIR: &str = "models/all-MiniLM-L6-v2";

pub struct EmbeddingModel { model: BertModel, tokenizer: Tokenizer, device: Device, pad_id: u32, dim: usize, max_len: usize, id: String }

impl EmbeddingModel {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading sentence encoder");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let meta: serde_json::Value = serde_json::from_str(&raw_config)?;
        let dim = meta["hidden_size"].as_u64().ok_or_else(|| anyhow!("config.json has no hidden_size"))? as usize;
        let max_positions = meta["max_position_embeddings"].as_u64().map_or(max_len, |n| n as usize);
        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DTYPE, &device);
        let model = BertModel::load(vb, &config)?;
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);
        let name = model_dir.file_name().map_or_else(|| "bert".to_string(), |n| n.to_string_lossy().to_string());
        info!(model = %name, dim, "sentence encoder loaded");
        Ok(Self { model, tokenizer, device, pad_id, dim, max_len: max_len.min(max_positions), id: format!("candle:{name}:d{dim}") })
    }

    pub fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        debug!(texts = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(rows)
    }
}

impl Embedder for EmbeddingModel {
    fn id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }
    fn embed_batch(&self, texts: &[String]) -> krishi_core::Result<Vec<Vec<f32>>> {
        self.embed_texts(texts).map_err(|e| krishi_core::Error::BackendUnavailable(format!("{e:#}")))
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        return Ok(candle_core::pickle::read_all(&pickle)?.into_iter().collect());
    }
    bail!("no model.safetensors or pytorch_model.bin in {}", model_dir.display())
}

/// Load the configured embedding backend.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` forces the hashing backend. An error means no
/// backend is available and retrieval should run keyword-only.
pub fn load_embedder(settings: &EmbeddingSettings, base_dir: &Path) -> Result<Arc<dyn Embedder>> {
    let backend = if use_fake_embeddings() { EmbeddingBackend::Hashing } else { settings.backend };
    match backend {
        EmbeddingBackend::Disabled => bail!("embedding backend disabled by configuration"),
        EmbeddingBackend::Hashing => {
            info!(dim = settings.dim, "using hashing embedder");
            Ok(Arc::new(HashingEmbedder::new(settings.dim, settings.max_len)))
        }
        EmbeddingBackend::Candle => {
            let dir = resolve_model_dir(settings.model_dir.as_deref(), base_dir)?;
            Ok(Arc::new(EmbeddingModel::load(&dir, settings.max_len)?))
        }
    }
}

fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn resolve_model_dir(configured: Option<&str>, base_dir: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = configured { candidates.push(resolve_with_base(base_dir, dir)); }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) { candidates.push(PathBuf::from(dir)); }
    }
    candidates.push(base_dir.join(DEFAULT_MODEL_DIR));
    candidates.push(Path::new("..").join(DEFAULT_MODEL_DIR));
    candidates.into_iter().find(|p| p.exists()).ok_or_else(|| anyhow!("Could not locate sentence encoder model directory"))
}
