use std::hash::Hasher;

use krishi_core::traits::Embedder;
use twox_hash::XxHash64;

/// Feature-hashing embedder.
///
/// Each lower-cased alphanumeric token adds 1.0 to bucket `xxh64(token) % dim`,
/// and the result is L2-normalized. It captures literal overlap only, but is
/// deterministic and needs no model files, which makes it the offline and test
/// backend. Text without tokens embeds to the zero vector.
pub struct HashingEmbedder { dim: usize, max_len: usize, id: String }

impl HashingEmbedder {
    pub fn new(dim: usize, max_len: usize) -> Self {
        Self { dim, max_len, id: format!("hashing:xxh64:d{dim}") }
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        if self.dim == 0 { return v; }
        let tokens = text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()).take(self.max_len);
        for token in tokens {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.to_lowercase().as_bytes());
            let idx = (hasher.finish() % self.dim as u64) as usize;
            v[idx] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 { for x in &mut v { *x /= norm; } }
        v
    }
}

impl Embedder for HashingEmbedder {
    fn id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }
    fn embed_batch(&self, texts: &[String]) -> krishi_core::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
