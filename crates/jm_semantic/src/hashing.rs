//! Deterministic signed feature hashing embedder.
//!
//! Each word token is hashed to a bucket in a fixed-dimension vector and
//! accumulated with a hash-derived sign, then the vector is L2-normalized.
//! The resulting cosine similarity tracks token overlap between texts, which
//! keeps the semantic signal meaningful without any model assets.

use jm_text::{tokenize, TextConfig};
use tracing::debug;

use crate::{l2_normalize_in_place, Embedder, SemanticConfig, SemanticError};

/// Offline embedder built on signed feature hashing.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
    normalize: bool,
    text_cfg: TextConfig,
}

impl HashingEmbedder {
    pub fn new(dim: usize, normalize: bool, text_cfg: TextConfig) -> Self {
        Self {
            dim,
            normalize,
            text_cfg,
        }
    }

    pub fn from_config(cfg: &SemanticConfig, text_cfg: TextConfig) -> Result<Self, SemanticError> {
        cfg.validate()?;
        debug!(dim = cfg.dim, normalize = cfg.normalize, "hashing embedder ready");
        Ok(Self::new(cfg.dim, cfg.normalize, text_cfg))
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dim];
        for token in tokenize(text, &self.text_cfg) {
            let hash = fxhash::hash64(token.as_bytes());
            let bucket = (hash % self.dim as u64) as usize;
            let sign = if hash & (1 << 63) != 0 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }
        if self.normalize {
            l2_normalize_in_place(&mut vector);
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn try_embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
