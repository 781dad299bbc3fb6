//! # jobmatch semantic model
//!
//! Dense, meaning-level similarity between resumes and job postings. Text is
//! mapped to fixed-dimension real vectors by an [`Embedder`], and compared
//! with cosine similarity.
//!
//! Two embedders ship with the crate:
//!
//! - [`HashingEmbedder`] (always available): deterministic signed feature
//!   hashing over word tokens. No model assets, fully offline, and sensitive
//!   to token overlap, so hybrid ranking stays meaningful without a
//!   pretrained encoder.
//! - `OnnxEmbedder` (feature `onnx`): a pretrained sentence encoder run
//!   through ONNX Runtime, with lazy process-wide initialization and
//!   on-demand asset download.
//!
//! ## Degradation contract
//!
//! Encoding failure must never abort a match request. The fallible path is
//! [`Embedder::try_embed_batch`]; the provided [`Embedder::embed_batch`]
//! collapses any failure into zero vectors of [`Embedder::dimension`] and
//! logs it, so callers keep functioning on degraded semantic signal.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

mod hashing;
#[cfg(feature = "onnx")]
mod onnx;

pub use hashing::HashingEmbedder;
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmbedder;

/// Stabilizer added to vector magnitudes in the matrix cosine path so
/// near-zero rows do not blow up.
pub const NORM_EPSILON: f32 = 1e-9;

/// Runtime configuration for the semantic backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SemanticConfig {
    /// Backend selector: `"hash"` (deterministic feature hashing) or
    /// `"onnx"` (pretrained encoder, requires the `onnx` feature).
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Embedding dimensionality. Zero vectors produced on degradation use
    /// this length.
    #[serde(default = "default_dim")]
    pub dim: usize,
    /// L2-normalize produced vectors (recommended for cosine similarity).
    #[serde(default = "default_true")]
    pub normalize: bool,
    /// Friendly model label, surfaced in logs.
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Local path of the ONNX model file (download target when
    /// [`model_url`](Self::model_url) is set).
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Path to `tokenizer.json` for the ONNX backend.
    #[serde(default)]
    pub tokenizer_path: Option<PathBuf>,
    /// Optional HTTPS URL fetched when the model file is missing.
    #[serde(default)]
    pub model_url: Option<String>,
    /// Optional HTTPS URL fetched when the tokenizer file is missing.
    #[serde(default)]
    pub tokenizer_url: Option<String>,
}

fn default_mode() -> String {
    "hash".into()
}

const fn default_dim() -> usize {
    384
}

const fn default_true() -> bool {
    true
}

fn default_model_name() -> String {
    "all-MiniLM-L6-v2".into()
}

fn default_model_path() -> PathBuf {
    PathBuf::from("./models/all-MiniLM-L6-v2/model.onnx")
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            dim: default_dim(),
            normalize: true,
            model_name: default_model_name(),
            model_path: default_model_path(),
            tokenizer_path: None,
            model_url: None,
            tokenizer_url: None,
        }
    }
}

impl SemanticConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SemanticError> {
        match self.mode.as_str() {
            "hash" | "onnx" => {}
            other => {
                return Err(SemanticError::InvalidConfig(format!(
                    "unknown semantic mode '{other}' (expected \"hash\" or \"onnx\")"
                )))
            }
        }
        if self.dim == 0 {
            return Err(SemanticError::InvalidConfig(
                "embedding dim must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Errors surfaced by the semantic backend's fallible paths.
#[derive(Debug, Error)]
pub enum SemanticError {
    /// Configuration is inconsistent.
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// Model or tokenizer assets could not be located or fetched.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    /// Unable to download remote assets.
    #[error("download failed: {0}")]
    Download(String),
    /// Filesystem failures while touching model assets.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Encoder failed at inference time.
    #[error("inference failure: {0}")]
    Inference(String),
}

/// Capability interface for text encoders.
///
/// The hybrid ranker holds an `Arc<dyn Embedder>`, so deployments can inject
/// the hashing embedder, the ONNX encoder, or a deterministic test double.
pub trait Embedder: Send + Sync {
    /// Fixed output dimensionality of this encoder.
    fn dimension(&self) -> usize;

    /// Encode a batch of texts, one vector per input, in input order.
    ///
    /// Implementations report failure through the `Result`; they should not
    /// panic and should not silently substitute defaults, that is
    /// [`embed_batch`](Self::embed_batch)'s job.
    fn try_embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError>;

    /// Infallible batch encoding: any failure degrades to zero vectors of
    /// [`dimension`](Self::dimension), logged at error level.
    fn embed_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        match self.try_embed_batch(texts) {
            Ok(vectors) if vectors.len() == texts.len() => vectors,
            Ok(vectors) => {
                error!(
                    expected = texts.len(),
                    got = vectors.len(),
                    "embedder returned wrong batch size; degrading to zero vectors"
                );
                vec![vec![0.0; self.dimension()]; texts.len()]
            }
            Err(err) => {
                error!(error = %err, "embedding failed; degrading to zero vectors");
                vec![vec![0.0; self.dimension()]; texts.len()]
            }
        }
    }

    /// Infallible single-text encoding with the same degradation contract.
    fn embed(&self, text: &str) -> Vec<f32> {
        self.embed_batch(&[text])
            .pop()
            .unwrap_or_else(|| vec![0.0; self.dimension()])
    }
}

/// Cosine similarity of two vectors.
///
/// Defined as 0.0 when either vector has zero magnitude, so degraded zero
/// vectors compare as "no signal" instead of dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Row-wise cosine similarity of a matrix of corpus vectors against one
/// query vector.
///
/// Each row and the query are normalized by their own magnitude plus
/// [`NORM_EPSILON`], so near-zero rows stay near zero instead of blowing up.
pub fn cosine_similarity_matrix(rows: &[Vec<f32>], query: &[f32]) -> Vec<f32> {
    let query_norm = l2_norm(query) + NORM_EPSILON;
    rows.iter()
        .map(|row| {
            let dot: f32 = row.iter().zip(query.iter()).map(|(x, y)| x * y).sum();
            let row_norm = l2_norm(row) + NORM_EPSILON;
            dot / (row_norm * query_norm)
        })
        .collect()
}

/// In-place L2 normalization, no-op for zero vectors.
pub(crate) fn l2_normalize_in_place(v: &mut [f32]) {
    let norm = v.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm > 0.0 {
        let inv = 1.0 / norm as f32;
        for x in v.iter_mut() {
            *x *= inv;
        }
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_zero_magnitude_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn cosine_identical_vectors_is_one() {
        let v = [0.3_f32, -0.5, 0.8];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors_is_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn matrix_cosine_matches_pairwise_on_nonzero_rows() {
        let rows = vec![vec![1.0_f32, 2.0, 3.0], vec![-1.0, 0.5, 0.0]];
        let query = [0.2_f32, 0.9, -0.4];
        let sims = cosine_similarity_matrix(&rows, &query);
        for (row, sim) in rows.iter().zip(&sims) {
            let pairwise = cosine_similarity(row, &query);
            assert!((sim - pairwise).abs() < 1e-4);
        }
    }

    #[test]
    fn matrix_cosine_zero_rows_stay_near_zero() {
        let rows = vec![vec![0.0_f32; 8]];
        let query = vec![1.0_f32; 8];
        let sims = cosine_similarity_matrix(&rows, &query);
        assert!(sims[0].abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_produces_unit_vectors() {
        let mut v = vec![3.0_f32, 4.0];
        l2_normalize_in_place(&mut v);
        assert!((l2_norm(&v) - 1.0).abs() < 1e-6);

        let mut zero = vec![0.0_f32; 4];
        l2_normalize_in_place(&mut zero);
        assert_eq!(zero, vec![0.0; 4]);
    }

    #[test]
    fn invalid_mode_rejected() {
        let cfg = SemanticConfig {
            mode: "quantum".into(),
            ..SemanticConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SemanticError::InvalidConfig(_))
        ));
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn dimension(&self) -> usize {
            4
        }

        fn try_embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
            Err(SemanticError::ModelUnavailable("backend offline".into()))
        }
    }

    #[test]
    fn failed_encoding_degrades_to_zero_vectors() {
        let embedder = FailingEmbedder;
        let vectors = embedder.embed_batch(&["a", "b"]);
        assert_eq!(vectors, vec![vec![0.0; 4], vec![0.0; 4]]);
        assert_eq!(embedder.embed("a"), vec![0.0; 4]);
    }
}
