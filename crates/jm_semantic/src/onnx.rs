//! Pretrained sentence encoder backend via ONNX Runtime.
//!
//! Model and tokenizer files are read from disk, fetched over HTTP on first
//! use when only URLs are configured. Each text is encoded separately and
//! mean-pooled over the token axis so every text yields a fixed-dimension
//! vector.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use once_cell::sync::OnceCell;
use onnxruntime::{environment::Environment, ndarray::Array};
use tokenizers::Tokenizer;
use tracing::info;

use crate::{l2_normalize_in_place, Embedder, SemanticConfig, SemanticError};

/// Embedder backed by a local ONNX transformer model.
pub struct OnnxEmbedder {
    cfg: SemanticConfig,
    model_path: PathBuf,
    tokenizer: Tokenizer,
}

impl OnnxEmbedder {
    /// Load the tokenizer and make sure the model file is present, fetching
    /// either from its configured URL when missing on disk.
    pub fn from_config(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        cfg.validate()?;

        if !cfg.model_path.exists() {
            let url = cfg.model_url.as_deref().ok_or_else(|| {
                SemanticError::ModelUnavailable(cfg.model_path.display().to_string())
            })?;
            fetch(url, &cfg.model_path)?;
        }

        let tokenizer_path = tokenizer_destination(cfg)?;
        if !tokenizer_path.exists() {
            let url = cfg.tokenizer_url.as_deref().ok_or_else(|| {
                SemanticError::ModelUnavailable(format!(
                    "no tokenizer at {} for {}",
                    tokenizer_path.display(),
                    cfg.model_name
                ))
            })?;
            fetch(url, &tokenizer_path)?;
        }

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;
        info!(
            model = %cfg.model_name,
            path = %cfg.model_path.display(),
            "onnx embedder ready"
        );
        Ok(Self {
            cfg: cfg.clone(),
            model_path: cfg.model_path.clone(),
            tokenizer,
        })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let enc = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;
        let ids: Vec<i64> = enc.get_ids().iter().map(|&x| x as i64).collect();
        let mask: Vec<i64> = enc.get_attention_mask().iter().map(|&x| x as i64).collect();
        let seq_len = ids.len();

        let mut session = runtime()?
            .new_session_builder()
            .map_err(|e| SemanticError::Inference(e.to_string()))?
            .with_model_from_file(&self.model_path)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;

        if session.inputs.is_empty() {
            return Err(SemanticError::Inference(
                "model declares no inputs".into(),
            ));
        }

        // Feed tensors in whatever order the model declares its inputs.
        let mut feed = Vec::with_capacity(session.inputs.len());
        for input in &session.inputs {
            let tensor = match input.name.as_str() {
                "input_ids" => Array::from_shape_vec((1, seq_len), ids.clone()),
                "attention_mask" => Array::from_shape_vec((1, mask.len()), mask.clone()),
                "token_type_ids" => Ok(Array::from_elem((1, seq_len), 0_i64)),
                other => {
                    return Err(SemanticError::Inference(format!(
                        "model input '{other}' is not supported"
                    )))
                }
            }
            .map_err(|e| SemanticError::Inference(e.to_string()))?;
            feed.push(tensor.into_dyn());
        }

        let outputs = session
            .run::<i64, f32, _>(feed)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;

        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| SemanticError::Inference("model returned no outputs".into()))?;

        // Mean pooling over the token axis keeps the output dimension fixed
        // regardless of input length.
        let shape = output_tensor.shape().to_vec();
        let flat: Vec<f32> = output_tensor.iter().copied().collect();
        let mut embedding = match shape.as_slice() {
            [1, seq, hidden] if *seq > 0 => {
                let mut pooled = vec![0.0_f32; *hidden];
                for token_row in flat.chunks_exact(*hidden) {
                    for (acc, value) in pooled.iter_mut().zip(token_row) {
                        *acc += value;
                    }
                }
                let inv = 1.0 / *seq as f32;
                for value in pooled.iter_mut() {
                    *value *= inv;
                }
                pooled
            }
            _ => flat,
        };

        if self.cfg.normalize {
            l2_normalize_in_place(&mut embedding);
        }
        Ok(embedding)
    }
}

impl Embedder for OnnxEmbedder {
    fn dimension(&self) -> usize {
        self.cfg.dim
    }

    fn try_embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        texts.iter().map(|text| self.embed_one(text)).collect()
    }
}

/// Where the tokenizer file lives: an explicit path wins, otherwise it sits
/// next to the model under a name taken from the download URL.
fn tokenizer_destination(cfg: &SemanticConfig) -> Result<PathBuf, SemanticError> {
    match (&cfg.tokenizer_path, &cfg.tokenizer_url) {
        (Some(path), _) => Ok(path.clone()),
        (None, Some(url)) => {
            let name = url
                .rsplit('/')
                .find(|segment| !segment.is_empty())
                .and_then(|segment| segment.split(['?', '#']).next())
                .unwrap_or("tokenizer.json");
            let dir = cfg.model_path.parent().unwrap_or_else(|| Path::new("."));
            Ok(dir.join(name))
        }
        (None, None) => Err(SemanticError::ModelUnavailable(format!(
            "no tokenizer path or url configured for {}",
            cfg.model_name
        ))),
    }
}

/// Pull `url` into `target`, creating parent directories first.
fn fetch(url: &str, target: &Path) -> Result<(), SemanticError> {
    if let Some(dir) = target.parent() {
        fs::create_dir_all(dir)?;
    }

    let response = ureq::get(url)
        .call()
        .map_err(|e| SemanticError::Download(e.to_string()))?;
    let status = response.status();
    if status >= 400 {
        return Err(SemanticError::Download(format!(
            "{url} answered with status {status}"
        )));
    }

    io::copy(&mut response.into_reader(), &mut File::create(target)?)?;
    Ok(())
}

/// One ONNX Runtime environment for the whole process, built on first use.
fn runtime() -> Result<&'static Environment, SemanticError> {
    static ENV: OnceCell<Environment> = OnceCell::new();
    ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name("jm_semantic")
            .build()
            .map_err(|e| SemanticError::Inference(e.to_string()))
    })
}
