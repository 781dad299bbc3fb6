//! Workspace umbrella crate for jobmatch.
//!
//! Stitches the text pipeline, TF-IDF model, embedding backend, and hybrid
//! ranker together so callers can go from a YAML config and a corpus of job
//! postings to ranked matches with a single API entry point.
//!
//! ```no_run
//! use jobmatch::{build_ranker, refresh_ranker, InMemoryJobs, JobPosting, JobmatchConfig};
//! use jobmatch::{MatchRequest, Ranker};
//!
//! # fn main() -> Result<(), jobmatch::JobmatchError> {
//! let config = JobmatchConfig::default();
//! let ranker = build_ranker(&config)?;
//!
//! let jobs = InMemoryJobs::new(vec![JobPosting {
//!     id: "J1".into(),
//!     title: "Senior Rust Engineer".into(),
//!     company: "Acme".into(),
//!     text: "Distributed systems, async networking, consensus.".into(),
//! }]);
//! refresh_ranker(&ranker, &jobs)?;
//!
//! let hits = ranker.match_resume(&MatchRequest::new("rust distributed systems"))?;
//! # Ok(())
//! # }
//! ```

pub use jm_lexical::{LexicalConfig, LexicalError, SparseVector, TfidfModel};
pub use jm_match::{
    set_match_metrics, HybridRanker, JobPosting, MatchConfig, MatchError, MatchHit, MatchMetrics,
    MatchRequest, Ranker,
};
pub use jm_semantic::{
    cosine_similarity, Embedder, HashingEmbedder, SemanticConfig, SemanticError,
};
#[cfg(feature = "onnx")]
pub use jm_semantic::OnnxEmbedder;
pub use jm_text::{clean_text, hash_text, ngrams, tokenize, TextConfig, TextError};

mod config;
pub use config::{ConfigLoadError, JobmatchConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;
#[cfg(not(feature = "onnx"))]
use tracing::warn;

/// Errors surfaced by the umbrella API.
#[derive(Debug, Error)]
pub enum JobmatchError {
    #[error("configuration failure: {0}")]
    Config(#[from] ConfigLoadError),
    #[error("ranking failure: {0}")]
    Match(#[from] MatchError),
    #[error("semantic backend failure: {0}")]
    Semantic(#[from] SemanticError),
    #[error("job source failure: {0}")]
    Source(String),
}

/// Supplier of job postings for corpus refreshes.
pub trait JobSource: Send + Sync {
    fn load_jobs(&self) -> Result<Vec<JobPosting>, JobmatchError>;
}

/// Supplier of resume text for match requests.
pub trait ResumeSource: Send + Sync {
    fn load_resume(&self) -> Result<String, JobmatchError>;
}

/// Static in-memory job corpus.
pub struct InMemoryJobs {
    jobs: Vec<JobPosting>,
}

impl InMemoryJobs {
    pub fn new(jobs: Vec<JobPosting>) -> Self {
        Self { jobs }
    }
}

impl JobSource for InMemoryJobs {
    fn load_jobs(&self) -> Result<Vec<JobPosting>, JobmatchError> {
        Ok(self.jobs.clone())
    }
}

/// Job corpus loaded from a JSON file holding an array of postings.
pub struct JsonFileJobs {
    path: PathBuf,
}

impl JsonFileJobs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl JobSource for JsonFileJobs {
    fn load_jobs(&self) -> Result<Vec<JobPosting>, JobmatchError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| JobmatchError::Source(format!("{}: {e}", self.path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| JobmatchError::Source(format!("{}: {e}", self.path.display())))
    }
}

/// Resume text loaded from a plain file.
pub struct FileResume {
    path: PathBuf,
}

impl FileResume {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResumeSource for FileResume {
    fn load_resume(&self) -> Result<String, JobmatchError> {
        fs::read_to_string(&self.path)
            .map_err(|e| JobmatchError::Source(format!("{}: {e}", self.path.display())))
    }
}

/// Build a [`HybridRanker`] from a validated configuration.
///
/// The embedder is chosen by `semantic.mode`: `"hash"` uses the offline
/// [`HashingEmbedder`]; `"onnx"` uses the pretrained encoder when the `onnx`
/// feature is enabled, otherwise falls back to hashing with a warning.
pub fn build_ranker(config: &JobmatchConfig) -> Result<HybridRanker, JobmatchError> {
    config.validate()?;
    let embedder = build_embedder(config)?;
    let ranker = HybridRanker::new(
        config.matcher.clone(),
        config.lexical.clone(),
        config.text.clone(),
        embedder,
    )?;
    Ok(ranker)
}

fn build_embedder(config: &JobmatchConfig) -> Result<Arc<dyn Embedder>, JobmatchError> {
    match config.semantic.mode.as_str() {
        "onnx" => {
            #[cfg(feature = "onnx")]
            {
                let embedder = OnnxEmbedder::from_config(&config.semantic)?;
                Ok(Arc::new(embedder))
            }
            #[cfg(not(feature = "onnx"))]
            {
                warn!(
                    model = %config.semantic.model_name,
                    "onnx mode configured but the onnx feature is disabled; using hashing embedder"
                );
                let embedder =
                    HashingEmbedder::from_config(&config.semantic, config.text.clone())?;
                Ok(Arc::new(embedder))
            }
        }
        _ => {
            let embedder = HashingEmbedder::from_config(&config.semantic, config.text.clone())?;
            Ok(Arc::new(embedder))
        }
    }
}

/// Load postings from `source` and refit `ranker` with them. Returns the
/// number of postings indexed.
pub fn refresh_ranker(ranker: &dyn Ranker, source: &dyn JobSource) -> Result<usize, JobmatchError> {
    let jobs = source.load_jobs()?;
    let count = jobs.len();
    ranker.fit_corpus(jobs)?;
    info!(corpus_len = count, "ranker refreshed");
    Ok(count)
}

/// Convenience wrapper: build a ranker from a YAML config file and fit it
/// with postings from a JSON corpus file.
pub fn ranker_from_files(
    config_path: impl AsRef<Path>,
    jobs_path: impl Into<PathBuf>,
) -> Result<HybridRanker, JobmatchError> {
    let config = JobmatchConfig::from_file(config_path)?;
    let ranker = build_ranker(&config)?;
    refresh_ranker(&ranker, &JsonFileJobs::new(jobs_path))?;
    Ok(ranker)
}
