use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use jm_lexical::{LexicalConfig, SparseVector, TfidfModel};
use jm_semantic::{cosine_similarity_matrix, Embedder};
use jm_text::{clean_text, hash_text, TextConfig};
use tracing::{info, warn};

use crate::metrics::metrics_recorder;
use crate::types::{
    JobPosting, MatchConfig, MatchError, MatchHit, MatchRequest, KEYWORD_OVERLAP_CAP,
};

/// Score spreads below this are treated as flat and normalize to all zeros.
const RANGE_EPSILON: f32 = 1e-9;

/// Keyword overlap only counts tokens longer than this many characters.
const MIN_KEYWORD_TOKEN_CHARS: usize = 2;

/// Trait for a ranking engine.
pub trait Ranker: Send + Sync {
    /// Replace the corpus and rebuild all derived state.
    fn fit_corpus(&self, jobs: Vec<JobPosting>) -> Result<(), MatchError>;

    /// Rank the fitted corpus against one resume and return ordered hits.
    fn match_resume(&self, req: &MatchRequest) -> Result<Vec<MatchHit>, MatchError>;
}

/// Immutable view of one fitted corpus. Postings, lexical vectors, and
/// embeddings are index-aligned.
struct CorpusSnapshot {
    jobs: Vec<JobPosting>,
    tfidf: TfidfModel,
    lexical: Vec<SparseVector>,
    embeddings: Vec<Vec<f32>>,
}

/// Hybrid ranker blending TF-IDF and embedding similarity.
///
/// Match requests read the current snapshot through an `Arc`, so a
/// concurrent refit never tears a request between two corpus versions.
pub struct HybridRanker {
    cfg: MatchConfig,
    lexical_cfg: LexicalConfig,
    text_cfg: TextConfig,
    embedder: Arc<dyn Embedder>,
    snapshot: RwLock<Option<Arc<CorpusSnapshot>>>,
}

impl HybridRanker {
    /// Construct a ranker with explicit configs and an injected embedder.
    pub fn new(
        cfg: MatchConfig,
        lexical_cfg: LexicalConfig,
        text_cfg: TextConfig,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, MatchError> {
        cfg.validate()?;
        lexical_cfg.validate()?;
        text_cfg.validate()?;
        Ok(Self {
            cfg,
            lexical_cfg,
            text_cfg,
            embedder,
            snapshot: RwLock::new(None),
        })
    }

    /// Whether a corpus has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.read_snapshot().is_some()
    }

    /// Number of postings in the current corpus.
    pub fn corpus_len(&self) -> usize {
        self.read_snapshot().map_or(0, |s| s.jobs.len())
    }

    fn read_snapshot(&self) -> Option<Arc<CorpusSnapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn store_snapshot(&self, snapshot: Option<Arc<CorpusSnapshot>>) {
        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = snapshot;
    }
}

impl Ranker for HybridRanker {
    fn fit_corpus(&self, jobs: Vec<JobPosting>) -> Result<(), MatchError> {
        if jobs.is_empty() {
            warn!("fit requested with empty corpus; clearing snapshot");
            self.store_snapshot(None);
            return Ok(());
        }

        let start = Instant::now();
        let documents: Vec<String> = jobs
            .iter()
            .map(|job| clean_text(&job.text, &self.text_cfg))
            .collect();
        let document_refs: Vec<&str> = documents.iter().map(String::as_str).collect();

        let tfidf = TfidfModel::fit(&document_refs, &self.lexical_cfg, &self.text_cfg)?;
        let lexical: Vec<SparseVector> = document_refs
            .iter()
            .map(|doc| tfidf.transform(doc))
            .collect();
        let embeddings = self.embedder.embed_batch(&document_refs);

        if lexical.len() != jobs.len() || embeddings.len() != jobs.len() {
            return Err(MatchError::Internal(format!(
                "snapshot misaligned: {} jobs, {} lexical vectors, {} embeddings",
                jobs.len(),
                lexical.len(),
                embeddings.len()
            )));
        }

        let fingerprint = hash_text(&documents.join("\n"));
        let latency = start.elapsed();
        info!(
            corpus_len = jobs.len(),
            vocab_len = tfidf.vocab_len(),
            fingerprint = %&fingerprint[..12.min(fingerprint.len())],
            latency_ms = latency.as_millis() as u64,
            "corpus fitted"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_fit(jobs.len(), tfidf.vocab_len(), latency);
        }

        self.store_snapshot(Some(Arc::new(CorpusSnapshot {
            jobs,
            tfidf,
            lexical,
            embeddings,
        })));
        Ok(())
    }

    fn match_resume(&self, req: &MatchRequest) -> Result<Vec<MatchHit>, MatchError> {
        if req.top_k == Some(0) {
            return Err(MatchError::InvalidConfig(
                "top_k must be at least 1".into(),
            ));
        }
        if let Some(alpha) = req.alpha {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(MatchError::InvalidConfig(format!(
                    "alpha must be within [0, 1], got {alpha}"
                )));
            }
        }
        if req.resume_text.trim().is_empty() {
            warn!("empty resume text; returning no hits");
            return Ok(Vec::new());
        }
        let Some(snapshot) = self.read_snapshot() else {
            warn!("match requested before any corpus fit; returning no hits");
            return Ok(Vec::new());
        };

        let start = Instant::now();
        let resume = clean_text(&req.resume_text, &self.text_cfg);

        let query_vector = snapshot.tfidf.transform(&resume);
        let lexical_raw = snapshot.tfidf.similarity(&query_vector, &snapshot.lexical);

        let query_embedding = self.embedder.embed(&resume);
        let semantic_raw = cosine_similarity_matrix(&snapshot.embeddings, &query_embedding);

        let lexical = min_max_normalize(&lexical_raw);
        let semantic = min_max_normalize(&semantic_raw);

        let resume_lower = resume.to_lowercase();
        let alpha = req.alpha.unwrap_or(self.cfg.alpha);
        let mut hits: Vec<MatchHit> = snapshot
            .jobs
            .iter()
            .enumerate()
            .map(|(i, job)| {
                let blended = alpha * semantic[i] + (1.0 - alpha) * lexical[i];
                let overlap = keyword_overlap(&job.text, &resume_lower);
                let boost =
                    self.cfg.keyword_boost * (overlap as f32 / KEYWORD_OVERLAP_CAP).min(1.0);
                MatchHit {
                    job_id: job.id.clone(),
                    title: job.title.clone(),
                    company: job.company.clone(),
                    score: blended + boost,
                    lexical_score: lexical[i],
                    semantic_score: semantic[i],
                }
            })
            .collect();

        // Stable sort keeps corpus insertion order for exact ties.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        let top_k = req.top_k.unwrap_or(self.cfg.top_k);
        hits.truncate(top_k);

        let latency = start.elapsed();
        if let Some(recorder) = metrics_recorder() {
            recorder.record_match(latency, hits.len());
        }
        Ok(hits)
    }
}

/// Min-max normalize scores into `[0, 1]`. A flat distribution (range under
/// [`RANGE_EPSILON`]) maps to all zeros so a uniform signal carries no weight.
fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &s in scores {
        min = min.min(s);
        max = max.max(s);
    }
    let range = max - min;
    if scores.is_empty() || range < RANGE_EPSILON {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|&s| (s - min) / range).collect()
}

/// Count distinct whitespace tokens of the posting (longer than
/// [`MIN_KEYWORD_TOKEN_CHARS`], case-insensitive) that occur as substrings of
/// the lowercased resume.
fn keyword_overlap(job_text: &str, resume_lower: &str) -> usize {
    let job_lower = job_text.to_lowercase();
    let tokens: HashSet<&str> = job_lower
        .split_whitespace()
        .filter(|token| token.chars().count() > MIN_KEYWORD_TOKEN_CHARS)
        .collect();
    tokens
        .iter()
        .filter(|token| resume_lower.contains(*token))
        .count()
}
