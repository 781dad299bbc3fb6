//! # jobmatch lexical model
//!
//! Sparse TF-IDF representation capturing literal word and phrase overlap
//! between a resume and a corpus of job postings. The model is
//! corpus-statistical: [`TfidfModel::fit`] learns a bounded vocabulary of
//! unigrams and bigrams plus per-term inverse document frequencies, and
//! [`TfidfModel::transform`] maps any text into that fixed space.
//!
//! Similarity is the plain dot product of the weighted term vectors; the
//! hybrid ranker min-max scales the resulting similarity vector, so absolute
//! magnitude does not need to be normalized here.
//!
//! Everything is runtime-configurable (no feature flags), including optional
//! rayon parallelism across corpus documents, which never changes results.

use std::collections::{HashMap, HashSet};

use fxhash::FxHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use jm_text::{ngrams, tokenize, TextConfig};

/// Minimum character length for a term-forming token. Single-character
/// tokens ("a", "i", stray digits) carry no ranking signal.
const MIN_TOKEN_CHARS: usize = 2;

/// Configuration for the lexical model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LexicalConfig {
    /// Semantic version of the lexical configuration.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Vocabulary cap. When the corpus induces more distinct terms, the
    /// highest corpus-frequency terms are kept (ties broken alphabetically).
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    /// Smallest n-gram length (default 1).
    #[serde(default = "default_ngram_min")]
    pub ngram_min: usize,
    /// Largest n-gram length (default 2).
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,
    /// Compute corpus similarities in parallel with rayon. Results are
    /// identical either way.
    #[serde(default)]
    pub use_parallel: bool,
}

const fn default_version() -> u32 {
    1
}

const fn default_max_features() -> usize {
    2000
}

const fn default_ngram_min() -> usize {
    1
}

const fn default_ngram_max() -> usize {
    2
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            version: 1,
            max_features: default_max_features(),
            ngram_min: default_ngram_min(),
            ngram_max: default_ngram_max(),
            use_parallel: false,
        }
    }
}

impl LexicalConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), LexicalError> {
        if self.version == 0 {
            return Err(LexicalError::InvalidConfig(
                "lexical config version must be >= 1".into(),
            ));
        }
        if self.max_features == 0 {
            return Err(LexicalError::InvalidConfig(
                "max_features must be greater than zero".into(),
            ));
        }
        if self.ngram_min == 0 || self.ngram_max < self.ngram_min {
            return Err(LexicalError::InvalidConfig(format!(
                "invalid ngram range {}..={}",
                self.ngram_min, self.ngram_max
            )));
        }
        Ok(())
    }
}

/// Errors produced by the lexical model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexicalError {
    /// Fit was called with zero documents. Callers should treat this as
    /// "ranking unavailable", not a crash.
    #[error("cannot fit lexical model on an empty corpus")]
    EmptyCorpus,
    /// Structurally invalid configuration.
    #[error("invalid lexical config: {0}")]
    InvalidConfig(String),
}

/// A sparse weighted-term vector in the fitted vocabulary space.
///
/// Entries are `(term_id, weight)` sorted by ascending term id, which keeps
/// dot products a linear merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    /// Number of non-zero terms.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// True when the vector has no non-zero component (e.g., empty query).
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product with another sparse vector (linear two-pointer merge).
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0usize, 0usize);
        let mut acc = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (ti, wi) = self.entries[i];
            let (tj, wj) = other.entries[j];
            match ti.cmp(&tj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    acc += wi * wj;
                    i += 1;
                    j += 1;
                }
            }
        }
        acc
    }
}

/// Fitted TF-IDF model: bounded vocabulary plus per-term IDF weights.
#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocab: FxHashMap<String, u32>,
    idf: Vec<f32>,
    cfg: LexicalConfig,
    text_cfg: TextConfig,
}

impl TfidfModel {
    /// Fit the vocabulary and IDF statistics on a corpus of document texts.
    ///
    /// Fails with [`LexicalError::EmptyCorpus`] for zero documents. IDF uses
    /// the smoothed form `ln((1 + n) / (1 + df)) + 1`, so terms appearing in
    /// every document still keep a positive weight.
    pub fn fit(
        texts: &[&str],
        cfg: &LexicalConfig,
        text_cfg: &TextConfig,
    ) -> Result<Self, LexicalError> {
        cfg.validate()?;
        if texts.is_empty() {
            return Err(LexicalError::EmptyCorpus);
        }

        // Corpus-wide term frequency and document frequency in one pass.
        let mut corpus_freq: HashMap<String, u64> = HashMap::new();
        let mut doc_freq: HashMap<String, u32> = HashMap::new();
        for text in texts {
            let terms = document_terms(text, cfg, text_cfg);
            let mut seen_in_doc: HashSet<&str> = HashSet::with_capacity(terms.len());
            for term in &terms {
                *corpus_freq.entry(term.clone()).or_insert(0) += 1;
            }
            for term in &terms {
                if seen_in_doc.insert(term.as_str()) {
                    *doc_freq.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        // Keep the highest corpus-frequency terms under the cap, breaking
        // ties alphabetically, then assign ids in lexicographic order so the
        // mapping is independent of hash iteration order.
        let mut selected: Vec<(String, u64)> = corpus_freq.into_iter().collect();
        if selected.len() > cfg.max_features {
            selected.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            selected.truncate(cfg.max_features);
        }
        let mut terms: Vec<String> = selected.into_iter().map(|(term, _)| term).collect();
        terms.sort_unstable();

        let n_docs = texts.len() as f32;
        let mut vocab = FxHashMap::default();
        let mut idf = Vec::with_capacity(terms.len());
        for (id, term) in terms.into_iter().enumerate() {
            let df = *doc_freq.get(&term).unwrap_or(&0) as f32;
            idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            vocab.insert(term, id as u32);
        }

        debug!(
            vocab_len = vocab.len(),
            docs = texts.len(),
            "fitted tf-idf vocabulary"
        );

        Ok(Self {
            vocab,
            idf,
            cfg: cfg.clone(),
            text_cfg: text_cfg.clone(),
        })
    }

    /// Map text into the fitted vocabulary space as a tf x idf vector.
    ///
    /// Terms outside the fitted vocabulary contribute nothing; empty text
    /// yields the zero vector. Vectors are deliberately not length
    /// normalized.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: FxHashMap<u32, u32> = FxHashMap::default();
        for term in document_terms(text, &self.cfg, &self.text_cfg) {
            if let Some(&id) = self.vocab.get(&term) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        let mut entries: Vec<(u32, f32)> = counts
            .into_iter()
            .map(|(id, tf)| (id, tf as f32 * self.idf[id as usize]))
            .collect();
        entries.sort_unstable_by_key(|(id, _)| *id);
        SparseVector { entries }
    }

    /// Similarity of one query vector against every corpus vector.
    ///
    /// Plain dot products, one score per corpus document, in corpus order.
    /// An empty query yields an all-zero similarity vector, never an error.
    pub fn similarity(&self, query: &SparseVector, corpus: &[SparseVector]) -> Vec<f32> {
        if query.is_zero() {
            return vec![0.0; corpus.len()];
        }
        if self.cfg.use_parallel {
            corpus.par_iter().map(|doc| query.dot(doc)).collect()
        } else {
            corpus.iter().map(|doc| query.dot(doc)).collect()
        }
    }

    /// Number of terms in the fitted vocabulary.
    pub fn vocab_len(&self) -> usize {
        self.vocab.len()
    }

    /// Per-term IDF weight by term text, when the term was retained.
    pub fn idf_of(&self, term: &str) -> Option<f32> {
        self.vocab.get(term).map(|&id| self.idf[id as usize])
    }
}

/// Tokenize and expand a document into vocabulary terms: tokens of at least
/// [`MIN_TOKEN_CHARS`] characters, expanded over the configured n-gram range.
fn document_terms(text: &str, cfg: &LexicalConfig, text_cfg: &TextConfig) -> Vec<String> {
    let tokens: Vec<String> = tokenize(text, text_cfg)
        .into_iter()
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .collect();
    ngrams(&tokens, cfg.ngram_min, cfg.ngram_max)
}
