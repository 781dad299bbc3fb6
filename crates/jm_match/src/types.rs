use jm_lexical::LexicalError;
use jm_text::TextError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of hits returned by a match request.
pub const DEFAULT_TOP_K: usize = 5;
/// Default semantic weight in the hybrid blend.
pub const DEFAULT_ALPHA: f32 = 0.6;
/// Default maximum additive keyword overlap boost.
pub const DEFAULT_KEYWORD_BOOST: f32 = 0.15;
/// Overlap count at which the keyword boost saturates.
pub const KEYWORD_OVERLAP_CAP: f32 = 10.0;

/// A single job posting in the ranking corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobPosting {
    /// Stable identifier, surfaced in every [`MatchHit`].
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company: String,
    /// Full posting body used for both lexical and semantic signals.
    pub text: String,
}

/// Tuning knobs for the hybrid ranker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Default result count when a request does not specify its own.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Semantic weight: final blend is `alpha * semantic + (1 - alpha) * lexical`.
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    /// Maximum additive boost for keyword overlap, applied after blending.
    #[serde(default = "default_keyword_boost")]
    pub keyword_boost: f32,
}

const fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

const fn default_alpha() -> f32 {
    DEFAULT_ALPHA
}

const fn default_keyword_boost() -> f32 {
    DEFAULT_KEYWORD_BOOST
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            alpha: DEFAULT_ALPHA,
            keyword_boost: DEFAULT_KEYWORD_BOOST,
        }
    }
}

impl MatchConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.top_k == 0 {
            return Err(MatchError::InvalidConfig(
                "top_k must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(MatchError::InvalidConfig(format!(
                "alpha must be within [0.0, 1.0], got {}",
                self.alpha
            )));
        }
        if !self.keyword_boost.is_finite() || self.keyword_boost < 0.0 {
            return Err(MatchError::InvalidConfig(format!(
                "keyword_boost must be a non-negative finite value, got {}",
                self.keyword_boost
            )));
        }
        Ok(())
    }
}

/// A single match request: one resume against the fitted corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRequest {
    /// Free-form resume text to rank the corpus against.
    pub resume_text: String,
    /// Per-request override of [`MatchConfig::top_k`].
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Per-request override of [`MatchConfig::alpha`].
    #[serde(default)]
    pub alpha: Option<f32>,
}

impl MatchRequest {
    pub fn new(resume_text: impl Into<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            top_k: None,
            alpha: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = Some(alpha);
        self
    }
}

/// One ranked job posting returned from a match request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchHit {
    pub job_id: String,
    pub title: String,
    pub company: String,
    /// Final blended score including the keyword boost. Not re-normalized,
    /// so it may slightly exceed 1.0.
    pub score: f32,
    /// Min-max normalized lexical signal for this posting.
    pub lexical_score: f32,
    /// Min-max normalized semantic signal for this posting.
    pub semantic_score: f32,
}

/// Errors surfaced by the ranking engine.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Configuration is inconsistent.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// Lexical model construction failed.
    #[error("lexical model error: {0}")]
    Lexical(#[from] LexicalError),
    /// Text pipeline configuration is invalid.
    #[error("text config error: {0}")]
    Text(#[from] TextError),
    /// A corpus snapshot invariant was violated. Indicates a bug, not bad input.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_constants() {
        let cfg = MatchConfig::default();
        assert_eq!(cfg.top_k, 5);
        assert!((cfg.alpha - 0.6).abs() < f32::EPSILON);
        assert!((cfg.keyword_boost - 0.15).abs() < f32::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: MatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, MatchConfig::default());

        let cfg: MatchConfig = serde_json::from_str(r#"{"alpha": 0.3, "top_k": 2}"#).unwrap();
        assert_eq!(cfg.top_k, 2);
        assert!((cfg.alpha - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn out_of_range_alpha_rejected() {
        let cfg = MatchConfig {
            alpha: 1.5,
            ..MatchConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(MatchError::InvalidConfig(_))));
    }

    #[test]
    fn zero_top_k_rejected() {
        let cfg = MatchConfig {
            top_k: 0,
            ..MatchConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(MatchError::InvalidConfig(_))));
    }

    #[test]
    fn negative_boost_rejected() {
        let cfg = MatchConfig {
            keyword_boost: -0.1,
            ..MatchConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(MatchError::InvalidConfig(_))));
    }
}
