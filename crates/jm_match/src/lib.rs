//! jm_match: hybrid resume-to-job relevance ranking.
//!
//! Combines two complementary relevance signals over a corpus of job
//! postings:
//!
//! - lexical: TF-IDF weighted term overlap from `jm_lexical`
//! - semantic: dense embedding cosine similarity from `jm_semantic`
//!
//! Both signal vectors are min-max normalized to `[0, 1]` per request, then
//! blended with a configurable weight and topped up with a capped keyword
//! overlap boost. The [`HybridRanker`] owns an immutable corpus snapshot that
//! is replaced wholesale on refit, so concurrent match requests always see a
//! consistent corpus.

mod engine;
mod metrics;
mod types;

pub use engine::{HybridRanker, Ranker};
pub use metrics::{set_match_metrics, MatchMetrics};
pub use types::{
    JobPosting, MatchConfig, MatchError, MatchHit, MatchRequest, DEFAULT_ALPHA,
    DEFAULT_KEYWORD_BOOST, DEFAULT_TOP_K, KEYWORD_OVERLAP_CAP,
};
