//! Failure-path behavior of the umbrella API.

use std::sync::Arc;

use jobmatch::{
    build_ranker, refresh_ranker, Embedder, HybridRanker, InMemoryJobs, JobPosting,
    JobSource, JobmatchConfig, JobmatchError, JsonFileJobs, LexicalConfig, MatchConfig,
    MatchRequest, Ranker, SemanticError, TextConfig,
};

fn posting(id: &str, title: &str, text: &str) -> JobPosting {
    JobPosting {
        id: id.into(),
        title: title.into(),
        company: "Acme".into(),
        text: text.into(),
    }
}

#[test]
fn invalid_yaml_is_a_config_error() {
    let result = JobmatchConfig::from_yaml("version: [not, a, string");
    assert!(result.is_err());
}

#[test]
fn out_of_range_blend_weight_rejected() {
    let mut config = JobmatchConfig::default();
    config.matcher.alpha = 1.2;
    assert!(matches!(
        build_ranker(&config),
        Err(JobmatchError::Config(_))
    ));
}

#[test]
fn unknown_semantic_mode_rejected() {
    let mut config = JobmatchConfig::default();
    config.semantic.mode = "quantum".into();
    assert!(matches!(
        build_ranker(&config),
        Err(JobmatchError::Config(_))
    ));
}

#[test]
fn missing_jobs_file_is_a_source_error() {
    let ranker = build_ranker(&JobmatchConfig::default()).unwrap();
    let result = refresh_ranker(&ranker, &JsonFileJobs::new("/does/not/exist.json"));
    assert!(matches!(result, Err(JobmatchError::Source(_))));
    assert!(!ranker.is_fitted());
}

#[test]
fn malformed_jobs_file_is_a_source_error() {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{\"not\": \"an array\"}").unwrap();
    let result = JsonFileJobs::new(file.path()).load_jobs();
    assert!(matches!(result, Err(JobmatchError::Source(_))));
}

struct OfflineEmbedder;

impl Embedder for OfflineEmbedder {
    fn dimension(&self) -> usize {
        16
    }

    fn try_embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        Err(SemanticError::ModelUnavailable("encoder offline".into()))
    }
}

#[test]
fn embedder_failure_never_fails_the_match() {
    let ranker = HybridRanker::new(
        MatchConfig::default(),
        LexicalConfig::default(),
        TextConfig::default(),
        Arc::new(OfflineEmbedder),
    )
    .unwrap();

    let corpus = vec![
        posting("J1", "Rust Engineer", "Rust, tokio, distributed systems."),
        posting("J2", "Accountant", "Ledgers, audits, quarterly reporting."),
    ];
    refresh_ranker(&ranker, &InMemoryJobs::new(corpus)).unwrap();

    let hits = ranker
        .match_resume(&MatchRequest::new("rust distributed systems tokio"))
        .unwrap();
    assert_eq!(hits.len(), 2);
    // Ranking falls back to the lexical signal alone.
    assert_eq!(hits[0].job_id, "J1");
    assert!(hits.iter().all(|h| h.semantic_score == 0.0));
}
