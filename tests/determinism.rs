//! Determinism guarantees: identical inputs must produce identical rankings
//! across fresh ranker instances.

use jobmatch::{
    build_ranker, refresh_ranker, HashingEmbedder, Embedder, InMemoryJobs, JobPosting,
    JobmatchConfig, MatchRequest, Ranker, TextConfig,
};

fn posting(id: &str, title: &str, text: &str) -> JobPosting {
    JobPosting {
        id: id.into(),
        title: title.into(),
        company: "Acme".into(),
        text: text.into(),
    }
}

fn corpus() -> Vec<JobPosting> {
    vec![
        posting("J1", "Rust Engineer", "Rust, tokio, distributed systems."),
        posting("J2", "ML Engineer", "Python, pytorch, model serving."),
        posting("J3", "Platform Engineer", "Kubernetes, terraform, CI/CD."),
    ]
}

const RESUME: &str = "Platform engineer experienced with kubernetes, terraform, and rust.";

#[test]
fn rankings_are_reproducible_across_instances() {
    let run = || {
        let ranker = build_ranker(&JobmatchConfig::default()).unwrap();
        refresh_ranker(&ranker, &InMemoryJobs::new(corpus())).unwrap();
        ranker.match_resume(&MatchRequest::new(RESUME)).unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first, second);
}

#[test]
fn embeddings_are_reproducible_across_instances() {
    let a = HashingEmbedder::new(384, true, TextConfig::default());
    let b = HashingEmbedder::new(384, true, TextConfig::default());
    assert_eq!(a.embed(RESUME), b.embed(RESUME));
}

#[test]
fn parallel_lexical_scoring_matches_serial() {
    let serial_hits = {
        let config = JobmatchConfig::default();
        assert!(!config.lexical.use_parallel);
        let ranker = build_ranker(&config).unwrap();
        refresh_ranker(&ranker, &InMemoryJobs::new(corpus())).unwrap();
        ranker.match_resume(&MatchRequest::new(RESUME)).unwrap()
    };
    let parallel_hits = {
        let mut config = JobmatchConfig::default();
        config.lexical.use_parallel = true;
        let ranker = build_ranker(&config).unwrap();
        refresh_ranker(&ranker, &InMemoryJobs::new(corpus())).unwrap();
        ranker.match_resume(&MatchRequest::new(RESUME)).unwrap()
    };
    assert_eq!(serial_hits, parallel_hits);
}
