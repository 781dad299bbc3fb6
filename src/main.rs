use std::error::Error;

use jobmatch::{
    build_ranker, refresh_ranker, InMemoryJobs, JobPosting, JobmatchConfig, MatchRequest, Ranker,
};

fn posting(id: &str, title: &str, company: &str, text: &str) -> JobPosting {
    JobPosting {
        id: id.into(),
        title: title.into(),
        company: company.into(),
        text: text.into(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let ranker = build_ranker(&JobmatchConfig::default())?;
    let jobs = InMemoryJobs::new(vec![
        posting(
            "J1",
            "Senior Rust Engineer",
            "Ferrous Labs",
            "Build distributed storage systems in Rust. Async networking, \
             consensus protocols, performance tuning.",
        ),
        posting(
            "J2",
            "Backend Engineer",
            "Cloudware",
            "Develop APIs and services in Go or Rust with exposure to \
             distributed systems and Kubernetes.",
        ),
        posting(
            "J3",
            "Pastry Chef",
            "La Mie",
            "Prepare laminated doughs, tarts, and seasonal desserts for a \
             busy patisserie.",
        ),
    ]);
    refresh_ranker(&ranker, &jobs)?;

    let resume = "Rust engineer with six years building distributed systems, \
                  async networking stacks, and consensus protocols.";
    let hits = ranker.match_resume(&MatchRequest::new(resume))?;

    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "#{} {} @ {}  score={:.3} (lexical={:.3}, semantic={:.3})",
            rank + 1,
            hit.title,
            hit.company,
            hit.score,
            hit.lexical_score,
            hit.semantic_score
        );
    }

    Ok(())
}
