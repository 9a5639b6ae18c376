// src/filter.rs
//! Relevance filtering of news candidates through the generator.

use metrics::counter;
use tracing::{debug, info, warn};

use crate::clean::clean;
use crate::error::PipelineError;
use crate::generate::prompts::{self, SKIP_SENTINEL};
use crate::generate::Generator;
use crate::ingest::truncate_chars;
use crate::ingest::types::Candidate;
use crate::post::{ensure_read_more, GeneratedPost, READ_MORE_PREFIX};
use crate::telemetry as m;

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(GeneratedPost),
    Skipped,
    /// Generation failed; templated post built from the raw candidate.
    Fallback(GeneratedPost),
}

impl Verdict {
    pub fn into_post(self) -> Option<GeneratedPost> {
        match self {
            Verdict::Accepted(p) | Verdict::Fallback(p) => Some(p),
            Verdict::Skipped => None,
        }
    }
}

/// True when the response is the skip sentinel.
///
/// The first non-empty line must start with `SKIP` (any case, optionally
/// wrapped in quotes or markdown emphasis) followed by nothing or by
/// punctuation, so `SKIP`, `skip.` and `SKIP - Spain only` match while
/// `Skip to my lou` and `Skipping...` do not.
pub fn is_skip_sentinel(cleaned: &str) -> bool {
    let Some(line) = cleaned.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return false;
    };
    let line = line.trim_matches(|c: char| matches!(c, '*' | '"' | '\'' | '`' | '_'));
    let Some(head) = line.get(..SKIP_SENTINEL.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(SKIP_SENTINEL) {
        return false;
    }
    match line[SKIP_SENTINEL.len()..].trim_start().chars().next() {
        None => true,
        Some(c) => !c.is_alphanumeric(),
    }
}

/// Deterministic post used when generation fails for a candidate.
pub fn fallback_post(candidate: &Candidate, summary_chars: usize) -> GeneratedPost {
    let mut text = format!("📰 {}", candidate.title);
    let summary = candidate.summary.trim();
    if !summary.is_empty() {
        let cut = truncate_chars(summary, summary_chars);
        text.push_str("\n\n");
        text.push_str(cut);
        if cut.len() < summary.len() {
            text.push_str("...");
        }
    }
    text.push_str(&format!("\n\n{READ_MORE_PREFIX} {}", candidate.link));
    GeneratedPost::linked(text, candidate.link.clone())
}

pub struct CandidateFilter<'a> {
    generator: &'a dyn Generator,
    location: String,
    prompt_summary_chars: usize,
    fallback_summary_chars: usize,
}

impl<'a> CandidateFilter<'a> {
    pub fn new(
        generator: &'a dyn Generator,
        location: impl Into<String>,
        prompt_summary_chars: usize,
        fallback_summary_chars: usize,
    ) -> Self {
        Self {
            generator,
            location: location.into(),
            prompt_summary_chars,
            fallback_summary_chars,
        }
    }

    pub async fn judge(&self, candidate: &Candidate) -> Verdict {
        let prompt =
            prompts::news_translation(candidate, &self.location, self.prompt_summary_chars);

        let raw = match self.generator.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                let err = PipelineError::generation("translate_candidate", &e);
                warn!(
                    link = %candidate.link,
                    generator = self.generator.name(),
                    error = %err,
                    "translation failed, using fallback post"
                );
                counter!(m::GENERATION_ERRORS).increment(1);
                counter!(m::CANDIDATES_FALLBACK).increment(1);
                return Verdict::Fallback(fallback_post(candidate, self.fallback_summary_chars));
            }
        };

        let cleaned = clean(&raw);
        if is_skip_sentinel(&cleaned) {
            info!(link = %candidate.link, "candidate skipped as not relevant");
            counter!(m::CANDIDATES_SKIPPED).increment(1);
            return Verdict::Skipped;
        }
        if cleaned.is_empty() {
            warn!(link = %candidate.link, "empty translation, using fallback post");
            counter!(m::CANDIDATES_FALLBACK).increment(1);
            return Verdict::Fallback(fallback_post(candidate, self.fallback_summary_chars));
        }

        counter!(m::CANDIDATES_ACCEPTED).increment(1);
        let text = ensure_read_more(&cleaned, &candidate.link);
        Verdict::Accepted(GeneratedPost::linked(text, candidate.link.clone()))
    }

    /// Accepted post for the candidate, or `None` when it was rejected.
    pub async fn evaluate(&self, candidate: &Candidate) -> Option<GeneratedPost> {
        self.judge(candidate).await.into_post()
    }

    /// First candidate, in order, that yields a post.
    pub async fn first_accepted(&self, candidates: &[Candidate]) -> Option<GeneratedPost> {
        for (i, c) in candidates.iter().enumerate() {
            debug!(index = i, title = %truncate_chars(&c.title, 60), "evaluating candidate");
            if let Some(post) = self.evaluate(c).await {
                return Some(post);
            }
        }
        None
    }
}
