// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::error::PipelineError;
use crate::ingest::types::{Candidate, FeedSource};
use crate::telemetry as m;
use metrics::counter;

/// Normalize feed text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 4) Length cap: 2000 chars
    if out.chars().count() > 2000 {
        out = out.chars().take(2000).collect();
    }

    out
}

/// Char-boundary-safe prefix of at most `max` chars.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Fetch up to `max_total` candidates, at most `per_source` from each source,
/// visiting sources in order. A failing source is logged and skipped.
pub async fn fetch_candidates(
    sources: &[Box<dyn FeedSource>],
    max_total: usize,
    per_source: usize,
) -> Vec<Candidate> {
    m::ensure_described();

    let mut out = Vec::with_capacity(max_total);
    for source in sources {
        if out.len() >= max_total {
            break;
        }
        match source.fetch().await {
            Ok(items) => {
                let room = max_total - out.len();
                let take = per_source.min(room);
                out.extend(items.into_iter().take(take));
            }
            Err(e) => {
                let err = PipelineError::source_unavailable("fetch_feed", &e);
                tracing::warn!(source = source.name(), error = %err, "feed source skipped");
                counter!(m::SOURCE_ERRORS).increment(1);
            }
        }
    }

    counter!(m::CANDIDATES_FETCHED).increment(out.len() as u64);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};

    struct Fixed {
        name: &'static str,
        items: Option<Vec<Candidate>>,
    }

    #[async_trait::async_trait]
    impl FeedSource for Fixed {
        async fn fetch(&self) -> Result<Vec<Candidate>> {
            self.items.clone().ok_or_else(|| anyhow!("boom"))
        }
        fn name(&self) -> &str {
            self.name
        }
    }

    fn cand(tag: &str, i: usize) -> Candidate {
        Candidate {
            title: format!("{tag}-{i}"),
            summary: String::new(),
            link: format!("https://example.com/{tag}/{i}"),
            published_at: None,
        }
    }

    fn source(name: &'static str, n: usize) -> Box<dyn FeedSource> {
        Box::new(Fixed {
            name,
            items: Some((0..n).map(|i| cand(name, i)).collect()),
        })
    }

    #[test]
    fn normalize_text_strips_tags_and_entities() {
        let s = "<p>Quito&nbsp;&amp; <b>Guayaquil</b></p>\n\n  hoy ";
        assert_eq!(normalize_text(s), "Quito & Guayaquil hoy");
    }

    #[test]
    fn truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("añoñé", 3), "año");
        assert_eq!(truncate_chars("ab", 5), "ab");
    }

    #[tokio::test]
    async fn caps_per_source_and_overall() {
        let sources = vec![source("a", 4), source("b", 4), source("c", 4)];
        let got = fetch_candidates(&sources, 5, 2).await;
        let titles: Vec<_> = got.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["a-0", "a-1", "b-0", "b-1", "c-0"]);
    }

    #[tokio::test]
    async fn failing_source_is_skipped() {
        let sources: Vec<Box<dyn FeedSource>> = vec![
            Box::new(Fixed {
                name: "down",
                items: None,
            }),
            source("up", 3),
        ];
        let got = fetch_candidates(&sources, 5, 2).await;
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|c| c.title.starts_with("up")));
    }
}
