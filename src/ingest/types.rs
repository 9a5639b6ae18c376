// src/ingest/types.rs
use anyhow::Result;

/// One news item considered for translation. Lives for a single run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub summary: String, // normalized, tag-free
    pub link: String,
    pub published_at: Option<u64>, // unix seconds
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Items in feed order. Each source may fail independently.
    async fn fetch(&self) -> Result<Vec<Candidate>>;
    fn name(&self) -> &str;
}
