// src/pipeline.rs
//! Category selection and content generation for one run.
//!
//! Flow: weighted draw -> category generator -> (news) candidate filter with a
//! single fallback to a local feature -> image from the curated pool or search.

use metrics::counter;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clean::clean;
use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::filter::CandidateFilter;
use crate::generate::{prompts, Generator};
use crate::images::ledger::ImageLedger;
use crate::images::search::ImageSearch;
use crate::images::ImagePool;
use crate::ingest::fetch_candidates;
use crate::ingest::types::FeedSource;
use crate::post::GeneratedPost;
use crate::select::{CategoryWeights, ContentCategory};
use crate::telemetry as m;

/// Post produced by a run, with the category it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPost {
    /// Category drawn at random.
    pub drawn: ContentCategory,
    /// Category that produced the post (differs after the news fallback).
    pub category: ContentCategory,
    pub post: GeneratedPost,
}

pub struct ContentPipeline {
    config: AppConfig,
    weights: CategoryWeights,
    generator: Arc<dyn Generator>,
    feeds: Vec<Box<dyn FeedSource>>,
    image_search: Option<Arc<dyn ImageSearch>>,
    ledger: ImageLedger,
    rng: StdRng,
}

impl ContentPipeline {
    pub fn new(
        config: AppConfig,
        generator: Arc<dyn Generator>,
        ledger: ImageLedger,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let weights = config.weights.to_weights()?;
        Ok(Self {
            config,
            weights,
            generator,
            feeds: Vec::new(),
            image_search: None,
            ledger,
            rng: StdRng::from_os_rng(),
        })
    }

    pub fn with_feeds(mut self, feeds: Vec<Box<dyn FeedSource>>) -> Self {
        self.feeds = feeds;
        self
    }

    pub fn with_image_search(mut self, search: Arc<dyn ImageSearch>) -> Self {
        self.image_search = Some(search);
        self
    }

    /// Deterministic randomness for tests and replays.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Draw a category and generate its post. `None` when nothing usable was produced.
    pub async fn select_and_generate(&mut self) -> Option<SelectedPost> {
        m::ensure_described();
        let drawn = self.weights.choose(&mut self.rng);
        info!(category = %drawn, "selected content category");
        self.generate_for(drawn).await
    }

    /// Generate for a given category, applying the one-level news fallback.
    pub async fn generate_for(&mut self, drawn: ContentCategory) -> Option<SelectedPost> {
        let category = match drawn {
            ContentCategory::News => match self.generate_news().await {
                Some(post) => {
                    return Some(SelectedPost {
                        drawn,
                        category: drawn,
                        post,
                    })
                }
                None => {
                    info!("no usable news, falling back to local feature");
                    ContentCategory::LocalFeature
                }
            },
            other => other,
        };

        let post = self.generate_feature(category).await?;
        Some(SelectedPost {
            drawn,
            category,
            post,
        })
    }

    async fn generate_news(&self) -> Option<GeneratedPost> {
        let news = &self.config.news;
        info!(feeds = self.feeds.len(), "fetching news candidates");
        let candidates =
            fetch_candidates(&self.feeds, news.max_candidates, news.per_source_cap).await;
        if candidates.is_empty() {
            info!("no news candidates fetched");
            return None;
        }

        let filter = CandidateFilter::new(
            self.generator.as_ref(),
            self.config.content.location.clone(),
            news.prompt_summary_chars,
            news.fallback_summary_chars,
        );
        let post = filter.first_accepted(&candidates).await;
        if post.is_none() {
            info!(candidates = candidates.len(), "every news candidate was skipped");
        }
        post
    }

    async fn generate_feature(&mut self, category: ContentCategory) -> Option<GeneratedPost> {
        let content = &self.config.content;
        let (topics, op) = match category {
            ContentCategory::Meme => (&content.meme_themes, "generate_meme"),
            _ => (&content.local_topics, "generate_local_feature"),
        };
        let Some(topic) = topics.choose(&mut self.rng).cloned() else {
            warn!(category = %category, "no topics configured for category");
            return None;
        };
        let prompt = match category {
            ContentCategory::Meme => prompts::meme(&topic, &content.location),
            _ => prompts::local_feature(&topic, &content.location),
        };
        info!(
            category = %category,
            %topic,
            generator = self.generator.name(),
            "generating content"
        );

        let text = match self.generator.generate(&prompt).await {
            Ok(raw) => clean(&raw),
            Err(e) => {
                let err = PipelineError::generation(op, &e);
                warn!(error = %err, "content generation failed");
                counter!(m::GENERATION_ERRORS).increment(1);
                return None;
            }
        };
        if text.is_empty() {
            warn!(category = %category, "generator returned no usable text");
            return None;
        }

        Some(self.attach_image(category, &topic, GeneratedPost::text_only(text)).await)
    }

    /// Curated pool first, keyword search second, text only otherwise.
    async fn attach_image(
        &mut self,
        category: ContentCategory,
        topic: &str,
        post: GeneratedPost,
    ) -> GeneratedPost {
        let pool = ImagePool::load_or_empty(&self.config.images.pool_path);
        if let Some(img) = self.ledger.select_image(&pool, &mut self.rng) {
            info!(url = %img.url, "using curated pool image");
            let credit = img
                .caption
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| format!("📸 {c}"));
            return post.with_image(img.url, credit);
        }

        let Some(search) = self.image_search.clone() else {
            return post;
        };
        let query = self.image_query(category, topic).await;
        match search.search(&query, self.config.images.orientation).await {
            Ok(Some(found)) => {
                if let Err(e) = search.track_download(&found).await {
                    warn!(error = ?e, "image download tracking failed");
                }
                post.with_image(found.url, Some(found.credit))
            }
            Ok(None) => {
                info!(%query, "image search found nothing");
                post
            }
            Err(e) => {
                let err = PipelineError::source_unavailable("image_search", &e);
                warn!(error = %err, "posting without image");
                counter!(m::SOURCE_ERRORS).increment(1);
                post
            }
        }
    }

    async fn image_query(&mut self, category: ContentCategory, topic: &str) -> String {
        let location = self.config.content.location.clone();
        if category == ContentCategory::Meme {
            return self
                .config
                .images
                .meme_queries
                .choose(&mut self.rng)
                .cloned()
                .unwrap_or(location);
        }

        let prompt = prompts::image_query(topic, &location);
        match self.generator.generate(&prompt).await {
            Ok(raw) => {
                let q = raw.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
                if q.is_empty() {
                    format!("{location} cityscape")
                } else {
                    q.to_string()
                }
            }
            Err(e) => {
                warn!(error = ?e, "could not generate image query");
                format!("{location} cityscape")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::ScriptedGenerator;
    use crate::images::ledger::MemoryLedger;

    fn config_without_pool() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.images.pool_path = "definitely/not/here.json".into();
        cfg
    }

    #[tokio::test]
    async fn meme_generation_failure_returns_nothing() {
        let gen = Arc::new(ScriptedGenerator::new([Err("quota".to_string())]));
        let mut p = ContentPipeline::new(
            config_without_pool(),
            gen,
            ImageLedger::new(Box::new(MemoryLedger::default())),
        )
        .unwrap()
        .with_seed(1);
        assert!(p.generate_for(ContentCategory::Meme).await.is_none());
    }

    #[tokio::test]
    async fn empty_topic_list_yields_nothing_without_generating() {
        let gen = Arc::new(ScriptedGenerator::replying(["unused"]));
        let mut p = ContentPipeline::new(
            config_without_pool(),
            gen.clone(),
            ImageLedger::new(Box::new(MemoryLedger::default())),
        )
        .unwrap()
        .with_seed(3);
        // validation ran in new(); clear afterwards to reach the runtime guard
        p.config.content.meme_themes.clear();
        assert!(p.generate_for(ContentCategory::Meme).await.is_none());
        assert_eq!(gen.calls(), 0);
    }

    #[tokio::test]
    async fn feature_without_pool_or_search_is_text_only() {
        let gen = Arc::new(ScriptedGenerator::replying(["Post: Try locro de papa 🥔"]));
        let mut p = ContentPipeline::new(
            config_without_pool(),
            gen,
            ImageLedger::new(Box::new(MemoryLedger::default())),
        )
        .unwrap()
        .with_seed(2);
        let got = p.generate_for(ContentCategory::LocalFeature).await.unwrap();
        assert_eq!(got.category, ContentCategory::LocalFeature);
        assert_eq!(got.post, GeneratedPost::text_only("Try locro de papa 🥔"));
    }
}
