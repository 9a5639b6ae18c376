// src/config/mod.rs
//! Pipeline settings loaded from TOML, with built-in defaults for every field.
//!
//! Lookup order for the settings file:
//! 1) `$AUTOPOST_CONFIG_PATH` (must exist if set)
//! 2) `config/autopost.toml`
//! 3) built-in defaults

pub mod credentials;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::images::search::Orientation;
use crate::select::{CategoryWeights, ContentCategory};

pub const ENV_CONFIG_PATH: &str = "AUTOPOST_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/autopost.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub weights: WeightsConfig,
    pub news: NewsConfig,
    pub content: ContentConfig,
    pub images: ImagesConfig,
    pub generator: GeneratorConfig,
    pub publish: PublishConfig,
}

/// Relative weight per category. Zero disables a category.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    pub news: u32,
    pub local_feature: u32,
    pub meme: u32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            news: 30,
            local_feature: 45,
            meme: 25,
        }
    }
}

impl WeightsConfig {
    pub fn to_weights(&self) -> Result<CategoryWeights> {
        CategoryWeights::new([
            (ContentCategory::News, self.news),
            (ContentCategory::LocalFeature, self.local_feature),
            (ContentCategory::Meme, self.meme),
        ])
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub feeds: Vec<String>,
    /// Overall candidate cap across all feeds.
    pub max_candidates: usize,
    /// Candidates taken from a single feed.
    pub per_source_cap: usize,
    /// Summary characters embedded in the translation prompt.
    pub prompt_summary_chars: usize,
    /// Summary characters used by the templated fallback post.
    pub fallback_summary_chars: usize,
    pub fetch_timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feeds: [
                "https://feeds.elpais.com/mrss-s/pages/ep/site/elpais.com/portada",
                "https://rss.elmundo.es/rss/mundo.xml",
                "https://e00-elmundo.uecdn.es/elmundo/rss/internacional.xml",
                "https://www.eluniverso.com/feed/",
                "https://www.bbc.com/mundo/topics/c2dwqd1zd70t.rss",
            ]
            .map(String::from)
            .to_vec(),
            max_candidates: 5,
            per_source_cap: 2,
            prompt_summary_chars: 500,
            fallback_summary_chars: 200,
            fetch_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Place the page is about; flows into prompts and image queries.
    pub location: String,
    pub local_topics: Vec<String>,
    pub meme_themes: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            location: "Quito, Ecuador".to_string(),
            local_topics: [
                "hidden gems and secret spots in Quito that expats should know about",
                "best neighborhoods in Quito for expats and what makes them special",
                "traditional Ecuadorian food you must try in Quito",
                "day trips from Quito - nearby attractions and how to get there",
                "cost of living tips for expats in Quito",
                "cultural differences expats notice when living in Quito",
                "best cafes and coworking spaces in Quito",
                "weekend activities and things to do in Quito",
                "navigating Quito's transportation system as an expat",
                "learning Spanish in Quito - tips and resources",
                "Quito's weather and what to pack for each season",
                "making friends as an expat in Quito",
                "beautiful viewpoints and photo spots in Quito",
                "festivals and cultural events in Quito",
                "expat-friendly doctors and services in Quito",
            ]
            .map(String::from)
            .to_vec(),
            meme_themes: [
                "explaining to family back home what life in Ecuador is like",
                "the difference between tourist prices and local prices",
                "trying to understand Ecuadorian Spanish slang",
                "dealing with altitude in Quito for the first time",
                "when you finally understand a joke in Spanish",
                "expat budget vs reality in Ecuador",
                "missing food from home vs discovering amazing local food",
                "learning to navigate Quito traffic",
                "when locals speak too fast in Spanish",
                "adjusting to Ecuador time vs your home country time",
                "trying to explain American portions vs Ecuadorian portions",
                "the face you make when you understand Spanish news",
                "realizing everything closes during siesta",
                "expat WhatsApp groups be like",
                "when you start preferring ecuadorian food over your home country food",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Curated pool file (`{totalImages, images: [...]}`), read fresh each run.
    pub pool_path: PathBuf,
    /// Recently-used ledger file (JSON array of URLs).
    pub ledger_path: PathBuf,
    /// Search terms for meme posts when the curated pool yields nothing.
    pub meme_queries: Vec<String>,
    /// Photo orientation requested from image search.
    pub orientation: Orientation,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            pool_path: PathBuf::from("group_images.json"),
            ledger_path: PathBuf::from("used_images.json"),
            meme_queries: [
                "Quito street scene everyday life",
                "Ecuador market colorful vendors",
                "traditional Ecuadorian food plate",
                "Quito public transportation bus",
                "Old Town Quito colonial architecture",
            ]
            .map(String::from)
            .to_vec(),
            orientation: Orientation::Landscape,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
            temperature: 0.8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub graph_base_url: String,
    pub graph_version: String,
    pub timeout_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            graph_base_url: "https://graph.facebook.com".to_string(),
            graph_version: "v24.0".to_string(),
            timeout_secs: 20,
        }
    }
}

impl AppConfig {
    /// Load and validate settings from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load settings using the env var + fallbacks described in the module docs.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from(&default_path);
        }
        tracing::info!("no config file found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.to_weights()?;
        if self.news.max_candidates == 0 {
            bail!("news.max_candidates must be at least 1");
        }
        if self.news.per_source_cap == 0 {
            bail!("news.per_source_cap must be at least 1");
        }
        // news falls back to a local feature, so it needs topics too
        if (self.weights.local_feature > 0 || self.weights.news > 0)
            && self.content.local_topics.is_empty()
        {
            bail!("content.local_topics is empty but local_feature or news has weight");
        }
        if self.weights.meme > 0 && self.content.meme_themes.is_empty() {
            bail!("content.meme_themes is empty but meme has weight");
        }
        Ok(())
    }
}
