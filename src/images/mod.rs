// src/images/mod.rs
pub mod ledger;
pub mod search;
pub mod unsplash;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One curated image. `caption` becomes the credit line under the post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    #[serde(default, rename = "post_message")]
    pub caption: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PoolFile {
    #[serde(default, rename = "totalImages", alias = "total_images")]
    total_images: Option<usize>,
    #[serde(default)]
    images: Vec<ImageRecord>,
}

/// Read-only curated pool for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePool {
    pub images: Vec<ImageRecord>,
}

impl ImagePool {
    pub fn new(images: Vec<ImageRecord>) -> Self {
        Self { images }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: PoolFile = serde_json::from_str(content).context("parsing image pool json")?;
        let images: Vec<ImageRecord> = file
            .images
            .into_iter()
            .filter(|i| !i.url.trim().is_empty())
            .collect();
        if let Some(declared) = file.total_images {
            if declared != images.len() {
                tracing::debug!(declared, actual = images.len(), "image pool count mismatch");
            }
        }
        Ok(Self { images })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading image pool from {}", path.display()))?;
        Self::parse(&content)
    }

    /// Missing or unreadable pool means an empty pool; the caller falls back to search.
    pub fn load_or_empty(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no curated image pool");
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(pool) => {
                tracing::info!(count = pool.len(), "loaded curated image pool");
                pool
            }
            Err(e) => {
                tracing::warn!(error = ?e, "could not load curated image pool");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
