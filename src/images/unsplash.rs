// src/images/unsplash.rs
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use super::search::{FoundImage, ImageSearch, Orientation};

const API_BASE: &str = "https://api.unsplash.com";

/// Unsplash random-photo search.
pub struct UnsplashSearch {
    http: reqwest::Client,
    access_key: String,
    base: String,
}

impl UnsplashSearch {
    pub fn new(access_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("page-autopost/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building unsplash http client")?;
        Ok(Self {
            http,
            access_key,
            base: API_BASE.to_string(),
        })
    }
}

#[derive(Deserialize)]
struct Photo {
    urls: Urls,
    user: User,
    links: Option<Links>,
}

#[derive(Deserialize)]
struct Urls {
    regular: String,
}

#[derive(Deserialize)]
struct User {
    name: String,
}

#[derive(Deserialize)]
struct Links {
    download_location: Option<String>,
}

fn to_found(photo: Photo) -> FoundImage {
    FoundImage {
        url: photo.urls.regular,
        credit: format!("📸 {} on Unsplash", photo.user.name),
        download_tracking_url: photo.links.and_then(|l| l.download_location),
    }
}

#[async_trait::async_trait]
impl ImageSearch for UnsplashSearch {
    async fn search(&self, query: &str, orientation: Orientation) -> Result<Option<FoundImage>> {
        tracing::info!(query, "unsplash search");
        let resp = self
            .http
            .get(format!("{}/photos/random", self.base))
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .query(&[("query", query), ("orientation", orientation.as_str())])
            .send()
            .await
            .context("unsplash request")?;

        // No photo matches the query.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let photo: Photo = resp
            .error_for_status()
            .context("unsplash non-2xx")?
            .json()
            .await
            .context("decoding unsplash photo")?;
        Ok(Some(to_found(photo)))
    }

    async fn track_download(&self, image: &FoundImage) -> Result<()> {
        let Some(url) = image.download_tracking_url.as_deref() else {
            return Ok(());
        };
        self.http
            .get(url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .send()
            .await
            .context("unsplash download tracking")?
            .error_for_status()
            .context("unsplash download tracking non-2xx")?;
        Ok(())
    }
}
