// src/publish/graph.rs
use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{FeedEntry, PublishTransport};
use crate::config::PublishConfig;

/// Graph API page transport (form-encoded POSTs with the page access token).
pub struct GraphApiTransport {
    client: Client,
    base: String,
    access_token: String,
}

#[derive(Deserialize)]
struct IdResponse {
    id: Option<String>,
}

impl GraphApiTransport {
    pub fn new(access_token: String, cfg: &PublishConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("page-autopost/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("building graph http client")?;
        Ok(Self {
            client,
            base: format!(
                "{}/{}",
                cfg.graph_base_url.trim_end_matches('/'),
                cfg.graph_version
            ),
            access_token,
        })
    }

    fn endpoint(&self, page_id: &str, edge: &str) -> String {
        format!("{}/{}/{}", self.base, page_id, edge)
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)], what: &str) -> Result<IdResponse> {
        let resp = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .with_context(|| format!("{what} request"))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("{what} returned {status}: {}", body.trim());
        }
        resp.json().await.with_context(|| format!("decoding {what} response"))
    }
}

/// Form fields for a feed entry, minus the access token.
pub fn feed_form(entry: &FeedEntry) -> Vec<(&'static str, &str)> {
    let mut form = vec![("message", entry.message.as_str())];
    if let Some(media_id) = entry.media_id.as_deref() {
        form.push(("attached_media[0][media_fbid]", media_id));
    }
    if let Some(link) = entry.link.as_deref() {
        form.push(("link", link));
    }
    form
}

#[async_trait::async_trait]
impl PublishTransport for GraphApiTransport {
    async fn upload_unpublished_media(
        &self,
        page_id: &str,
        image_url: &str,
    ) -> Result<Option<String>> {
        let form = [
            ("url", image_url),
            ("published", "false"),
            ("access_token", self.access_token.as_str()),
        ];
        let resp = self
            .post_form(&self.endpoint(page_id, "photos"), &form, "photo upload")
            .await?;
        Ok(resp.id)
    }

    async fn publish_feed_entry(&self, page_id: &str, entry: &FeedEntry) -> Result<String> {
        let mut form = feed_form(entry);
        form.push(("access_token", self.access_token.as_str()));
        let resp = self
            .post_form(&self.endpoint(page_id, "feed"), &form, "feed publish")
            .await?;
        resp.id.context("feed publish returned no post id")
    }
}
