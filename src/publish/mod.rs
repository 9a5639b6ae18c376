// src/publish/mod.rs
//! Page publishing: picks one of three exclusive modes and runs its call sequence.
//!
//! - image: upload the image unpublished, then a feed entry referencing the
//!   media id (a single photo call would land outside the main feed);
//!   a failed upload degrades to text-only with the original text
//! - link preview: trailing `Read more: <link>` removed, link sent as the preview field
//! - text only: message alone
//!
//! No retries: a failed feed call ends the attempt.

pub mod graph;

use anyhow::{anyhow, Result};
use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::post::READ_MORE_PREFIX;
use crate::telemetry as m;

/// Body of a feed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub message: String,
    pub media_id: Option<String>,
    pub link: Option<String>,
}

#[async_trait::async_trait]
pub trait PublishTransport: Send + Sync {
    /// Upload an image by URL without publishing it. `Ok(None)` means the
    /// call succeeded but returned no media id.
    async fn upload_unpublished_media(&self, page_id: &str, image_url: &str)
        -> Result<Option<String>>;

    /// Publish a feed entry; returns the post id.
    async fn publish_feed_entry(&self, page_id: &str, entry: &FeedEntry) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    Image,
    LinkPreview,
    TextOnly,
}

impl PublishMode {
    /// Precedence: image, then link, then text only.
    pub fn for_inputs(image_url: Option<&str>, link: Option<&str>) -> Self {
        match (image_url, link) {
            (Some(_), _) => PublishMode::Image,
            (None, Some(_)) => PublishMode::LinkPreview,
            (None, None) => PublishMode::TextOnly,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PublishMode::Image => "image",
            PublishMode::LinkPreview => "link_preview",
            PublishMode::TextOnly => "text_only",
        }
    }
}

/// Successful publish: the mode actually used and the new post id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub mode: PublishMode,
    pub post_id: String,
    /// Set when an image upload failed and the post went out as text only.
    pub degraded_from_image: bool,
}

fn trailing_read_more_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s*Read more:\s*https?://\S+\s*$").unwrap())
}

/// Remove a trailing `Read more: <link>` (or any trailing `Read more: <url>`).
pub fn strip_trailing_read_more(text: &str, link: &str) -> String {
    let trimmed = text.trim_end();
    let literal = format!("{READ_MORE_PREFIX} {link}");
    if let Some(head) = trimmed.strip_suffix(&literal) {
        return head.trim_end().to_string();
    }
    trailing_read_more_re()
        .replace(trimmed, "")
        .trim_end()
        .to_string()
}

pub struct Publisher<'a> {
    transport: &'a dyn PublishTransport,
    page_id: String,
}

impl<'a> Publisher<'a> {
    pub fn new(transport: &'a dyn PublishTransport, page_id: impl Into<String>) -> Self {
        Self {
            transport,
            page_id: page_id.into(),
        }
    }

    /// `true` when the post went out.
    pub async fn publish(&self, text: &str, image_url: Option<&str>, link: Option<&str>) -> bool {
        match self.publish_detailed(text, image_url, link).await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "publish failed");
                false
            }
        }
    }

    pub async fn publish_detailed(
        &self,
        text: &str,
        image_url: Option<&str>,
        link: Option<&str>,
    ) -> Result<PublishReceipt, PipelineError> {
        m::ensure_described();
        match (PublishMode::for_inputs(image_url, link), image_url, link) {
            (PublishMode::Image, Some(url), _) => self.publish_with_image(text, url).await,
            (PublishMode::LinkPreview, _, Some(link)) => {
                let entry = FeedEntry {
                    message: strip_trailing_read_more(text, link),
                    link: Some(link.to_string()),
                    ..Default::default()
                };
                self.feed(PublishMode::LinkPreview, &entry).await
            }
            _ => self.text_only(text).await,
        }
    }

    async fn publish_with_image(
        &self,
        text: &str,
        image_url: &str,
    ) -> Result<PublishReceipt, PipelineError> {
        info!("uploading photo (unpublished)");
        let upload = self
            .transport
            .upload_unpublished_media(&self.page_id, image_url)
            .await
            .and_then(|id| {
                id.filter(|id| !id.trim().is_empty())
                    .ok_or_else(|| anyhow!("upload returned no media id"))
            });

        match upload {
            Ok(media_id) => {
                info!(%media_id, "photo uploaded");
                let entry = FeedEntry {
                    message: text.to_string(),
                    media_id: Some(media_id),
                    link: None,
                };
                self.feed(PublishMode::Image, &entry).await
            }
            Err(e) => {
                let err = PipelineError::media_upload(format!("{e:#}"));
                warn!(error = %err, "posting without image");
                counter!(m::MEDIA_UPLOAD_FAILURES).increment(1);
                let mut receipt = self.text_only(text).await?;
                receipt.degraded_from_image = true;
                Ok(receipt)
            }
        }
    }

    async fn text_only(&self, text: &str) -> Result<PublishReceipt, PipelineError> {
        let entry = FeedEntry {
            message: text.to_string(),
            ..Default::default()
        };
        self.feed(PublishMode::TextOnly, &entry).await
    }

    async fn feed(
        &self,
        mode: PublishMode,
        entry: &FeedEntry,
    ) -> Result<PublishReceipt, PipelineError> {
        counter!(m::PUBLISH_ATTEMPTS, "mode" => mode.as_str()).increment(1);
        match self.transport.publish_feed_entry(&self.page_id, entry).await {
            Ok(post_id) => {
                info!(mode = mode.as_str(), %post_id, "posted to page");
                Ok(PublishReceipt {
                    mode,
                    post_id,
                    degraded_from_image: false,
                })
            }
            Err(e) => {
                counter!(m::PUBLISH_FAILURES, "mode" => mode.as_str()).increment(1);
                Err(PipelineError::publish(
                    format!("publish_feed_entry[{}]", mode.as_str()),
                    &e,
                ))
            }
        }
    }
}

/// One call seen by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Upload { page_id: String, image_url: String },
    Feed { page_id: String, entry: FeedEntry },
}

/// Records calls and answers from canned outcomes.
pub struct RecordingTransport {
    upload: Result<Option<String>, String>,
    feed: Result<String, String>,
    calls: Mutex<Vec<TransportCall>>,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self {
            upload: Ok(Some("media-1".to_string())),
            feed: Ok("post-1".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingTransport {
    pub fn with_upload(mut self, upload: Result<Option<String>, String>) -> Self {
        self.upload = upload;
        self
    }

    pub fn with_feed(mut self, feed: Result<String, String>) -> Self {
        self.feed = feed;
        self
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

#[async_trait::async_trait]
impl PublishTransport for RecordingTransport {
    async fn upload_unpublished_media(
        &self,
        page_id: &str,
        image_url: &str,
    ) -> Result<Option<String>> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(TransportCall::Upload {
                page_id: page_id.to_string(),
                image_url: image_url.to_string(),
            });
        self.upload.clone().map_err(|e| anyhow!(e))
    }

    async fn publish_feed_entry(&self, page_id: &str, entry: &FeedEntry) -> Result<String> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(TransportCall::Feed {
                page_id: page_id.to_string(),
                entry: entry.clone(),
            });
        self.feed.clone().map_err(|e| anyhow!(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_precedence() {
        assert_eq!(PublishMode::for_inputs(Some("i"), Some("l")), PublishMode::Image);
        assert_eq!(PublishMode::for_inputs(None, Some("l")), PublishMode::LinkPreview);
        assert_eq!(PublishMode::for_inputs(None, None), PublishMode::TextOnly);
    }

    #[test]
    fn strips_literal_and_url_read_more() {
        assert_eq!(strip_trailing_read_more("Story\n\nRead more: y", "y"), "Story");
        assert_eq!(
            strip_trailing_read_more("Story\n\nRead more: https://a.test/x  \n", "https://b.test"),
            "Story"
        );
        // only trailing occurrences go
        let mid = "Read more: y is a band name. Great show";
        assert_eq!(strip_trailing_read_more(mid, "y"), mid);
    }
}
