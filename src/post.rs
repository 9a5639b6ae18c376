// src/post.rs
pub const READ_MORE_PREFIX: &str = "Read more:";

/// Final post content handed to the publisher.
///
/// At most one of `image_url` / `source_link` is set: image attachment and
/// link preview are exclusive presentation modes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedPost {
    pub text: String,
    pub image_url: Option<String>,
    pub image_credit: Option<String>,
    pub source_link: Option<String>,
}

impl GeneratedPost {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// News post: no image, the link drives the preview.
    pub fn linked(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_link: Some(link.into()),
            ..Default::default()
        }
    }

    /// Attach an image and its credit line; drops any link so the modes stay exclusive.
    pub fn with_image(mut self, url: impl Into<String>, credit: Option<String>) -> Self {
        if let Some(c) = credit.as_deref().filter(|c| !c.trim().is_empty()) {
            self.text.push_str("\n\n");
            self.text.push_str(c.trim());
        }
        self.image_url = Some(url.into());
        self.image_credit = credit;
        self.source_link = None;
        self
    }
}

/// Appends `Read more: <link>` unless the link already appears in the text.
pub fn ensure_read_more(text: &str, link: &str) -> String {
    if text.contains(link) {
        text.to_string()
    } else {
        format!("{text}\n\n{READ_MORE_PREFIX} {link}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_image_appends_credit_and_clears_link() {
        let p = GeneratedPost::linked("Body", "https://x.test/a")
            .with_image("https://img.test/1.jpg", Some("📸 Ana on Unsplash".into()));
        assert_eq!(p.text, "Body\n\n📸 Ana on Unsplash");
        assert_eq!(p.image_url.as_deref(), Some("https://img.test/1.jpg"));
        assert!(p.source_link.is_none());
    }

    #[test]
    fn ensure_read_more_only_when_missing() {
        assert_eq!(
            ensure_read_more("News", "https://x.test/a"),
            "News\n\nRead more: https://x.test/a"
        );
        let already = "News https://x.test/a";
        assert_eq!(ensure_read_more(already, "https://x.test/a"), already);
    }
}
