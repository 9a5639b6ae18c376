// src/images/search.rs
use anyhow::Result;
use serde::Deserialize;

/// Requested photo orientation for keyword searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
    Squarish,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Squarish => "squarish",
        }
    }
}

/// Image returned by a keyword search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundImage {
    pub url: String,
    pub credit: String,
    pub download_tracking_url: Option<String>,
}

#[async_trait::async_trait]
pub trait ImageSearch: Send + Sync {
    /// `Ok(None)` when the search ran but found nothing usable.
    async fn search(&self, query: &str, orientation: Orientation) -> Result<Option<FoundImage>>;

    /// Best-effort notice that a found image was actually used.
    async fn track_download(&self, _image: &FoundImage) -> Result<()> {
        Ok(())
    }
}

/// Returns the same image for every query and records each query with its orientation.
pub struct StaticImageSearch {
    image: Option<FoundImage>,
    queries: std::sync::Mutex<Vec<(String, Orientation)>>,
}

impl StaticImageSearch {
    pub fn new(image: Option<FoundImage>) -> Self {
        Self {
            image,
            queries: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.searches().into_iter().map(|(q, _)| q).collect()
    }

    pub fn searches(&self) -> Vec<(String, Orientation)> {
        self.queries.lock().expect("queries mutex poisoned").clone()
    }
}

#[async_trait::async_trait]
impl ImageSearch for StaticImageSearch {
    async fn search(&self, query: &str, orientation: Orientation) -> Result<Option<FoundImage>> {
        self.queries
            .lock()
            .expect("queries mutex poisoned")
            .push((query.to_string(), orientation));
        Ok(self.image.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        orientation: Orientation,
    }

    #[test]
    fn orientation_parses_from_settings_names() {
        for (raw, want) in [
            ("landscape", Orientation::Landscape),
            ("portrait", Orientation::Portrait),
            ("squarish", Orientation::Squarish),
        ] {
            let w: Wrapper = toml::from_str(&format!("orientation = \"{raw}\"")).unwrap();
            assert_eq!(w.orientation, want);
            assert_eq!(want.as_str(), raw);
        }
        assert!(toml::from_str::<Wrapper>("orientation = \"wide\"").is_err());
    }
}
