// src/select.rs
//! Content categories and weighted selection among them.

use anyhow::{bail, Context, Result};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    /// Translated news item.
    News,
    /// Local-interest feature about the page's location.
    LocalFeature,
    /// Humor item for the expat audience.
    Meme,
}

impl ContentCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentCategory::News => "news",
            ContentCategory::LocalFeature => "local_feature",
            ContentCategory::Meme => "meme",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted choice over categories: P(c) = weight(c) / total.
///
/// Sampling is a binary search over cumulative weights (`WeightedIndex`), so
/// a zero weight is never drawn.
#[derive(Debug, Clone)]
pub struct CategoryWeights {
    categories: Vec<ContentCategory>,
    weights: Vec<u32>,
    dist: WeightedIndex<u32>,
}

impl CategoryWeights {
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ContentCategory, u32)>,
    {
        let (categories, weights): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        if categories.is_empty() {
            bail!("no content categories configured");
        }
        let dist = WeightedIndex::new(weights.iter().copied())
            .context("category weights must include a positive value")?;
        Ok(Self {
            categories,
            weights,
            dist,
        })
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> ContentCategory {
        self.categories[self.dist.sample(rng)]
    }

    pub fn weight_of(&self, category: ContentCategory) -> u32 {
        self.categories
            .iter()
            .zip(&self.weights)
            .filter(|(c, _)| **c == category)
            .map(|(_, w)| *w)
            .sum()
    }

    pub fn total(&self) -> u32 {
        self.weights.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn frequencies_track_weights() {
        let w = CategoryWeights::new([
            (ContentCategory::News, 30),
            (ContentCategory::LocalFeature, 45),
            (ContentCategory::Meme, 25),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 100_000;
        let mut counts: HashMap<ContentCategory, u32> = HashMap::new();
        for _ in 0..n {
            *counts.entry(w.choose(&mut rng)).or_default() += 1;
        }
        for (cat, expected) in [
            (ContentCategory::News, 0.30),
            (ContentCategory::LocalFeature, 0.45),
            (ContentCategory::Meme, 0.25),
        ] {
            let observed = f64::from(counts[&cat]) / f64::from(n);
            assert!(
                (observed - expected).abs() < 0.01,
                "{cat}: observed {observed:.4}, expected {expected}"
            );
        }
    }

    #[test]
    fn zero_weight_is_never_drawn() {
        let w = CategoryWeights::new([
            (ContentCategory::News, 0),
            (ContentCategory::LocalFeature, 1),
            (ContentCategory::Meme, 3),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10_000 {
            assert_ne!(w.choose(&mut rng), ContentCategory::News);
        }
        assert_eq!(w.total(), 4);
        assert_eq!(w.weight_of(ContentCategory::Meme), 3);
    }

    #[test]
    fn all_zero_or_empty_is_rejected() {
        assert!(CategoryWeights::new([(ContentCategory::News, 0)]).is_err());
        assert!(CategoryWeights::new(Vec::<(ContentCategory, u32)>::new()).is_err());
    }
}
