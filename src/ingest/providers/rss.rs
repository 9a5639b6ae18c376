// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::ingest::normalize_text;
use crate::ingest::types::{Candidate, FeedSource};
use crate::telemetry as m;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_to_unix(ts: &str) -> Option<u64> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
}

/// RSS 2.0 feed, fetched over HTTP or parsed from an in-memory document.
pub struct RssFeedSource {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssFeedSource {
    pub fn from_fixture(name: &str, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("page-autopost/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self {
            name: url.to_string(),
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        })
    }

    fn parse_items_from_str(s: &str) -> Result<Vec<Candidate>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            let link = it.link.as_deref().map(str::trim).unwrap_or_default();
            if title.is_empty() || link.is_empty() {
                continue;
            }
            out.push(Candidate {
                title,
                summary: normalize_text(it.description.as_deref().unwrap_or_default()),
                link: link.to_string(),
                published_at: it.pub_date.as_deref().and_then(parse_rfc2822_to_unix),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!(m::FEED_PARSE_MS).record(ms);
        Ok(out)
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch(&self) -> Result<Vec<Candidate>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .context("feed http get()")?
                    .error_for_status()
                    .context("feed non-2xx")?
                    .text()
                    .await
                    .context("feed http .text()")?;
                Self::parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// Entities that are valid HTML but undeclared in XML.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&aacute;", "á")
        .replace("&eacute;", "é")
        .replace("&iacute;", "í")
        .replace("&oacute;", "ó")
        .replace("&uacute;", "ú")
        .replace("&ntilde;", "ñ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Noticias</title>
    <item>
      <title>Ecuador y Colombia firman acuerdo</title>
      <link>https://example.com/a</link>
      <pubDate>Tue, 03 Jun 2025 14:00:00 +0000</pubDate>
      <description>&lt;p&gt;El acuerdo&amp;nbsp;comercial&lt;/p&gt;</description>
    </item>
    <item>
      <title></title>
      <link>https://example.com/untitled</link>
    </item>
    <item>
      <title>Sin enlace</title>
    </item>
    <item>
      <title>Quito&nbsp;celebra sus fiestas</title>
      <link> https://example.com/b </link>
      <pubDate>not a date</pubDate>
    </item>
  </channel>
</rss>"#;

    #[tokio::test]
    async fn parses_items_and_drops_incomplete() {
        let src = RssFeedSource::from_fixture("fixture", XML);
        let items = src.fetch().await.unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "Ecuador y Colombia firman acuerdo");
        assert_eq!(items[0].summary, "El acuerdo comercial");
        assert_eq!(items[0].published_at, Some(1_748_959_200));

        assert_eq!(items[1].title, "Quito celebra sus fiestas");
        assert_eq!(items[1].link, "https://example.com/b");
        assert_eq!(items[1].published_at, None);
    }

    #[tokio::test]
    async fn empty_channel_yields_nothing() {
        let xml = r#"<rss><channel><title>x</title></channel></rss>"#;
        let src = RssFeedSource::from_fixture("empty", xml);
        assert!(src.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_rss_document_is_an_error() {
        let src = RssFeedSource::from_fixture("html", "<html><body>nope</body></html>");
        assert!(src.fetch().await.is_err());
    }
}
