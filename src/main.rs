//! Page autopost: binary entrypoint.
//! Loads settings and credentials, wires the real collaborators, and performs
//! one generate-and-publish run. Meant to be invoked by an external scheduler.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use page_autopost::config::credentials::Credentials;
use page_autopost::config::AppConfig;
use page_autopost::generate::gemini::GeminiGenerator;
use page_autopost::images::ledger::{ImageLedger, JsonFileLedger};
use page_autopost::images::unsplash::UnsplashSearch;
use page_autopost::ingest::providers::rss::RssFeedSource;
use page_autopost::ingest::types::FeedSource;
use page_autopost::publish::graph::GraphApiTransport;
use page_autopost::{run_once, ContentPipeline, Publisher};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("page_autopost=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

fn dry_run_enabled() -> bool {
    std::env::var("AUTOPOST_DRY_RUN")
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn build_feeds(cfg: &AppConfig) -> Vec<Box<dyn FeedSource>> {
    let timeout = Duration::from_secs(cfg.news.fetch_timeout_secs);
    cfg.news
        .feeds
        .iter()
        .filter_map(|url| match RssFeedSource::from_url(url, timeout) {
            Ok(src) => Some(Box::new(src) as Box<dyn FeedSource>),
            Err(e) => {
                warn!(feed = %url, error = ?e, "feed source disabled");
                None
            }
        })
        .collect()
}

async fn run() -> anyhow::Result<bool> {
    let cfg = AppConfig::load_default()?;
    let creds = Credentials::from_env()?;
    info!(
        feeds = cfg.news.feeds.len(),
        unsplash = creds.unsplash_api_key.is_some(),
        "configuration loaded"
    );

    let generator = Arc::new(GeminiGenerator::new(creds.gemini_api_key.clone(), &cfg.generator)?);
    let ledger = ImageLedger::new(Box::new(JsonFileLedger::new(cfg.images.ledger_path.clone())));
    let feeds = build_feeds(&cfg);

    let mut pipeline = ContentPipeline::new(cfg.clone(), generator, ledger)?.with_feeds(feeds);
    if let Some(key) = creds.unsplash_api_key.clone() {
        pipeline = pipeline.with_image_search(Arc::new(UnsplashSearch::new(key)?));
    }

    let transport = GraphApiTransport::new(creds.access_token.clone(), &cfg.publish)?;
    let publisher = Publisher::new(&transport, creds.page_id.clone());

    let outcome = run_once(&mut pipeline, &publisher, dry_run_enabled()).await;
    if outcome.succeeded() {
        info!(
            category = ?outcome.category(),
            mode = ?outcome.mode(),
            post_id = ?outcome.post_id(),
            "automation complete"
        );
    }
    Ok(outcome.succeeded())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env when present; no-op otherwise.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = ?e, "run aborted");
            ExitCode::FAILURE
        }
    }
}
