// tests/run_once.rs
use std::fs;
use std::path::Path;
use std::sync::Arc;

use page_autopost::config::AppConfig;
use page_autopost::generate::ScriptedGenerator;
use page_autopost::images::ledger::{ImageLedger, JsonFileLedger, LedgerStore};
use page_autopost::images::search::{FoundImage, Orientation, StaticImageSearch};
use page_autopost::publish::{FeedEntry, RecordingTransport, TransportCall};
use page_autopost::{run_once, ContentCategory, ContentPipeline, PublishMode, Publisher};

const IMAGE: &str = "https://img.test/rooftops.jpg";

fn feature_only_config(dir: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.weights.news = 0;
    cfg.weights.local_feature = 1;
    cfg.weights.meme = 0;
    cfg.images.pool_path = dir.join("group_images.json");
    cfg.images.ledger_path = dir.join("state").join("used_images.json");
    cfg
}

fn write_single_image_pool(dir: &Path) {
    let pool = format!(
        r#"{{"totalImages": 1, "images": [{{"url": "{IMAGE}", "post_message": "Quito rooftops"}}]}}"#
    );
    fs::write(dir.join("group_images.json"), pool).unwrap();
}

fn pipeline(cfg: AppConfig, gen: Arc<ScriptedGenerator>) -> ContentPipeline {
    let ledger = ImageLedger::new(Box::new(JsonFileLedger::new(cfg.images.ledger_path.clone())));
    ContentPipeline::new(cfg, gen, ledger)
        .expect("valid config")
        .with_seed(11)
}

#[tokio::test]
async fn curated_image_run_publishes_with_credit_and_records_ledger() {
    let dir = tempfile::tempdir().unwrap();
    write_single_image_pool(dir.path());
    let cfg = feature_only_config(dir.path());
    let ledger_path = cfg.images.ledger_path.clone();

    let gen = Arc::new(ScriptedGenerator::replying([
        "Here's a Facebook post for you: Try the locro de papa in La Floresta 🥔",
    ]));
    let mut p = pipeline(cfg, gen.clone());
    let transport = RecordingTransport::default();
    let publisher = Publisher::new(&transport, "page-1");

    let outcome = run_once(&mut p, &publisher, false).await;
    assert!(outcome.succeeded(), "outcome: {outcome:?}");
    assert_eq!(outcome.category(), Some(ContentCategory::LocalFeature));
    assert_eq!(outcome.mode(), Some(PublishMode::Image));
    assert_eq!(outcome.post_id(), Some("post-1"));
    // pool image found, so no image-query generation call
    assert_eq!(gen.calls(), 1);

    assert_eq!(
        transport.calls(),
        vec![
            TransportCall::Upload {
                page_id: "page-1".to_string(),
                image_url: IMAGE.to_string(),
            },
            TransportCall::Feed {
                page_id: "page-1".to_string(),
                entry: FeedEntry {
                    message: "Try the locro de papa in La Floresta 🥔\n\n📸 Quito rooftops"
                        .to_string(),
                    media_id: Some("media-1".to_string()),
                    link: None,
                },
            },
        ]
    );
    assert_eq!(
        JsonFileLedger::new(ledger_path).load().unwrap(),
        vec![IMAGE.to_string()]
    );
}

#[tokio::test]
async fn search_image_used_when_pool_missing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = feature_only_config(dir.path());

    let gen = Arc::new(ScriptedGenerator::replying([
        "The Mariscal market opens at 7am ☀️",
        "\"Quito market morning\"",
    ]));
    let search = Arc::new(StaticImageSearch::new(Some(FoundImage {
        url: "https://images.test/market.jpg".to_string(),
        credit: "📸 Ana Ruiz on Unsplash".to_string(),
        download_tracking_url: None,
    })));
    let mut p = pipeline(cfg, gen.clone()).with_image_search(search.clone());
    let transport = RecordingTransport::default();
    let publisher = Publisher::new(&transport, "page-1");

    let outcome = run_once(&mut p, &publisher, false).await;
    assert!(outcome.succeeded());
    assert_eq!(search.queries(), vec!["Quito market morning".to_string()]);

    let post = &outcome.selected.as_ref().unwrap().post;
    assert_eq!(
        post.text,
        "The Mariscal market opens at 7am ☀️\n\n📸 Ana Ruiz on Unsplash"
    );
    assert_eq!(post.image_url.as_deref(), Some("https://images.test/market.jpg"));
}

#[tokio::test]
async fn meme_search_uses_configured_queries() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = feature_only_config(dir.path());
    cfg.weights.local_feature = 0;
    cfg.weights.meme = 1;
    cfg.images.meme_queries = vec!["Quito traffic jam".to_string()];
    cfg.images.orientation = Orientation::Squarish;

    let gen = Arc::new(ScriptedGenerator::replying(["When the bus says Carcelén but means Quitumbe 😅"]));
    let search = Arc::new(StaticImageSearch::new(None));
    let mut p = pipeline(cfg, gen.clone()).with_image_search(search.clone());
    let transport = RecordingTransport::default();
    let publisher = Publisher::new(&transport, "page-1");

    let outcome = run_once(&mut p, &publisher, false).await;
    assert!(outcome.succeeded());
    assert_eq!(outcome.category(), Some(ContentCategory::Meme));
    assert_eq!(outcome.mode(), Some(PublishMode::TextOnly));
    assert_eq!(
        search.searches(),
        vec![("Quito traffic jam".to_string(), Orientation::Squarish)]
    );
    assert_eq!(gen.calls(), 1);
}

#[tokio::test]
async fn dry_run_generates_but_does_not_publish() {
    let dir = tempfile::tempdir().unwrap();
    write_single_image_pool(dir.path());
    let gen = Arc::new(ScriptedGenerator::replying(["Rain again at 3pm ☔ Umbrella ready?"]));
    let mut p = pipeline(feature_only_config(dir.path()), gen);
    let transport = RecordingTransport::default();
    let publisher = Publisher::new(&transport, "page-1");

    let outcome = run_once(&mut p, &publisher, true).await;
    assert!(outcome.succeeded());
    assert!(outcome.dry_run);
    assert!(outcome.receipt.is_none());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn publish_failure_fails_run_and_keeps_ledger_entry() {
    let dir = tempfile::tempdir().unwrap();
    write_single_image_pool(dir.path());
    let cfg = feature_only_config(dir.path());
    let ledger_path = cfg.images.ledger_path.clone();

    let gen = Arc::new(ScriptedGenerator::replying(["Weekend plans in Cumbayá? 🌮"]));
    let mut p = pipeline(cfg, gen);
    let transport = RecordingTransport::default().with_feed(Err("(#190) token expired".into()));
    let publisher = Publisher::new(&transport, "page-1");

    let outcome = run_once(&mut p, &publisher, false).await;
    assert!(!outcome.succeeded());
    assert_eq!(
        outcome.failure.as_ref().map(|e| e.kind()),
        Some("publish_failure")
    );
    assert_eq!(
        JsonFileLedger::new(ledger_path).load().unwrap(),
        vec![IMAGE.to_string()]
    );
}

#[tokio::test]
async fn nothing_generated_fails_run_without_calls() {
    let dir = tempfile::tempdir().unwrap();
    let gen = Arc::new(ScriptedGenerator::new([Err("500 internal".to_string())]));
    let mut p = pipeline(feature_only_config(dir.path()), gen);
    let transport = RecordingTransport::default();
    let publisher = Publisher::new(&transport, "page-1");

    let outcome = run_once(&mut p, &publisher, false).await;
    assert!(!outcome.succeeded());
    assert!(outcome.selected.is_none());
    assert_eq!(
        outcome.failure.as_ref().map(|e| e.kind()),
        Some("generation_failure")
    );
    assert!(transport.calls().is_empty());
}
