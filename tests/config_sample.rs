// tests/config_sample.rs
use std::path::Path;

use page_autopost::config::AppConfig;
use page_autopost::images::search::Orientation;
use page_autopost::ContentCategory;

#[test]
fn shipped_sample_config_loads_and_validates() {
    let cfg = AppConfig::load_from(Path::new("config/autopost.toml")).expect("sample config");
    assert_eq!(cfg.content.location, "Quito, Ecuador");
    assert_eq!(cfg.news.feeds.len(), 3);
    assert_eq!(cfg.news.per_source_cap, 2);
    assert_eq!(cfg.images.orientation, Orientation::Landscape);

    let weights = cfg.weights.to_weights().unwrap();
    assert_eq!(weights.total(), 100);
    assert_eq!(weights.weight_of(ContentCategory::LocalFeature), 45);
    // omitted keys keep their defaults
    assert_eq!(
        cfg.generator.endpoint,
        "https://generativelanguage.googleapis.com/v1beta"
    );
    assert_eq!(cfg.publish.graph_base_url, "https://graph.facebook.com");
}
