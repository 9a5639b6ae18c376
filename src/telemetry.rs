// src/telemetry.rs
//! Metric names and one-time descriptions. The binary installs no recorder;
//! an embedding process can install one to collect these.

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

pub const CANDIDATES_FETCHED: &str = "autopost_candidates_fetched_total";
pub const CANDIDATES_SKIPPED: &str = "autopost_candidates_skipped_total";
pub const CANDIDATES_ACCEPTED: &str = "autopost_candidates_accepted_total";
pub const CANDIDATES_FALLBACK: &str = "autopost_candidates_fallback_total";
pub const SOURCE_ERRORS: &str = "autopost_source_errors_total";
pub const FEED_PARSE_MS: &str = "autopost_feed_parse_ms";
pub const GENERATION_ERRORS: &str = "autopost_generation_errors_total";
pub const IMAGE_PICKS: &str = "autopost_image_picks_total";
pub const IMAGE_LEDGER_RESETS: &str = "autopost_image_ledger_resets_total";
pub const PUBLISH_ATTEMPTS: &str = "autopost_publish_attempts_total";
pub const PUBLISH_FAILURES: &str = "autopost_publish_failures_total";
pub const MEDIA_UPLOAD_FAILURES: &str = "autopost_media_upload_failures_total";

/// One-time metrics registration (so series carry help text when exported).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(CANDIDATES_FETCHED, "News candidates fetched from feeds.");
        describe_counter!(CANDIDATES_SKIPPED, "Candidates rejected as not relevant.");
        describe_counter!(CANDIDATES_ACCEPTED, "Candidates accepted for publishing.");
        describe_counter!(
            CANDIDATES_FALLBACK,
            "Candidates turned into a templated post after a generation error."
        );
        describe_counter!(SOURCE_ERRORS, "Feed or image-search fetch errors.");
        describe_histogram!(FEED_PARSE_MS, "Feed parse time in milliseconds.");
        describe_counter!(GENERATION_ERRORS, "Text generation call errors.");
        describe_counter!(IMAGE_PICKS, "Images picked from the curated pool.");
        describe_counter!(
            IMAGE_LEDGER_RESETS,
            "Ledger resets after every pool image was used."
        );
        describe_counter!(PUBLISH_ATTEMPTS, "Publish attempts, labelled by mode.");
        describe_counter!(PUBLISH_FAILURES, "Failed publish attempts, labelled by mode.");
        describe_counter!(
            MEDIA_UPLOAD_FAILURES,
            "Media uploads that failed and degraded to text-only."
        );
    });
}
