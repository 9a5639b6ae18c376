// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod clean;
pub mod config;
pub mod error;
pub mod filter;
pub mod generate;
pub mod images;
pub mod ingest;
pub mod pipeline;
pub mod post;
pub mod publish;
pub mod run;
pub mod select;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::error::PipelineError;
pub use crate::pipeline::{ContentPipeline, SelectedPost};
pub use crate::post::GeneratedPost;
pub use crate::publish::{PublishMode, Publisher};
pub use crate::run::{run_once, RunOutcome};
pub use crate::select::ContentCategory;
