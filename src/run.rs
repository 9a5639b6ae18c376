// src/run.rs
//! One scheduled run: generate, then publish, then report.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::error::PipelineError;
use crate::pipeline::{ContentPipeline, SelectedPost};
use crate::publish::{PublishMode, PublishReceipt, Publisher};
use crate::select::ContentCategory;

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub started_at: DateTime<Utc>,
    pub selected: Option<SelectedPost>,
    pub receipt: Option<PublishReceipt>,
    pub failure: Option<PipelineError>,
    pub dry_run: bool,
}

impl RunOutcome {
    pub fn category(&self) -> Option<ContentCategory> {
        self.selected.as_ref().map(|s| s.category)
    }

    pub fn mode(&self) -> Option<PublishMode> {
        self.receipt.as_ref().map(|r| r.mode)
    }

    pub fn post_id(&self) -> Option<&str> {
        self.receipt.as_ref().map(|r| r.post_id.as_str())
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none() && self.selected.is_some() && (self.dry_run || self.receipt.is_some())
    }
}

/// Run selection and publishing once. Never panics on collaborator failure;
/// the outcome says what happened.
///
/// A consumed ledger slot stays consumed when the publish fails.
pub async fn run_once(
    pipeline: &mut ContentPipeline,
    publisher: &Publisher<'_>,
    dry_run: bool,
) -> RunOutcome {
    let started_at = Utc::now();
    info!(%started_at, dry_run, "starting run");

    let mut outcome = RunOutcome {
        started_at,
        selected: None,
        receipt: None,
        failure: None,
        dry_run,
    };

    let Some(selected) = pipeline.select_and_generate().await else {
        let err = PipelineError::GenerationFailure {
            op: "select_and_generate".to_string(),
            detail: "no content generated".to_string(),
        };
        error!(error = %err, "run produced no post");
        outcome.failure = Some(err);
        return outcome;
    };

    let post = &selected.post;
    info!(
        drawn = %selected.drawn,
        category = %selected.category,
        chars = post.text.chars().count(),
        image = post.image_url.is_some(),
        link = post.source_link.is_some(),
        "generated post"
    );

    if dry_run {
        info!(text = %post.text, "dry run, not publishing");
        outcome.selected = Some(selected);
        return outcome;
    }

    match publisher
        .publish_detailed(
            &post.text,
            post.image_url.as_deref(),
            post.source_link.as_deref(),
        )
        .await
    {
        Ok(receipt) => {
            info!(
                category = %selected.category,
                mode = receipt.mode.as_str(),
                post_id = %receipt.post_id,
                "run complete"
            );
            outcome.receipt = Some(receipt);
        }
        Err(e) => {
            error!(category = %selected.category, error = %e, kind = e.kind(), "post failed");
            outcome.failure = Some(e);
        }
    }
    outcome.selected = Some(selected);
    outcome
}
