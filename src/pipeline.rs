// src/pipeline.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::time::Instant;

use crate::config::AppConfig;
use crate::fanout::{any_found, fetch_all_images, ResultMap};
use crate::feed::types::ImageSource;
use crate::feed::FeedClient;
use crate::report::ReportUploader;
use crate::sources::SourceSet;
use crate::status::CompletionChecker;
use crate::telemetry::ensure_metrics_described;
use crate::transport::Transport;

/// How a single run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The status service already has every source for today.
    AlreadyDone,
    /// No source produced an image; nothing was uploaded.
    NoImages(ResultMap),
    Uploaded(ResultMap),
    UploadFailed(ResultMap),
}

impl RunOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::AlreadyDone => "already_done",
            RunOutcome::NoImages(_) => "no_images",
            RunOutcome::Uploaded(_) => "uploaded",
            RunOutcome::UploadFailed(_) => "upload_failed",
        }
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::AlreadyDone | RunOutcome::Uploaded(_) => 0,
            RunOutcome::UploadFailed(_) => 1,
            RunOutcome::NoImages(_) => 2,
        }
    }
}

/// check → fan-out → upload, wired from explicit parts.
pub struct Pipeline {
    checker: CompletionChecker,
    images: Arc<dyn ImageSource>,
    uploader: ReportUploader,
    sources: SourceSet,
    fetch_deadline: Duration,
}

impl Pipeline {
    pub fn new(
        checker: CompletionChecker,
        images: Arc<dyn ImageSource>,
        uploader: ReportUploader,
        sources: SourceSet,
        fetch_deadline: Duration,
    ) -> Self {
        Self {
            checker,
            images,
            uploader,
            sources,
            fetch_deadline,
        }
    }

    /// Build the production wiring: one transport shared by every component.
    pub fn from_config(cfg: &AppConfig, transport: Transport) -> anyhow::Result<Self> {
        let feed = FeedClient::new(
            transport.clone(),
            cfg.feed_base_url.clone(),
            cfg.day_boundary()?,
        );
        Ok(Self::new(
            CompletionChecker::new(transport.clone(), cfg.status_url.clone()),
            Arc::new(feed),
            ReportUploader::new(transport, cfg.report_url.clone()),
            cfg.sources.clone(),
            Duration::from_secs(cfg.fetch_deadline_secs),
        ))
    }

    pub async fn run(&self) -> RunOutcome {
        ensure_metrics_described();
        let outcome = self.run_inner().await;
        counter!("lunch_runs_total", "outcome" => outcome.label()).increment(1);
        outcome
    }

    async fn run_inner(&self) -> RunOutcome {
        let names = self.sources.names();
        match self.checker.check_work_done(names.as_slice()).await {
            Ok(true) => {
                tracing::info!("work already done");
                return RunOutcome::AlreadyDone;
            }
            Ok(false) => {}
            Err(e) => {
                // The gate is advisory; a failed check still collects.
                tracing::warn!(kind = e.kind(), error = %e, "completion check failed");
            }
        }

        let deadline = Instant::now() + self.fetch_deadline;
        let results = fetch_all_images(Arc::clone(&self.images), &self.sources, deadline).await;

        for (name, url) in &results {
            tracing::info!(source = %name, url = %url, "collected");
        }
        let found = results.values().filter(|u| !u.is_empty()).count();
        gauge!("lunch_images_found").set(found as f64);

        if !any_found(&results) {
            tracing::error!("no image found");
            return RunOutcome::NoImages(results);
        }

        match self.uploader.upload_image(&results).await {
            Ok(()) => {
                tracing::info!(found, "images uploaded");
                RunOutcome::Uploaded(results)
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "image upload failed");
                RunOutcome::UploadFailed(results)
            }
        }
    }
}
