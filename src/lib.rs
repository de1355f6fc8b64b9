// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod clock;
pub mod config;
pub mod error;
pub mod fanout;
pub mod feed;
pub mod pipeline;
pub mod report;
pub mod sources;
pub mod status;
pub mod telemetry;
pub mod transport;

// ---- Re-exports for stable public API ----
pub use crate::config::AppConfig;
pub use crate::error::FetchError;
pub use crate::fanout::{fetch_all_images, ResultMap};
pub use crate::feed::{types::ImageSource, FeedClient};
pub use crate::pipeline::{Pipeline, RunOutcome};
pub use crate::report::ReportUploader;
pub use crate::sources::{MediaPick, Source, SourceSet};
pub use crate::status::CompletionChecker;
pub use crate::transport::Transport;

use tracing::info;

/// Load configuration, build the shared transport and run the pipeline once.
///
/// Call after tracing is initialized; errors here are startup failures,
/// per-run failures are reported through the returned `RunOutcome`.
pub async fn run_once(cfg: &AppConfig) -> anyhow::Result<RunOutcome> {
    let transport = Transport::new(&cfg.http)?;
    let pipeline = Pipeline::from_config(cfg, transport)?;
    info!(sources = cfg.sources.len(), tz = %cfg.timezone, "lunch menu run starting");
    Ok(pipeline.run().await)
}
