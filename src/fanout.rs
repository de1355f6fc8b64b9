//! # Fan-out
//! Fetches every source concurrently and folds the outcomes into one map.
//!
//! Workers never touch the map. Each sends exactly one `(name, outcome)`
//! message; the aggregating loop below is the only writer. The loop ends
//! when every sender is gone, which is the barrier after which the map is
//! complete.

use std::collections::BTreeMap;
use std::sync::Arc;

use metrics::counter;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};

use crate::error::FetchError;
use crate::feed::types::ImageSource;
use crate::sources::SourceSet;
use crate::telemetry::ensure_metrics_described;

/// Logical source name → image URL (`""` when nothing usable was found).
pub type ResultMap = BTreeMap<String, String>;

/// Run one fetch per source and wait for all of them.
///
/// Every name in `sources` gets an entry. Errors, panics and requests still
/// in flight at `deadline` all end up as `""`.
pub async fn fetch_all_images(
    images: Arc<dyn ImageSource>,
    sources: &SourceSet,
    deadline: Instant,
) -> ResultMap {
    ensure_metrics_described();

    let (tx, mut rx) = mpsc::channel::<(String, Result<String, FetchError>)>(sources.len().max(1));
    let mut tasks = JoinSet::new();

    for src in sources.iter() {
        let tx = tx.clone();
        let images = Arc::clone(&images);
        let name = src.name.clone();
        let key = src.key.clone();
        tasks.spawn(async move {
            let outcome = match timeout_at(deadline, images.get_image(&key)).await {
                Ok(res) => res,
                Err(_elapsed) => Err(FetchError::DeadlineExceeded),
            };
            // Capacity covers one message per worker, so this never waits.
            let _ = tx.send((name, outcome)).await;
        });
    }
    drop(tx);

    let mut out: ResultMap = sources
        .iter()
        .map(|s| (s.name.clone(), String::new()))
        .collect();

    while let Some((name, outcome)) = rx.recv().await {
        let url = match outcome {
            Ok(url) => {
                tracing::info!(source = %name, url = %url, "image found");
                counter!("lunch_feed_fetch_total", "result" => "ok").increment(1);
                url
            }
            Err(e) => {
                tracing::warn!(source = %name, kind = e.kind(), error = %e, "no image for source");
                counter!("lunch_feed_fetch_total", "result" => e.kind()).increment(1);
                String::new()
            }
        };
        out.insert(name, url);
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "feed task did not finish");
        }
    }

    out
}

/// `true` when at least one source produced an image.
pub fn any_found(results: &ResultMap) -> bool {
    results.values().any(|u| !u.is_empty())
}
