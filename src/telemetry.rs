// src/telemetry.rs
use chrono::Utc;
use chrono_tz::Tz;
use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
const DEFAULT_FILTER: &str = "lunch_menu_collector=info,warn";

/// One-time metrics registration (so series carry descriptions when a recorder is installed).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "lunch_feed_fetch_total",
            "Feed fetch outcomes, labeled by result."
        );
        describe_counter!(
            "lunch_runs_total",
            "Pipeline runs, labeled by outcome."
        );
        describe_gauge!(
            "lunch_images_found",
            "Number of sources with an image in the last run."
        );
    });
}

/// Log timestamps rendered in the reference zone of the lunch spots.
#[derive(Debug, Clone, Copy)]
pub struct ZonedTimer {
    tz: Tz,
}

impl ZonedTimer {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl FormatTime for ZonedTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            Utc::now()
                .with_timezone(&self.tz)
                .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// Install the global subscriber. `RUST_LOG` controls the filter,
/// `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing(tz: Tz) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var(ENV_LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry
            .with(fmt::layer().json().with_timer(ZonedTimer::new(tz)))
            .try_init()
    } else {
        registry
            .with(fmt::layer().compact().with_timer(ZonedTimer::new(tz)))
            .try_init()
    };
    if let Err(e) = res {
        eprintln!("tracing already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoned_timer_writes_offset() {
        let mut s = String::new();
        ZonedTimer::new(chrono_tz::Asia::Seoul)
            .format_time(&mut Writer::new(&mut s))
            .unwrap();
        assert!(s.ends_with("+09:00"), "got {s}");
    }
}
