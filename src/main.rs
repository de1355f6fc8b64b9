//! Lunch menu collector — Binary Entrypoint
//! Runs the check → fetch → upload pipeline once and exits.

use std::process::ExitCode;

use lunch_menu_collector::{clock::DEFAULT_TIMEZONE, telemetry, AppConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    let cfg = match AppConfig::load_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            telemetry::init_tracing(DEFAULT_TIMEZONE);
            tracing::error!(error = ?e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init_tracing(cfg.tz().unwrap_or(DEFAULT_TIMEZONE));

    match lunch_menu_collector::run_once(&cfg).await {
        Ok(outcome) => {
            tracing::info!(outcome = outcome.label(), "run finished");
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            tracing::error!(error = ?e, "startup failed");
            ExitCode::FAILURE
        }
    }
}
