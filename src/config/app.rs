// src/config/app.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::clock::{DayBoundary, DAY_OFFSET_RANGE};
use crate::sources::{media_pick_for, SourceSet};

pub const ENV_CONFIG_PATH: &str = "LUNCH_CONFIG_PATH";
pub const ENV_STATUS_URL: &str = "LUNCH_STATUS_URL";
pub const ENV_REPORT_URL: &str = "LUNCH_REPORT_URL";
pub const ENV_FEED_BASE_URL: &str = "LUNCH_FEED_BASE_URL";
pub const ENV_TIMEZONE: &str = "LUNCH_TIMEZONE";

const DEFAULT_TOML_PATH: &str = "config/lunch.toml";
const DEFAULT_JSON_PATH: &str = "config/lunch.json";

fn default_status_url() -> String {
    "https://lunch.muz.kr".to_string()
}
fn default_report_url() -> String {
    "https://lunch.muz.kr".to_string()
}
fn default_feed_base_url() -> String {
    "https://pf.kakao.com/rocket-web/web/profiles".to_string()
}
fn default_timezone() -> String {
    "Asia/Seoul".to_string()
}
fn default_fetch_deadline_secs() -> u64 {
    15
}

/// Connection pool and timeout settings of the shared transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpSettings {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_idle_per_host: usize,
    pub max_conns_per_host: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
            idle_timeout_secs: 90,
            max_idle_per_host: 10,
            max_conns_per_host: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_status_url")]
    pub status_url: String,
    #[serde(default = "default_report_url")]
    pub report_url: String,
    /// Feed URLs are `<feed_base_url>/<key>/posts`.
    #[serde(default = "default_feed_base_url")]
    pub feed_base_url: String,
    /// IANA zone name used for the day boundary and log timestamps.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// 0 = today's midnight, -1 = yesterday's midnight.
    #[serde(default)]
    pub day_offset: i64,
    /// Overall budget for the concurrent feed fetch.
    #[serde(default = "default_fetch_deadline_secs")]
    pub fetch_deadline_secs: u64,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default = "SourceSet::default_lunch_spots")]
    pub sources: SourceSet,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            status_url: default_status_url(),
            report_url: default_report_url(),
            feed_base_url: default_feed_base_url(),
            timezone: default_timezone(),
            day_offset: 0,
            fetch_deadline_secs: default_fetch_deadline_secs(),
            http: HttpSettings::default(),
            sources: SourceSet::default_lunch_spots(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path. TOML or JSON, chosen by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, &ext)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.finish()
    }

    /// Load using env var + fallbacks:
    /// 1) $LUNCH_CONFIG_PATH
    /// 2) config/lunch.toml
    /// 3) config/lunch.json
    /// 4) built-in defaults
    ///
    /// Endpoint and zone env overrides are applied on top in every case.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Self::default().finish()
    }

    pub fn day_boundary(&self) -> Result<DayBoundary> {
        if !DAY_OFFSET_RANGE.contains(&self.day_offset) {
            bail!("day_offset {} out of range", self.day_offset);
        }
        Ok(DayBoundary::new(self.tz()?, self.day_offset))
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid timezone `{}`: {e}", self.timezone))
    }

    fn finish(mut self) -> Result<Self> {
        self.apply_env_overrides();
        self.validate()?;
        Ok(self)
    }

    fn apply_env_overrides(&mut self) {
        let pick = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        if let Some(v) = pick(ENV_STATUS_URL) {
            self.status_url = v;
        }
        if let Some(v) = pick(ENV_REPORT_URL) {
            self.report_url = v;
        }
        if let Some(v) = pick(ENV_FEED_BASE_URL) {
            self.feed_base_url = v;
        }
        if let Some(v) = pick(ENV_TIMEZONE) {
            self.timezone = v;
        }
    }

    fn validate(&self) -> Result<()> {
        self.tz()?;
        if !DAY_OFFSET_RANGE.contains(&self.day_offset) {
            bail!(
                "day_offset {} outside {}..={}",
                self.day_offset,
                DAY_OFFSET_RANGE.start(),
                DAY_OFFSET_RANGE.end()
            );
        }
        for (label, url) in [
            ("status_url", &self.status_url),
            ("report_url", &self.report_url),
            ("feed_base_url", &self.feed_base_url),
        ] {
            reqwest::Url::parse(url).with_context(|| format!("{label} is not a valid url"))?;
        }
        if self.fetch_deadline_secs == 0 {
            bail!("fetch_deadline_secs must be > 0");
        }
        if self.http.connect_timeout_secs == 0 || self.http.request_timeout_secs == 0 {
            bail!("http timeouts must be > 0");
        }
        if self.sources.is_empty() {
            bail!("at least one source is required");
        }
        if let Some(s) = self.sources.iter().find(|s| media_pick_for(&s.key).is_none()) {
            bail!("source `{}` has no media selection rule for key `{}`", s.name, s.key);
        }
        Ok(())
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<AppConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            if let Ok(v) = serde_json::from_str(s) {
                return Ok(v);
            }
            toml::from_str(s).map_err(|e| anyhow!("unsupported config format: {e}"))
        }
    }
}
