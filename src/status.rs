// src/status.rs
use std::collections::HashMap;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::FetchError;
use crate::transport::Transport;

/// What the status service already holds for today, name → url.
pub type CompletionStatus = HashMap<String, String>;

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    result: Option<CompletionStatus>,
}

/// Gate that prevents collecting and reporting a day twice.
#[derive(Clone)]
pub struct CompletionChecker {
    transport: Transport,
    status_url: String,
}

impl CompletionChecker {
    pub fn new(transport: Transport, status_url: impl Into<String>) -> Self {
        Self {
            transport,
            status_url: status_url.into(),
        }
    }

    /// Fetch today's completion status once.
    pub async fn fetch_status(&self) -> Result<CompletionStatus, FetchError> {
        let req = self
            .transport
            .client()
            .get(&self.status_url)
            .query(&[("check", "true")]);
        let resp = self.transport.send(req).await?;
        let status = resp.status;
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                status,
                url: self.status_url.clone(),
            });
        }
        let parsed: CheckResponse = serde_json::from_slice(&resp.body)?;
        Ok(parsed.result.unwrap_or_default())
    }

    /// `true` only when every expected name already has a non-empty value.
    pub async fn check_work_done<S: AsRef<str>>(
        &self,
        expected_names: &[S],
    ) -> Result<bool, FetchError> {
        let status = self.fetch_status().await?;
        Ok(all_reported(&status, expected_names))
    }
}

pub fn all_reported<S: AsRef<str>>(status: &CompletionStatus, expected_names: &[S]) -> bool {
    expected_names.iter().all(|name| {
        status
            .get(name.as_ref())
            .is_some_and(|url| !url.is_empty())
    })
}
