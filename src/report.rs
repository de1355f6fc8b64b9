// src/report.rs
use reqwest::StatusCode;

use crate::error::FetchError;
use crate::fanout::ResultMap;
use crate::transport::Transport;

/// Posts the collected image URLs to the report service.
#[derive(Clone)]
pub struct ReportUploader {
    transport: Transport,
    report_url: String,
}

impl ReportUploader {
    pub fn new(transport: Transport, report_url: impl Into<String>) -> Self {
        Self {
            transport,
            report_url: report_url.into(),
        }
    }

    /// Send the whole map, empty entries included. Single attempt.
    ///
    /// Callers skip this when every entry is empty.
    pub async fn upload_image(&self, results: &ResultMap) -> Result<(), FetchError> {
        let body = serde_json::to_vec(results)?;
        let req = self
            .transport
            .client()
            .post(&self.report_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        let resp = self.transport.send(req).await?;
        let status = resp.status;
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                status,
                url: self.report_url.clone(),
            });
        }
        Ok(())
    }
}
