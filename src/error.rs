// src/error.rs
use thiserror::Error;

/// Failure of a single remote call (status check, feed fetch or report upload).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("could not build request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("feed returned no posts")]
    EmptyFeed,

    #[error("no image post since the day boundary")]
    NoImageToday,

    #[error("no media selection rule for source key `{0}`")]
    UnknownSource(String),

    #[error("deadline elapsed before the request finished")]
    DeadlineExceeded,
}

impl FetchError {
    /// Short label used as a metrics tag and in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Request(_) => "request",
            FetchError::UnexpectedStatus { .. } => "status",
            FetchError::Decode(_) => "decode",
            FetchError::EmptyFeed => "empty_feed",
            FetchError::NoImageToday => "no_image_today",
            FetchError::UnknownSource(_) => "unknown_source",
            FetchError::DeadlineExceeded => "deadline",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Network(e)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e)
    }
}
