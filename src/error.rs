//! Error types for the backend calls.
//!
//! None of these ever escape the controller: a failed request is logged,
//! shown in the status bar, and otherwise only means "no new data".

use reqwest::StatusCode;

/// A request to the backend that produced no usable payload.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure, timeout, or an undecodable body.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
}

/// Why a summary response did not yield trends.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    /// The backend flagged an error or has not generated a summary yet.
    #[error("no trend summary available")]
    Unavailable,

    /// The embedded trend document is not valid JSON.
    #[error("malformed trend summary: {0}")]
    Malformed(#[from] serde_json::Error),
}
