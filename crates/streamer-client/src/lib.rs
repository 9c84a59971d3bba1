//! Client for the multiview streamer API.
//!
//! Provides batch live-status lookup and streamer search. All real
//! aggregation happens server side; this crate only builds requests and
//! decodes the `{data: [...]}` envelope.

pub mod api;

pub use api::StreamerApiClient;
pub use api::models::{ApiResponse, StreamerRecord};

/// Unified error type for the streamer-client crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Streamer API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}
