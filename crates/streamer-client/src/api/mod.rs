//! Streamer REST API client.

mod request;
mod streamers;

pub mod models;

use crate::ClientError;

pub const DEFAULT_API_BASE: &str = "https://bngts.com/api";

/// Maximum ids per live-status batch.
pub const BATCH_LIMIT: usize = 50;

/// Maximum results per search.
pub const SEARCH_LIMIT: usize = 10;

/// Streamer API client bound to one base URL.
#[derive(Clone)]
pub struct StreamerApiClient {
    pub(super) http: reqwest::Client,
    pub(super) base_url: url::Url,
}

impl StreamerApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        // A trailing slash keeps `join` from dropping the last path segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        Ok(Self {
            http,
            base_url: url::Url::parse(&normalized)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }
}
