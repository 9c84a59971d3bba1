//! Live-status fetcher: one batch call, normalized into a snapshot.
//!
//! A failed call yields an empty snapshot, which callers read as "no
//! information" and never as "everyone went offline".

use std::future::Future;

use streamer_client::{ClientError, StreamerApiClient, StreamerRecord};
use watch_db::{EntityId, LiveSnapshot, LiveStatus, Platform};

/// Remote streamer lookups used by the sync engine and search.
pub trait StreamerSource: Send + Sync {
    fn fetch_streamers(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<StreamerRecord>, ClientError>> + Send;

    fn search_streamers(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<StreamerRecord>, ClientError>> + Send;
}

impl StreamerSource for StreamerApiClient {
    fn fetch_streamers(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<StreamerRecord>, ClientError>> + Send {
        self.get_streamers_by_ids(ids)
    }

    fn search_streamers(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<StreamerRecord>, ClientError>> + Send {
        StreamerApiClient::search_streamers(self, query)
    }
}

pub async fn fetch_live_status<S: StreamerSource>(source: &S, ids: &[EntityId]) -> LiveSnapshot {
    if ids.is_empty() {
        return LiveSnapshot::new();
    }
    let query: Vec<String> = ids.iter().map(ToString::to_string).collect();
    match source.fetch_streamers(&query).await {
        Ok(records) => normalize(records),
        Err(e) => {
            tracing::debug!(count = ids.len(), "Live status fetch failed: {e}");
            LiveSnapshot::new()
        }
    }
}

pub fn normalize(records: Vec<StreamerRecord>) -> LiveSnapshot {
    records
        .into_iter()
        .filter_map(|record| {
            let id = entity_id_of(&record)?;
            let status = LiveStatus {
                is_live: record.is_live,
                broad_title: record.broad_title,
                thumbnail_url: record.thumbnail_url,
                current_viewers: record.current_viewers,
                user_nick: record.user_nick,
            };
            Some((id, status))
        })
        .collect()
}

/// Map an API record back to the identifier it was requested under.
pub fn entity_id_of(record: &StreamerRecord) -> Option<EntityId> {
    let Some(platform) = Platform::from_api_name(&record.platform) else {
        tracing::debug!(platform = %record.platform, "Skipping record from unknown platform");
        return None;
    };
    match EntityId::new(platform, &record.streamer_id) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::debug!(streamer_id = %record.streamer_id, "Skipping record: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{CannedSource, id, record};

    #[tokio::test]
    async fn empty_input_skips_the_source() {
        let source = CannedSource::with(vec![record("soop", "abc", true, None)]);
        assert!(fetch_live_status(&source, &[]).await.is_empty());
        assert_eq!(source.request_count(), 0);
    }

    #[tokio::test]
    async fn failure_yields_empty_snapshot() {
        let source = CannedSource::failing();
        assert!(fetch_live_status(&source, &[id("s:abc")]).await.is_empty());
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn one_request_per_batch_with_prefixed_ids() {
        let source = CannedSource::with(vec![
            record("soop", "abc", true, Some("hello")),
            record("chzzk", "0123456789abcdef0123456789abcdef", false, None),
        ]);
        let snapshot = fetch_live_status(
            &source,
            &[id("s:abc"), id("c:0123456789abcdef0123456789abcdef")],
        )
        .await;

        assert_eq!(source.request_count(), 1);
        assert_eq!(
            source.requests.lock().unwrap()[0],
            vec!["s:abc".to_string(), "c:0123456789abcdef0123456789abcdef".to_string()]
        );
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[&id("s:abc")].is_live);
        assert_eq!(snapshot[&id("s:abc")].broad_title.as_deref(), Some("hello"));
    }

    #[test]
    fn normalize_drops_unknown_platforms() {
        let snapshot = normalize(vec![
            record("twitch", "abc", true, None),
            record("soop", "", true, None),
            record("soop", "ok", true, None),
        ]);
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec![&id("s:ok")]);
    }
}
