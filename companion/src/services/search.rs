//! Streamer search for the add dialog.

use serde::Serialize;
use watch_db::{EntityId, WatchList};

use super::fetcher::{StreamerSource, entity_id_of};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: EntityId,
    pub user_nick: Option<String>,
    pub profile_image: Option<String>,
    pub is_live: bool,
    pub watched: bool,
}

/// Empty queries and failed calls both give an empty list.
pub async fn search<S: StreamerSource>(source: &S, list: &WatchList, query: &str) -> Vec<SearchHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let records = match source.search_streamers(query).await {
        Ok(records) => records,
        Err(e) => {
            tracing::debug!(query, "Streamer search failed: {e}");
            return Vec::new();
        }
    };
    records
        .into_iter()
        .filter_map(|record| {
            let id = entity_id_of(&record)?;
            Some(SearchHit {
                watched: list.contains(&id),
                id,
                user_nick: record.user_nick,
                profile_image: record.profile_image,
                is_live: record.is_live,
            })
        })
        .collect()
}
