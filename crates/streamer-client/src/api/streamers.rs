use url::form_urlencoded::byte_serialize;

use super::*;
use models::{ApiResponse, StreamerRecord};

impl StreamerApiClient {
    /// Live status for a batch of `<prefix>:<raw-id>` ids (at most [`BATCH_LIMIT`]).
    pub async fn get_streamers_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<StreamerRecord>, ClientError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.streamers_url(&build_ids_query(ids))?;
        let resp: ApiResponse<serde_json::Value> = self.get_json(&url).await?;
        Ok(decode_records(resp.data))
    }

    /// Autocomplete search by nickname or id.
    pub async fn search_streamers(&self, query: &str) -> Result<Vec<StreamerRecord>, ClientError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.streamers_url(&build_search_query(query))?;
        let resp: ApiResponse<serde_json::Value> = self.get_json(&url).await?;
        Ok(decode_records(resp.data))
    }

    fn streamers_url(&self, query: &str) -> Result<String, ClientError> {
        let mut url = self.base_url.join("streamers")?;
        url.set_query(Some(query));
        Ok(url.to_string())
    }
}

/// Decode each element on its own; a malformed one is skipped, not fatal.
pub(super) fn decode_records(items: Vec<serde_json::Value>) -> Vec<StreamerRecord> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<StreamerRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping malformed streamer record: {}", e);
                None
            }
        })
        .collect()
}

fn encode(component: &str) -> String {
    byte_serialize(component.as_bytes()).collect()
}

pub(super) fn build_ids_query(ids: &[String]) -> String {
    let joined = ids
        .iter()
        .take(BATCH_LIMIT)
        .map(|id| encode(id))
        .collect::<Vec<_>>()
        .join(",");
    format!("ids={joined}&limit={BATCH_LIMIT}")
}

pub(super) fn build_search_query(query: &str) -> String {
    format!("search={}&limit={SEARCH_LIMIT}", encode(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_query_encodes_each_id_and_keeps_commas() {
        let ids = vec!["s:abc".to_string(), "c:0f0f".to_string()];
        assert_eq!(build_ids_query(&ids), "ids=s%3Aabc,c%3A0f0f&limit=50");
    }

    #[test]
    fn ids_query_caps_batch() {
        let ids = (1..=60).map(|i| format!("s:u{i}")).collect::<Vec<_>>();
        let query = build_ids_query(&ids);
        assert!(query.contains("s%3Au49,s%3Au50&limit=50"));
        assert!(!query.contains("s%3Au51"));
        assert_eq!(query.matches(',').count(), 49);
    }

    #[test]
    fn search_query_encodes_user_text() {
        assert_eq!(build_search_query("감스트 a"), format!("search={}&limit=10", encode("감스트 a")));
        assert!(build_search_query("a&b").starts_with("search=a%26b&"));
    }

    #[test]
    fn streamers_url_keeps_api_path() {
        let client = StreamerApiClient::new("https://bngts.com/api").unwrap();
        let url = client.streamers_url("ids=s%3Aa&limit=50").unwrap();
        assert_eq!(url, "https://bngts.com/api/streamers?ids=s%3Aa&limit=50");

        let client = StreamerApiClient::new("https://bngts.com/api/").unwrap();
        assert_eq!(client.base_url(), "https://bngts.com/api/");
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let body = r#"{
          "data": [{
            "platform": "soop",
            "streamer_id": "abc",
            "is_live": true,
            "broad_title": "hello",
            "current_viewers": 12
          }, {
            "platform": "chzzk",
            "streamer_id": "0f0f"
          }]
        }"#;

        let parsed: ApiResponse<StreamerRecord> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].current_viewers, Some(12));
        assert!(!parsed.data[1].is_live);
        assert_eq!(parsed.data[1].user_nick, None);
    }

    #[test]
    fn mixed_batch_keeps_every_usable_record() {
        let body = r#"{
          "data": [
            {"platform": "soop", "streamer_id": "a", "is_live": true},
            {"platform": "soop", "streamer_id": "b", "is_live": null},
            {"platform": "chzzk", "streamer_id": "c", "is_live": "true"},
            {"platform": "soop"}
          ]
        }"#;

        let parsed: ApiResponse<serde_json::Value> = serde_json::from_str(body).unwrap();
        let records = decode_records(parsed.data);
        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.streamer_id.as_str(), r.is_live))
            .collect();
        assert_eq!(summary, vec![("a", true), ("b", false), ("c", false)]);
    }

    #[test]
    fn response_without_data_is_empty() {
        let parsed: ApiResponse<StreamerRecord> = serde_json::from_str("{}").unwrap();
        assert!(parsed.data.is_empty());
    }

    #[tokio::test]
    async fn empty_inputs_skip_the_network() {
        // Unroutable base: any request would fail.
        let client = StreamerApiClient::new("http://127.0.0.1:9/api").unwrap();
        assert!(client.get_streamers_by_ids(&[]).await.unwrap().is_empty());
        assert!(client.search_streamers("   ").await.unwrap().is_empty());
    }
}
