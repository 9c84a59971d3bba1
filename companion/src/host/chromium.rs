//! Chromium target: cookies get a CHIPS `partitionKey`.

use super::{Cookie, CookieScoping, CookieSetPlan, CookieSetRequest, PartitionKey};

pub struct PartitionKeyScoping;

impl CookieScoping for PartitionKeyScoping {
    const TARGET: &'static str = "chromium";

    fn plan(cookie: &Cookie, url: &str, top_level_site: &str) -> Option<CookieSetPlan> {
        if cookie.partition_key.is_some() {
            return None;
        }
        let mut request = CookieSetRequest::cross_site_copy(cookie, url);
        request.partition_key = Some(PartitionKey {
            top_level_site: top_level_site.to_string(),
        });
        Some(CookieSetPlan {
            attempts: vec![request],
        })
    }
}
