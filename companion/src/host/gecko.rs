//! Gecko target: cookies get a `firstPartyDomain`, with an unscoped fallback
//! for builds where first-party isolation is unavailable.

use super::{Cookie, CookieScoping, CookieSetPlan, CookieSetRequest};

pub struct FirstPartyScoping;

impl CookieScoping for FirstPartyScoping {
    const TARGET: &'static str = "gecko";

    fn plan(cookie: &Cookie, url: &str, top_level_site: &str) -> Option<CookieSetPlan> {
        if cookie
            .first_party_domain
            .as_deref()
            .is_some_and(|d| !d.is_empty())
        {
            return None;
        }

        let fallback = CookieSetRequest::cross_site_copy(cookie, url);
        let mut attempts = Vec::with_capacity(2);
        match url::Url::parse(top_level_site)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
        {
            Some(host) => {
                let mut scoped = fallback.clone();
                scoped.first_party_domain = Some(host);
                attempts.push(scoped);
            }
            None => tracing::debug!(top_level_site, "Cannot derive first-party domain"),
        }
        attempts.push(fallback);
        Some(CookieSetPlan { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::cookies::sample_cookie;

    #[test]
    fn scoped_attempt_then_fallback() {
        let cookie = sample_cookie("NID_AUT", ".naver.com");
        let plan =
            FirstPartyScoping::plan(&cookie, "https://nid.naver.com/", "http://localhost:50001")
                .unwrap();
        assert_eq!(plan.attempts.len(), 2);
        assert_eq!(plan.attempts[0].first_party_domain.as_deref(), Some("localhost"));
        assert_eq!(plan.attempts[1].first_party_domain, None);
        assert!(plan.attempts.iter().all(|a| a.partition_key.is_none()));
    }

    #[test]
    fn skips_cookie_with_first_party_domain() {
        let mut cookie = sample_cookie("NID_AUT", ".naver.com");
        cookie.first_party_domain = Some("mul.live".into());
        assert!(FirstPartyScoping::plan(&cookie, "https://x/", "https://mul.live").is_none());

        cookie.first_party_domain = Some(String::new());
        assert!(FirstPartyScoping::plan(&cookie, "https://x/", "https://mul.live").is_some());
    }
}
