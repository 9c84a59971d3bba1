//! Re-set tracked auth cookies with a first-party scope for each partner
//! site, so embedded players on those sites stay logged in.
//!
//! Purely additive: cookies are never deleted, and a cookie that already
//! carries a scope is left alone.

use crate::host::{Cookie, CookieChange, CookieScoping, ExtensionHost, TargetScoping};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedCookie {
    pub name: &'static str,
    pub domain: &'static str,
    /// Login URL the cookie is set against.
    pub url: &'static str,
}

const NAVER_LOGIN: &str = "https://nid.naver.com/nidlogin.login";
const SOOP_LOGIN: &str = "https://login.sooplive.co.kr/app/LoginAction.php";

pub const TRACKED_COOKIES: &[TrackedCookie] = &[
    TrackedCookie { name: "NID_AUT", domain: ".naver.com", url: NAVER_LOGIN },
    TrackedCookie { name: "NID_SES", domain: ".naver.com", url: NAVER_LOGIN },
    TrackedCookie { name: "AuthTicket", domain: ".sooplive.co.kr", url: SOOP_LOGIN },
    TrackedCookie { name: "UserTicket", domain: ".sooplive.co.kr", url: SOOP_LOGIN },
    TrackedCookie { name: "isBbs", domain: ".sooplive.co.kr", url: SOOP_LOGIN },
];

pub const PARTNER_SITES: &[&str] = &["https://mul.live", "https://bngts.com", "http://localhost:50001"];

pub fn tracked(cookie: &Cookie) -> Option<&'static TrackedCookie> {
    TRACKED_COOKIES
        .iter()
        .find(|t| t.name == cookie.name && t.domain == cookie.domain)
}

/// Emit one set-plan per partner site. Returns how many were emitted.
pub fn repair_cookie<S: CookieScoping>(
    host: &dyn ExtensionHost,
    cookie: &Cookie,
    tracked: &TrackedCookie,
) -> usize {
    let mut emitted = 0;
    for site in PARTNER_SITES {
        if let Some(plan) = S::plan(cookie, tracked.url, site) {
            host.set_cookie(plan);
            emitted += 1;
        }
    }
    if emitted > 0 {
        tracing::debug!(cookie = tracked.name, target = S::TARGET, "Cookie scoped for {emitted} site(s)");
    }
    emitted
}

/// `cookies.onChanged`: removals and untracked cookies are ignored.
pub fn handle_cookie_change(host: &dyn ExtensionHost, change: &CookieChange) -> usize {
    if change.removed {
        return 0;
    }
    match tracked(&change.cookie) {
        Some(t) => repair_cookie::<TargetScoping>(host, &change.cookie, t),
        None => 0,
    }
}

/// Install/startup pass over the cookies the shim found.
pub fn repair_all(host: &dyn ExtensionHost, cookies: &[Cookie]) -> usize {
    let repaired: usize = cookies
        .iter()
        .filter_map(|c| tracked(c).map(|t| repair_cookie::<TargetScoping>(host, c, t)))
        .sum();
    if repaired > 0 {
        tracing::info!("Cookie repair: {repaired} cookie write(s) requested");
    }
    repaired
}
