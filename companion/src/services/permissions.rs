//! Host-permission gate. Polling and cookie repair wait until every
//! required origin is granted.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::host::ExtensionHost;

pub const REQUIRED_ORIGINS: &[&str] = &[
    "*://*.mul.live/*",
    "*://*.bngts.com/*",
    "*://*.naver.com/*",
    "*://*.chzzk.naver.com/*",
    "*://*.sooplive.co.kr/*",
    "*://localhost:50001/*",
];

pub fn missing_origins(granted: &[String]) -> Vec<&'static str> {
    REQUIRED_ORIGINS
        .iter()
        .copied()
        .filter(|o| !granted.iter().any(|g| g == o))
        .collect()
}

/// Not granted until the shim reports otherwise.
#[derive(Debug, Default)]
pub struct PermissionGate {
    granted: AtomicBool,
}

impl PermissionGate {
    pub fn is_granted(&self) -> bool {
        self.granted.load(Ordering::Acquire)
    }

    /// Returns true when the state changed.
    pub fn set(&self, granted: bool) -> bool {
        self.granted.swap(granted, Ordering::AcqRel) != granted
    }
}

/// Record the reported origins; when something is missing, send the user
/// to the grant screen. Returns whether everything is granted.
pub fn check(
    gate: &PermissionGate,
    host: &dyn ExtensionHost,
    granted_origins: &[String],
    permission_page_url: &str,
) -> bool {
    let missing = missing_origins(granted_origins);
    let granted = missing.is_empty();
    if gate.set(granted) {
        tracing::info!(granted, "Host permission state changed");
    }
    if !granted {
        tracing::info!(?missing, "Host permissions missing; opening grant page");
        host.open_tab(permission_page_url);
    }
    granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RecordingHost;

    fn all_origins() -> Vec<String> {
        REQUIRED_ORIGINS.iter().map(|o| o.to_string()).collect()
    }

    #[test]
    fn starts_closed() {
        assert!(!PermissionGate::default().is_granted());
    }

    #[test]
    fn missing_origin_opens_grant_page() {
        let gate = PermissionGate::default();
        let host = RecordingHost::default();
        let mut origins = all_origins();
        origins.retain(|o| o != "*://*.naver.com/*");

        assert!(!check(&gate, &host, &origins, "permission.html"));
        assert!(!gate.is_granted());
        assert_eq!(host.opened_tabs(), vec!["permission.html"]);
    }

    #[test]
    fn full_grant_opens_gate_quietly() {
        let gate = PermissionGate::default();
        let host = RecordingHost::default();
        assert!(check(&gate, &host, &all_origins(), "permission.html"));
        assert!(gate.is_granted());
        assert!(host.commands().is_empty());
        assert!(!gate.set(true));
    }
}
