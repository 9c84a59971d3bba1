//! Install/startup handling reported by the extension shim.

use serde::{Deserialize, Serialize};

use super::cookie_repair;
use super::permissions::{self, PermissionGate};
use crate::host::{Cookie, ExtensionHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleReason {
    Installed,
    Startup,
    /// Permissions were added or removed while running.
    PermissionsChanged,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleReport {
    pub reason: LifecycleReason,
    /// Origins currently granted to the extension.
    #[serde(default)]
    pub origins: Vec<String>,
    /// Current values of the tracked cookies the shim could read.
    #[serde(default)]
    pub cookies: Vec<Cookie>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleOutcome {
    pub granted: bool,
    pub cookie_writes: usize,
    /// Whether the caller should run a poll cycle now.
    pub poll: bool,
}

pub fn on_report(
    gate: &PermissionGate,
    host: &dyn ExtensionHost,
    permission_page_url: &str,
    report: &LifecycleReport,
) -> LifecycleOutcome {
    tracing::info!(reason = ?report.reason, "Lifecycle event");
    let granted = permissions::check(gate, host, &report.origins, permission_page_url);
    if !granted {
        return LifecycleOutcome {
            granted,
            cookie_writes: 0,
            poll: false,
        };
    }
    LifecycleOutcome {
        granted,
        cookie_writes: cookie_repair::repair_all(host, &report.cookies),
        poll: report.reason != LifecycleReason::PermissionsChanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::cookies::sample_cookie;
    use crate::host::testing::RecordingHost;
    use crate::services::permissions::REQUIRED_ORIGINS;

    fn report(reason: LifecycleReason, granted: bool) -> LifecycleReport {
        LifecycleReport {
            reason,
            origins: if granted {
                REQUIRED_ORIGINS.iter().map(|o| o.to_string()).collect()
            } else {
                Vec::new()
            },
            cookies: vec![sample_cookie("NID_AUT", ".naver.com")],
        }
    }

    #[test]
    fn startup_without_permission_skips_repair_and_poll() {
        let gate = PermissionGate::default();
        let host = RecordingHost::default();
        let outcome = on_report(&gate, &host, "permission.html", &report(LifecycleReason::Startup, false));
        assert_eq!(
            outcome,
            LifecycleOutcome {
                granted: false,
                cookie_writes: 0,
                poll: false
            }
        );
        assert!(host.cookie_plans().is_empty());
        assert_eq!(host.opened_tabs(), vec!["permission.html"]);
    }

    #[test]
    fn install_with_permission_repairs_and_polls() {
        let gate = PermissionGate::default();
        let host = RecordingHost::default();
        let outcome = on_report(&gate, &host, "permission.html", &report(LifecycleReason::Installed, true));
        assert!(outcome.granted);
        assert_eq!(outcome.cookie_writes, 3);
        assert!(outcome.poll);
        assert!(gate.is_granted());
    }

    #[test]
    fn report_decodes_from_shim_json() {
        let report: LifecycleReport =
            serde_json::from_str(r#"{"reason":"permissions_changed","origins":["*://*.mul.live/*"]}"#)
                .unwrap();
        assert_eq!(report.reason, LifecycleReason::PermissionsChanged);
        assert!(report.cookies.is_empty());
    }
}
