//! Browser-side primitives the companion drives.
//!
//! Everything the extension platform does for us (notifications, tabs, the
//! action badge, cookie writes) goes through [`ExtensionHost`]. The only
//! behavior that differs between browser targets is how a cookie gets a
//! first-party scope; that is the [`CookieScoping`] adapter, chosen at build
//! time through the `gecko` feature.

pub mod bridge;
pub mod chromium;
pub mod cookies;
pub mod gecko;
#[cfg(test)]
pub mod testing;

use serde::Serialize;

pub use bridge::BridgeHost;
pub use cookies::{Cookie, CookieChange, CookieSetPlan, CookieSetRequest, PartitionKey};

#[cfg(not(feature = "gecko"))]
pub type TargetScoping = chromium::PartitionKeyScoping;
#[cfg(feature = "gecko")]
pub type TargetScoping = gecko::FirstPartyScoping;

/// Native notification payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeNotification {
    /// Same tag replaces rather than stacks.
    pub tag: String,
    pub title: String,
    pub message: String,
    pub icon_url: String,
    pub priority: u8,
}

/// What the toolbar badge shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub text: String,
    pub color: String,
}

/// One call into the browser, as executed by the extension shim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum HostCommand {
    CreateNotification(NativeNotification),
    ClearNotification { tag: String },
    OpenTab { url: String },
    SetBadge(Badge),
    SetCookie(CookieSetPlan),
}

pub trait ExtensionHost: Send + Sync {
    fn execute(&self, command: HostCommand);

    fn create_notification(&self, notification: NativeNotification) {
        self.execute(HostCommand::CreateNotification(notification));
    }

    fn clear_notification(&self, tag: &str) {
        self.execute(HostCommand::ClearNotification {
            tag: tag.to_string(),
        });
    }

    fn open_tab(&self, url: &str) {
        self.execute(HostCommand::OpenTab {
            url: url.to_string(),
        });
    }

    fn set_badge(&self, badge: Badge) {
        self.execute(HostCommand::SetBadge(badge));
    }

    fn set_cookie(&self, plan: CookieSetPlan) {
        self.execute(HostCommand::SetCookie(plan));
    }

    /// An extension shim attached and can execute commands.
    fn shim_connected(&self) {}

    fn shim_disconnected(&self) {}
}

/// Per-target rule for re-setting an auth cookie with a first-party scope.
pub trait CookieScoping {
    const TARGET: &'static str;

    /// `None` when the cookie already carries a scope.
    fn plan(cookie: &Cookie, url: &str, top_level_site: &str) -> Option<CookieSetPlan>;
}
