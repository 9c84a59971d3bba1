//! Badge presenter.

use watch_db::LiveSnapshot;

use crate::host::{Badge, ExtensionHost};

pub const ACCENT_COLOR: &str = "#f59e0b";
pub const NEUTRAL_COLOR: &str = "#737373";

pub fn live_count(snapshot: &LiveSnapshot) -> usize {
    snapshot.values().filter(|s| s.is_live).count()
}

pub fn badge_for(count: usize) -> Badge {
    if count == 0 {
        Badge {
            text: String::new(),
            color: NEUTRAL_COLOR.to_string(),
        }
    } else {
        Badge {
            text: count.to_string(),
            color: ACCENT_COLOR.to_string(),
        }
    }
}

/// Repaint from a snapshot. Returns the live count.
pub fn paint(host: &dyn ExtensionHost, snapshot: &LiveSnapshot) -> usize {
    let count = live_count(snapshot);
    host.set_badge(badge_for(count));
    count
}
