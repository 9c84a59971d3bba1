//! Notification dispatcher: turns transitions into native notifications and
//! history entries.

use watch_db::{
    EntityId, EntityMeta, LiveStatus, MetaMap, NotificationEntry, NotificationHistory,
    UserSettings,
};

use super::reconciler::Transition;
use crate::host::{ExtensionHost, NativeNotification};
use crate::store::Store;

const ICON_URL: &str = "icon128.png";
const PRIORITY_HIGH: u8 = 2;

/// Nickname, else the API nickname, else the identifier.
pub fn display_name(id: &EntityId, meta: Option<&EntityMeta>, status: &LiveStatus) -> String {
    meta.and_then(|m| m.nick.as_deref())
        .filter(|n| !n.trim().is_empty())
        .or(status.user_nick.as_deref().filter(|n| !n.trim().is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}

pub fn message_for(id: &EntityId, status: &LiveStatus) -> String {
    match status.broad_title.as_deref() {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => format!("Started streaming on {}.", id.platform().display_name()),
    }
}

pub fn compose(id: &EntityId, name: &str, message: &str) -> NativeNotification {
    NativeNotification {
        tag: id.notification_tag(),
        title: format!("{name} is live!"),
        message: message.to_string(),
        icon_url: ICON_URL.to_string(),
        priority: PRIORITY_HIGH,
    }
}

/// Notify for every eligible transition and prepend one history entry each.
/// Returns how many notifications went out.
pub fn dispatch(
    host: &dyn ExtensionHost,
    settings: &UserSettings,
    meta: &MetaMap,
    history: &mut NotificationHistory,
    transitions: &[Transition],
    now_ms: i64,
) -> usize {
    if !settings.notification {
        return 0;
    }

    let mut sent = 0;
    for Transition { entity_id, status } in transitions {
        let entity_meta = meta.get(entity_id);
        if entity_meta.is_some_and(|m| !m.notifications_allowed()) {
            tracing::debug!(%entity_id, "Notification muted for entity");
            continue;
        }
        let name = display_name(entity_id, entity_meta, status);
        let message = message_for(entity_id, status);
        host.create_notification(compose(entity_id, &name, &message));
        history.prepend(NotificationEntry::new(entity_id.clone(), name, message, now_ms));
        sent += 1;
    }
    if sent > 0 {
        tracing::info!("Sent {sent} live notification(s)");
    }
    sent
}

/// Click on a native notification: mark the newest matching history entry
/// read, open the watch page and dismiss the notification.
///
/// Unknown tags are ignored. A missing history entry is not an error.
pub fn handle_click(store: &Store, host: &dyn ExtensionHost, tag: &str) -> Result<bool, watch_db::DbError> {
    let Some(id) = EntityId::from_notification_tag(tag) else {
        tracing::debug!(tag, "Ignoring click on foreign notification");
        return Ok(false);
    };

    let mut history = store.notification_history()?;
    if history.mark_latest_read_for(&id) {
        store.set_notification_history(&history)?;
    }
    host.open_tab(&id.watch_url());
    host.clear_notification(tag);
    Ok(true)
}
