//! Notification history management.

use serde::Serialize;
use watch_db::NotificationHistory;

use super::ServiceError;
use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub unread: usize,
    pub entries: NotificationHistory,
}

pub fn view(store: &Store) -> Result<HistoryView, ServiceError> {
    let entries = store.notification_history()?;
    Ok(HistoryView {
        unread: entries.unread_count(),
        entries,
    })
}

pub fn mark_read(store: &Store, id: &str) -> Result<(), ServiceError> {
    let mut history = store.notification_history()?;
    if !history.mark_read(id) {
        return Err(ServiceError::NotificationNotFound(id.to_string()));
    }
    store.set_notification_history(&history)?;
    Ok(())
}

pub fn mark_all_read(store: &Store) -> Result<usize, ServiceError> {
    let mut history = store.notification_history()?;
    let changed = history.mark_all_read();
    if changed > 0 {
        store.set_notification_history(&history)?;
    }
    Ok(changed)
}

pub fn delete(store: &Store, id: &str) -> Result<(), ServiceError> {
    let mut history = store.notification_history()?;
    if !history.remove(id) {
        return Err(ServiceError::NotificationNotFound(id.to_string()));
    }
    store.set_notification_history(&history)?;
    Ok(())
}

pub fn clear(store: &Store) -> Result<(), ServiceError> {
    store.set_notification_history(&NotificationHistory::default())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{id, store};
    use watch_db::{MAX_HISTORY, NotificationEntry};

    fn seed(store: &Store, count: i64) {
        let mut history = NotificationHistory::default();
        for ts in 0..count {
            history.prepend(NotificationEntry::new(id("s:a"), "a".into(), "t".into(), ts));
        }
        store.set_notification_history(&history).unwrap();
    }

    #[test]
    fn history_is_capped_and_evicts_oldest() {
        let store = store();
        seed(&store, MAX_HISTORY as i64 + 1);
        let view = view(&store).unwrap();
        assert_eq!(view.entries.len(), MAX_HISTORY);
        assert_eq!(view.entries.entries()[0].timestamp, MAX_HISTORY as i64);
        assert!(view.entries.entries().iter().all(|e| e.timestamp != 0));
    }

    #[test]
    fn read_delete_clear() {
        let store = store();
        seed(&store, 3);
        assert_eq!(view(&store).unwrap().unread, 3);

        mark_read(&store, "s:a-1").unwrap();
        assert_eq!(view(&store).unwrap().unread, 2);
        assert_eq!(mark_all_read(&store).unwrap(), 2);
        assert_eq!(mark_all_read(&store).unwrap(), 0);

        delete(&store, "s:a-0").unwrap();
        assert_eq!(view(&store).unwrap().entries.len(), 2);
        assert!(matches!(
            delete(&store, "s:a-0"),
            Err(ServiceError::NotificationNotFound(_))
        ));
        assert!(mark_read(&store, "missing").is_err());

        clear(&store).unwrap();
        assert!(view(&store).unwrap().entries.is_empty());
    }
}
