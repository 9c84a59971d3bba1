//! Bounded log of live notifications, newest first.

use serde::{Deserialize, Serialize};

use crate::models::EntityId;

pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub id: String,
    #[serde(rename = "streamerId")]
    pub entity_id: EntityId,
    #[serde(rename = "streamerName")]
    pub display_name: String,
    pub title: String,
    pub timestamp: i64,
    #[serde(default)]
    pub read: bool,
}

impl NotificationEntry {
    pub fn new(entity_id: EntityId, display_name: String, title: String, timestamp: i64) -> Self {
        Self {
            id: format!("{entity_id}-{timestamp}"),
            entity_id,
            display_name,
            title,
            timestamp,
            read: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHistory {
    entries: Vec<NotificationEntry>,
}

impl NotificationHistory {
    pub fn entries(&self) -> &[NotificationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.read).count()
    }

    /// Insert at the front; entries past [`MAX_HISTORY`] fall off the back.
    pub fn prepend(&mut self, entry: NotificationEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY);
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.read = true;
                true
            }
            None => false,
        }
    }

    /// Mark the newest entry for `entity` read. Returns false when none exists.
    pub fn mark_latest_read_for(&mut self, entity: &EntityId) -> bool {
        match self.entries.iter_mut().find(|e| &e.entity_id == entity) {
            Some(entry) => {
                entry.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for entry in self.entries.iter_mut().filter(|e| !e.read) {
            entry.read = true;
            changed += 1;
        }
        changed
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
