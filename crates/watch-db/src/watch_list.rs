//! Ordered, bounded list of watched entities.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{EntityId, MetaMap, Platform};

pub const MAX_WATCH_LIST: usize = 50;

/// More enabled SOOP streams than this trips the concurrency warning.
pub const MAX_CONCURRENT_SOOP: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WatchListError {
    #[error("{0} is already on the watch list")]
    Duplicate(EntityId),

    #[error("watch list is full ({0} entries)")]
    Full(usize),

    #[error("{0} is not on the watch list")]
    NotFound(EntityId),

    #[error("new order must contain exactly the current entries")]
    NotAPermutation,
}

/// User-ordered watch list. Order is significant; ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<EntityId>", into = "Vec<EntityId>")]
pub struct WatchList {
    ids: Vec<EntityId>,
}

impl From<Vec<EntityId>> for WatchList {
    fn from(ids: Vec<EntityId>) -> Self {
        let mut seen = HashSet::new();
        let ids = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
        Self { ids }
    }
}

impl From<WatchList> for Vec<EntityId> {
    fn from(list: WatchList) -> Self {
        list.ids
    }
}

impl WatchList {
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }

    pub fn add(&mut self, id: EntityId) -> Result<(), WatchListError> {
        if self.contains(&id) {
            return Err(WatchListError::Duplicate(id));
        }
        if self.ids.len() >= MAX_WATCH_LIST {
            return Err(WatchListError::Full(MAX_WATCH_LIST));
        }
        self.ids.push(id);
        Ok(())
    }

    pub fn remove(&mut self, id: &EntityId) -> Result<(), WatchListError> {
        let pos = self
            .ids
            .iter()
            .position(|x| x == id)
            .ok_or_else(|| WatchListError::NotFound(id.clone()))?;
        self.ids.remove(pos);
        Ok(())
    }

    /// Replace the order verbatim. Rejects anything that would add or drop entries.
    pub fn reorder(&mut self, order: Vec<EntityId>) -> Result<(), WatchListError> {
        if order.len() != self.ids.len() {
            return Err(WatchListError::NotAPermutation);
        }
        let current: HashSet<&EntityId> = self.ids.iter().collect();
        let proposed: HashSet<&EntityId> = order.iter().collect();
        if proposed.len() != order.len() || current != proposed {
            return Err(WatchListError::NotAPermutation);
        }
        self.ids = order;
        Ok(())
    }

    /// Entities not marked disabled, in list order.
    pub fn enabled<'a>(&'a self, meta: &'a MetaMap) -> impl Iterator<Item = &'a EntityId> + 'a {
        self.ids
            .iter()
            .filter(move |id| !meta.get(*id).is_some_and(|m| m.disabled))
    }

    pub fn soop_warning(&self, meta: &MetaMap) -> bool {
        self.enabled(meta)
            .filter(|id| id.platform() == Platform::Soop)
            .count()
            > MAX_CONCURRENT_SOOP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityMeta;

    fn id(s: &str) -> EntityId {
        s.parse().unwrap()
    }

    fn full_list() -> WatchList {
        let ids = (0..MAX_WATCH_LIST)
            .map(|i| id(&format!("s:user{i}")))
            .collect::<Vec<_>>();
        WatchList::from(ids)
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut list = WatchList::default();
        list.add(id("s:abc")).unwrap();
        assert_eq!(
            list.add(id("s:abc")),
            Err(WatchListError::Duplicate(id("s:abc")))
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn add_rejects_51st_entry_without_mutation() {
        let mut list = full_list();
        let before = list.clone();
        assert_eq!(
            list.add(id("c:extra")),
            Err(WatchListError::Full(MAX_WATCH_LIST))
        );
        assert_eq!(list, before);
    }

    #[test]
    fn reorder_requires_permutation() {
        let mut list = WatchList::from(vec![id("s:a"), id("s:b"), id("c:c")]);

        assert_eq!(
            list.reorder(vec![id("s:a"), id("s:b")]),
            Err(WatchListError::NotAPermutation)
        );
        assert_eq!(
            list.reorder(vec![id("s:a"), id("s:a"), id("s:b")]),
            Err(WatchListError::NotAPermutation)
        );
        assert_eq!(
            list.reorder(vec![id("s:a"), id("s:b"), id("s:z")]),
            Err(WatchListError::NotAPermutation)
        );

        list.reorder(vec![id("c:c"), id("s:a"), id("s:b")]).unwrap();
        assert_eq!(list.ids(), &[id("c:c"), id("s:a"), id("s:b")]);
    }

    #[test]
    fn remove_missing_entry_fails() {
        let mut list = WatchList::from(vec![id("s:a")]);
        assert_eq!(
            list.remove(&id("s:b")),
            Err(WatchListError::NotFound(id("s:b")))
        );
        list.remove(&id("s:a")).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn deserialize_drops_duplicate_entries() {
        let list: WatchList = serde_json::from_str(r#"["s:a","c:b","s:a"]"#).unwrap();
        assert_eq!(list.ids(), &[id("s:a"), id("c:b")]);
    }

    #[test]
    fn soop_warning_ignores_disabled_entries() {
        let list = WatchList::from(
            (0..5).map(|i| id(&format!("s:user{i}"))).collect::<Vec<_>>(),
        );
        let mut meta = MetaMap::new();
        assert!(list.soop_warning(&meta));

        meta.insert(
            id("s:user0"),
            EntityMeta {
                disabled: true,
                ..EntityMeta::default()
            },
        );
        assert!(!list.soop_warning(&meta));
        assert_eq!(list.enabled(&meta).count(), 4);
    }
}
