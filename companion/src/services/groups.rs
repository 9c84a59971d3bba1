//! Group management. Groups only reference watched entities.

use watch_db::{EntityId, Group};

use super::ServiceError;
use crate::store::Store;

pub fn list(store: &Store) -> Result<Vec<Group>, ServiceError> {
    Ok(store.groups()?.all().to_vec())
}

pub fn create(store: &Store, name: &str, color: &str) -> Result<Group, ServiceError> {
    let mut groups = store.groups()?;
    let group = groups
        .create(uuid::Uuid::new_v4().to_string(), name, color)?
        .clone();
    store.set_groups(&groups)?;
    tracing::info!(id = %group.id, name = %group.name, "Group created");
    Ok(group)
}

/// Apply an optional rename and an optional recolor together.
pub fn update(
    store: &Store,
    group_id: &str,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<Group, ServiceError> {
    let mut groups = store.groups()?;
    if let Some(name) = name {
        groups.rename(group_id, name)?;
    }
    if let Some(color) = color {
        groups.recolor(group_id, color)?;
    }
    let group = groups.get(group_id)?.clone();
    store.set_groups(&groups)?;
    Ok(group)
}

pub fn delete(store: &Store, group_id: &str) -> Result<(), ServiceError> {
    let mut groups = store.groups()?;
    let removed = groups.delete(group_id)?;
    store.set_groups(&groups)?;
    tracing::info!(id = %removed.id, "Group deleted");
    Ok(())
}

pub fn add_member(store: &Store, group_id: &str, id: &EntityId) -> Result<bool, ServiceError> {
    if !store.watch_list()?.contains(id) {
        return Err(ServiceError::NotWatched(id.clone()));
    }
    let mut groups = store.groups()?;
    let added = groups.add_member(group_id, id.clone())?;
    if added {
        store.set_groups(&groups)?;
    }
    Ok(added)
}

pub fn remove_member(store: &Store, group_id: &str, id: &EntityId) -> Result<bool, ServiceError> {
    let mut groups = store.groups()?;
    let removed = groups.remove_member(group_id, id)?;
    if removed {
        store.set_groups(&groups)?;
    }
    Ok(removed)
}

/// Enable or disable every watched member at once. Returns how many
/// entities were updated.
pub fn set_enabled(store: &Store, group_id: &str, enabled: bool) -> Result<usize, ServiceError> {
    let groups = store.groups()?;
    let group = groups.get(group_id)?;
    let list = store.watch_list()?;
    let mut meta = store.entity_meta()?;

    let mut updated = 0;
    for id in group.streamers.iter().filter(|id| list.contains(id)) {
        let entry = meta.entry(id.clone()).or_default();
        entry.disabled = !enabled;
        if entry.is_empty() {
            meta.remove(id);
        }
        updated += 1;
    }
    if updated > 0 {
        store.set_entity_meta(&meta)?;
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{id, store};
    use crate::services::watch_list;
    use watch_db::{GroupError, Platform};

    #[test]
    fn create_update_delete() {
        let store = store();
        let group = create(&store, "Friends", "#f59e0b").unwrap();
        assert!(!group.id.is_empty());

        let updated = update(&store, &group.id, Some("Best"), Some("#000")).unwrap();
        assert_eq!(updated.name, "Best");
        assert_eq!(updated.color, "#000");

        assert!(matches!(
            update(&store, &group.id, None, Some("red")),
            Err(ServiceError::Group(GroupError::InvalidColor(_)))
        ));
        assert_eq!(list(&store).unwrap()[0].color, "#000");

        delete(&store, &group.id).unwrap();
        assert!(list(&store).unwrap().is_empty());
        assert_eq!(delete(&store, &group.id).unwrap_err().status_code(), 404);
    }

    #[test]
    fn members_must_be_watched() {
        let store = store();
        let group = create(&store, "G", "#fff").unwrap();
        assert!(matches!(
            add_member(&store, &group.id, &id("s:a")),
            Err(ServiceError::NotWatched(_))
        ));

        watch_list::add(&store, Platform::Soop, "a", None).unwrap();
        assert!(add_member(&store, &group.id, &id("s:a")).unwrap());
        assert!(!add_member(&store, &group.id, &id("s:a")).unwrap());
        assert!(remove_member(&store, &group.id, &id("s:a")).unwrap());
        assert!(!remove_member(&store, &group.id, &id("s:a")).unwrap());
    }

    #[test]
    fn bulk_enable_touches_only_members() {
        let store = store();
        for raw in ["a", "b", "c"] {
            watch_list::add(&store, Platform::Soop, raw, None).unwrap();
        }
        let group = create(&store, "G", "#fff").unwrap();
        add_member(&store, &group.id, &id("s:a")).unwrap();
        add_member(&store, &group.id, &id("s:b")).unwrap();

        assert_eq!(set_enabled(&store, &group.id, false).unwrap(), 2);
        let meta = store.entity_meta().unwrap();
        assert!(meta[&id("s:a")].disabled);
        assert!(meta[&id("s:b")].disabled);
        assert!(!meta.contains_key(&id("s:c")));

        assert_eq!(set_enabled(&store, &group.id, true).unwrap(), 2);
        assert!(store.entity_meta().unwrap().is_empty());
    }
}
