//! Watch list manager: add, remove, per-entity edits, reorder and launch.

use serde::Serialize;
use watch_db::{
    EntityId, EntityMeta, LiveStatus, MetaMap, Platform, RecordKey, WatchList,
};

use super::ServiceError;
use crate::host::ExtensionHost;
use crate::store::{Store, record_value};

/// One row of the watch list as shown by a surface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    pub id: EntityId,
    pub platform: Platform,
    pub raw_id: String,
    pub nick: Option<String>,
    pub disabled: bool,
    pub notification_enabled: bool,
    pub watch_url: String,
    pub live: Option<LiveStatus>,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchStatus {
    pub total: usize,
    pub enabled: usize,
    pub live: usize,
    pub soop_warning: bool,
}

/// Add an entity. Fails without touching storage when it is already watched
/// or the list is full.
pub fn add(
    store: &Store,
    platform: Platform,
    raw_id: &str,
    nick: Option<&str>,
) -> Result<EntityId, ServiceError> {
    let id = EntityId::new(platform, raw_id)?;
    let mut list = store.watch_list()?;
    list.add(id.clone())?;

    let mut writes = vec![(RecordKey::WatchList, record_value(&list)?)];
    if let Some(nick) = nick.map(str::trim).filter(|n| !n.is_empty()) {
        let mut meta = store.entity_meta()?;
        meta.entry(id.clone()).or_default().nick = Some(nick.to_string());
        writes.push((RecordKey::EntityMeta, record_value(&meta)?));
    }
    store.put_many(writes)?;
    tracing::info!(%id, total = list.len(), "Streamer added");
    Ok(id)
}

/// Remove an entity together with its metadata, group memberships and
/// snapshot entry, in one transaction.
pub fn remove(store: &Store, id: &EntityId) -> Result<(), ServiceError> {
    let mut list = store.watch_list()?;
    list.remove(id)?;

    let mut meta = store.entity_meta()?;
    meta.remove(id);
    let mut groups = store.groups()?;
    let touched = groups.remove_entity_everywhere(id);
    let mut snapshot = store.live_snapshot()?;
    let had_status = snapshot.remove(id).is_some();

    let mut writes = vec![
        (RecordKey::WatchList, record_value(&list)?),
        (RecordKey::EntityMeta, record_value(&meta)?),
    ];
    if touched > 0 {
        writes.push((RecordKey::Groups, record_value(&groups)?));
    }
    if had_status {
        writes.push((RecordKey::LiveSnapshot, record_value(&snapshot)?));
    }
    store.put_many(writes)?;
    tracing::info!(%id, groups = touched, "Streamer removed");
    Ok(())
}

pub fn set_disabled(store: &Store, id: &EntityId, disabled: bool) -> Result<(), ServiceError> {
    update_meta(store, id, |m| m.disabled = disabled)
}

/// An empty or missing nickname clears it.
pub fn set_nick(store: &Store, id: &EntityId, nick: Option<&str>) -> Result<(), ServiceError> {
    let nick = nick
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    update_meta(store, id, |m| m.nick = nick)
}

pub fn set_notification_enabled(
    store: &Store,
    id: &EntityId,
    enabled: bool,
) -> Result<(), ServiceError> {
    update_meta(store, id, |m| m.notification_enabled = Some(enabled))
}

pub fn reorder(store: &Store, order: Vec<EntityId>) -> Result<(), ServiceError> {
    let mut list = store.watch_list()?;
    list.reorder(order)?;
    store.set_watch_list(&list)?;
    Ok(())
}

pub fn view(store: &Store) -> Result<Vec<WatchEntry>, ServiceError> {
    let list = store.watch_list()?;
    let meta = store.entity_meta()?;
    let snapshot = store.live_snapshot()?;
    let groups = store.groups()?;

    let entries = list
        .ids()
        .iter()
        .map(|id| {
            let m = meta.get(id).cloned().unwrap_or_default();
            WatchEntry {
                id: id.clone(),
                platform: id.platform(),
                raw_id: id.raw_id().to_string(),
                notification_enabled: m.notifications_allowed(),
                nick: m.nick,
                disabled: m.disabled,
                watch_url: id.watch_url(),
                live: snapshot.get(id).cloned(),
                groups: groups.groups_of(id).map(|g| g.id.clone()).collect(),
            }
        })
        .collect();
    Ok(entries)
}

pub fn status(store: &Store) -> Result<WatchStatus, ServiceError> {
    let list = store.watch_list()?;
    let meta = store.entity_meta()?;
    let snapshot = store.live_snapshot()?;
    Ok(WatchStatus {
        total: list.len(),
        enabled: list.enabled(&meta).count(),
        live: super::badge::live_count(&snapshot),
        soop_warning: list.soop_warning(&meta),
    })
}

/// `<site>/multiview/watch/<id1>/<id2>/...` over enabled entities, or `None`
/// when nothing is enabled.
pub fn launch_url(companion_site: &str, list: &WatchList, meta: &MetaMap) -> Option<String> {
    let ids: Vec<String> = list.enabled(meta).map(ToString::to_string).collect();
    if ids.is_empty() {
        return None;
    }
    Some(format!(
        "{}/multiview/watch/{}",
        companion_site.trim_end_matches('/'),
        ids.join("/")
    ))
}

pub fn launch(
    store: &Store,
    host: &dyn ExtensionHost,
    companion_site: &str,
) -> Result<String, ServiceError> {
    let list = store.watch_list()?;
    let meta = store.entity_meta()?;
    let url = launch_url(companion_site, &list, &meta).ok_or(ServiceError::NothingToLaunch)?;
    host.open_tab(&url);
    tracing::info!(url, "Multiview launched");
    Ok(url)
}

/// Open the bare multiview page.
pub fn open_multiview(host: &dyn ExtensionHost, multiview_url: &str) {
    host.open_tab(multiview_url);
    tracing::info!(url = multiview_url, "Multiview opened");
}

fn update_meta(
    store: &Store,
    id: &EntityId,
    edit: impl FnOnce(&mut EntityMeta),
) -> Result<(), ServiceError> {
    if !store.watch_list()?.contains(id) {
        return Err(ServiceError::NotWatched(id.clone()));
    }
    let mut meta = store.entity_meta()?;
    let entry = meta.entry(id.clone()).or_default();
    edit(entry);
    if entry.is_empty() {
        meta.remove(id);
    }
    store.set_entity_meta(&meta)?;
    Ok(())
}
