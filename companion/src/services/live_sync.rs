//! Poll-and-reconcile cycle.
//!
//! Both the periodic poll and the surface refresh call [`sync_live_status`];
//! the post-add check calls [`check_single`]. A [`PollGuard`] keeps any two of
//! them from overlapping: a trigger that arrives while a cycle is running is
//! dropped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use watch_db::{DbError, EntityId};

use super::badge;
use super::fetcher::{StreamerSource, fetch_live_status};
use super::notifier;
use super::reconciler::{self, Reconciliation};
use crate::host::ExtensionHost;
use crate::store::Store;

#[derive(Debug, Default)]
pub struct PollGuard {
    busy: AtomicBool,
}

/// Held for the duration of one cycle; releases the guard on drop.
pub struct PollTicket<'a> {
    busy: &'a AtomicBool,
}

impl PollGuard {
    pub fn try_begin(&self) -> Option<PollTicket<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PollTicket { busy: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for PollTicket<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Another cycle was running.
    Busy,
    NothingWatched,
    /// The fetch came back empty; the stored snapshot was left alone.
    NoData,
    Updated {
        fetched: usize,
        live: usize,
        transitions: usize,
        notified: usize,
    },
}

/// Fetch the whole watch list and replace the snapshot.
pub async fn sync_live_status<S: StreamerSource>(
    store: &Store,
    source: &S,
    host: &dyn ExtensionHost,
    guard: &PollGuard,
) -> Result<SyncOutcome, DbError> {
    let Some(_ticket) = guard.try_begin() else {
        tracing::debug!("Live status sync skipped: previous cycle still running");
        return Ok(SyncOutcome::Busy);
    };

    let list = store.watch_list()?;
    if list.is_empty() {
        return Ok(SyncOutcome::NothingWatched);
    }
    let previous = store.live_snapshot()?;
    let fetched = fetch_live_status(source, list.ids()).await;
    let count = fetched.len();
    apply(store, host, reconciler::reconcile(&previous, fetched), count)
}

/// Fetch one freshly added entity and merge it into the snapshot.
pub async fn check_single<S: StreamerSource>(
    store: &Store,
    source: &S,
    host: &dyn ExtensionHost,
    guard: &PollGuard,
    id: &EntityId,
) -> Result<SyncOutcome, DbError> {
    let Some(_ticket) = guard.try_begin() else {
        tracing::debug!(%id, "Single check skipped: sync in progress");
        return Ok(SyncOutcome::Busy);
    };

    let fetched = fetch_live_status(source, std::slice::from_ref(id)).await;
    let count = fetched.len();
    let previous = store.live_snapshot()?;
    apply(store, host, reconciler::extend(&previous, fetched), count)
}

fn apply(
    store: &Store,
    host: &dyn ExtensionHost,
    reconciliation: Reconciliation,
    fetched: usize,
) -> Result<SyncOutcome, DbError> {
    let Reconciliation {
        transitions,
        replacement,
    } = reconciliation;
    let Some(snapshot) = replacement else {
        tracing::debug!("Live status fetch returned nothing; keeping snapshot");
        return Ok(SyncOutcome::NoData);
    };

    // スナップショットを先に保存してから通知する
    store.replace_live_snapshot(&snapshot)?;

    let notified = if transitions.is_empty() {
        0
    } else {
        let settings = store.user_settings()?;
        let meta = store.entity_meta()?;
        let mut history = store.notification_history()?;
        let now_ms = chrono::Utc::now().timestamp_millis();
        let sent = notifier::dispatch(host, &settings, &meta, &mut history, &transitions, now_ms);
        if sent > 0 {
            store.set_notification_history(&history)?;
        }
        sent
    };

    let live = badge::paint(host, &snapshot);
    tracing::debug!(
        fetched,
        live,
        transitions = transitions.len(),
        notified,
        "Live status updated"
    );
    Ok(SyncOutcome::Updated {
        fetched,
        live,
        transitions: transitions.len(),
        notified,
    })
}
