//! Background task loops: periodic poll, surface refresh, external storage
//! change detection and storage event fan-out.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use watch_db::RecordKey;

use crate::app::SharedState;
use crate::events;
use crate::services::badge;

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}

async fn sync_once(state: &SharedState, trigger: &str) {
    match state.sync_live_status().await {
        Ok(Some(outcome)) => tracing::debug!(trigger, ?outcome, "Live status cycle finished"),
        Ok(None) => {}
        Err(e) => tracing::warn!(trigger, "Live status cycle failed: {e}"),
    }
}

/// Periodic poll of the whole watch list.
pub async fn live_status_poll_loop(state: SharedState) {
    let shutdown_token = state.shutdown_token().clone();

    loop {
        let interval = state.config().await.poll_interval();
        if sleep_or_cancel(&shutdown_token, interval).await {
            tracing::info!("Live status poll loop stopped (shutdown)");
            return;
        }
        sync_once(&state, "poll").await;
    }
}

/// Refresh while a user-facing surface stays connected. Runs one cycle
/// right away, then one per refresh interval until `surface` is cancelled.
pub async fn surface_refresh_loop(state: SharedState, surface: CancellationToken) {
    let shutdown_token = state.shutdown_token().clone();

    loop {
        sync_once(&state, "surface").await;
        let interval = state.config().await.surface_refresh_interval();
        tokio::select! {
            _ = surface.cancelled() => return,
            stopped = sleep_or_cancel(&shutdown_token, interval) => {
                if stopped {
                    return;
                }
            }
        }
    }
}

/// Pick up record writes made by other processes.
pub async fn external_change_loop(state: SharedState) {
    let shutdown_token = state.shutdown_token().clone();

    loop {
        let interval = state.config().await.external_change_interval();
        if sleep_or_cancel(&shutdown_token, interval).await {
            tracing::info!("External change loop stopped (shutdown)");
            return;
        }
        if let Err(e) = state.store().poll_external_changes() {
            tracing::warn!("Failed to read record revisions: {e}");
        }
    }
}

/// Forward storage changes to WebSocket clients and repaint the badge
/// whenever the snapshot changed, whoever wrote it.
pub async fn storage_event_loop(state: SharedState) {
    let shutdown_token = state.shutdown_token().clone();
    let mut rx = state.store().subscribe();

    loop {
        let received = tokio::select! {
            _ = shutdown_token.cancelled() => {
                tracing::info!("Storage event loop stopped (shutdown)");
                return;
            }
            received = rx.recv() => received,
        };

        match received {
            Ok(change) => {
                let payload = events::StorageChangedPayload::from(change);
                let _ = state
                    .ws_sender()
                    .send(events::message(events::STORAGE_CHANGED, &payload));
                if change.key == RecordKey::LiveSnapshot {
                    repaint_badge(&state);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Storage events lagged; repainting badge");
                repaint_badge(&state);
            }
            Err(RecvError::Closed) => return,
        }
    }
}

fn repaint_badge(state: &SharedState) {
    match state.store().live_snapshot() {
        Ok(snapshot) => {
            badge::paint(state.host(), &snapshot);
        }
        Err(e) => tracing::warn!("Failed to read snapshot for badge: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_state;
    use watch_db::{LiveSnapshot, LiveStatus};

    #[tokio::test]
    async fn external_snapshot_write_repaints_badge() {
        let (state, host) = test_state();
        let loop_state = state.clone();
        let handle = tokio::spawn(storage_event_loop(loop_state));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let mut snapshot = LiveSnapshot::new();
        snapshot.insert("s:a".parse().unwrap(), LiveStatus::live("x"));
        // 別のサーフェスからの書き込み
        state
            .db()
            .put_record(RecordKey::LiveSnapshot, &snapshot)
            .unwrap();
        state.store().poll_external_changes().unwrap();

        for _ in 0..50 {
            if !host.badges().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(host.badges().last().unwrap().text, "1");

        state.shutdown_token().cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn surface_loop_ends_with_surface() {
        let (state, _host) = test_state();
        let surface = CancellationToken::new();
        let handle = tokio::spawn(surface_refresh_loop(state, surface.clone()));
        surface.cancel();
        handle.await.unwrap();
    }
}
