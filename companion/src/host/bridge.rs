//! Production host: forwards every primitive to the extension shim over the
//! WebSocket broadcast channel.
//!
//! The shim (an MV3 service worker) comes and goes. Notifications and the
//! badge raised while it is away are held and flushed when it reconnects.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::broadcast;

use super::{ExtensionHost, HostCommand};
use crate::events;

/// Upper bound on held notifications, same as the history cap.
pub const MAX_PENDING: usize = 50;

pub struct BridgeHost {
    ws_tx: broadcast::Sender<String>,
    shims: AtomicUsize,
    pending: Mutex<VecDeque<HostCommand>>,
}

impl BridgeHost {
    pub fn new(ws_tx: broadcast::Sender<String>) -> Self {
        Self {
            ws_tx,
            shims: AtomicUsize::new(0),
            pending: Mutex::new(VecDeque::new()),
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn send(&self, command: &HostCommand) -> bool {
        let msg = events::message(events::HOST_COMMAND, command);
        self.ws_tx.send(msg).is_ok()
    }

    fn hold(&self, command: HostCommand) {
        let Ok(mut pending) = self.pending.lock() else {
            tracing::warn!("Pending host command queue poisoned; command dropped");
            return;
        };

        match command {
            HostCommand::CreateNotification(ref n) => {
                // 同じタグは置き換え
                let tag = n.tag.clone();
                pending.retain(|c| !matches!(c, HostCommand::CreateNotification(p) if p.tag == tag));
                if pending
                    .iter()
                    .filter(|c| matches!(c, HostCommand::CreateNotification(_)))
                    .count()
                    >= MAX_PENDING
                {
                    if let Some(oldest) = pending
                        .iter()
                        .position(|c| matches!(c, HostCommand::CreateNotification(_)))
                    {
                        pending.remove(oldest);
                    }
                }
                pending.push_back(command);
            }
            HostCommand::ClearNotification { ref tag } => {
                let before = pending.len();
                pending.retain(|c| !matches!(c, HostCommand::CreateNotification(p) if &p.tag == tag));
                // Never shown: clearing it is enough.
                if pending.len() == before {
                    pending.push_back(command);
                }
            }
            HostCommand::SetBadge(_) => {
                pending.retain(|c| !matches!(c, HostCommand::SetBadge(_)));
                pending.push_back(command);
            }
            HostCommand::OpenTab { .. } | HostCommand::SetCookie(_) => {
                tracing::debug!(?command, "No shim connected; host command dropped");
            }
        }
    }

    fn flush(&self) {
        let held: Vec<HostCommand> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => return,
        };
        if held.is_empty() {
            return;
        }

        tracing::info!(count = held.len(), "Replaying held host commands");
        let mut held = held.into_iter();
        while let Some(command) = held.next() {
            if !self.send(&command) {
                self.hold(command);
                held.for_each(|c| self.hold(c));
                return;
            }
        }
    }
}

impl ExtensionHost for BridgeHost {
    fn execute(&self, command: HostCommand) {
        if self.shims.load(Ordering::SeqCst) == 0 || !self.send(&command) {
            self.hold(command);
        }
    }

    fn shim_connected(&self) {
        self.shims.fetch_add(1, Ordering::SeqCst);
        self.flush();
    }

    fn shim_disconnected(&self) {
        let _ = self
            .shims
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}
