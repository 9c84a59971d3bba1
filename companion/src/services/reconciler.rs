//! Snapshot reconciler: diff a fresh fetch against the previous snapshot and
//! find offline→live edges. Pure functions; persistence happens in
//! [`super::live_sync`].

use watch_db::{EntityId, LiveSnapshot, LiveStatus};

/// An entity that went live since the previous snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub entity_id: EntityId,
    pub status: LiveStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub transitions: Vec<Transition>,
    /// Snapshot to persist. `None` means the stored one stays untouched.
    pub replacement: Option<LiveSnapshot>,
}

/// Transitions for every fetched id that is live now and was not live before.
///
/// Ids missing from `fetched` never transition, in either direction.
pub fn detect_transitions(previous: &LiveSnapshot, fetched: &LiveSnapshot) -> Vec<Transition> {
    fetched
        .iter()
        .filter(|(id, status)| {
            let was_live = previous.get(*id).is_some_and(|p| p.is_live);
            !was_live && status.is_live
        })
        .map(|(id, status)| Transition {
            entity_id: id.clone(),
            status: status.clone(),
        })
        .collect()
}

/// Full poll: a non-empty fetch replaces the whole snapshot, even when it
/// covers only part of the watch list.
pub fn reconcile(previous: &LiveSnapshot, fetched: LiveSnapshot) -> Reconciliation {
    if fetched.is_empty() {
        return Reconciliation {
            transitions: Vec::new(),
            replacement: None,
        };
    }
    Reconciliation {
        transitions: detect_transitions(previous, &fetched),
        replacement: Some(fetched),
    }
}

/// Single-entity check: a non-empty fetch is merged into the previous
/// snapshot instead of replacing it.
pub fn extend(previous: &LiveSnapshot, fetched: LiveSnapshot) -> Reconciliation {
    if fetched.is_empty() {
        return Reconciliation {
            transitions: Vec::new(),
            replacement: None,
        };
    }
    let transitions = detect_transitions(previous, &fetched);
    let mut merged = previous.clone();
    merged.extend(fetched);
    Reconciliation {
        transitions,
        replacement: Some(merged),
    }
}
