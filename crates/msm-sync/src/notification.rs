//! Operator notifications and view-layer callbacks

use crate::binding::CollectionLabels;
use chrono::{DateTime, Utc};
use msm_collection::{ItemId, ParentId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Outcome of a network operation worth telling the operator about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NotificationKind {
    /// Staged items were persisted
    Committed {
        /// Parent the items now belong to
        parent: ParentId,
        /// Persisted items
        items: Vec<ItemId>,
    },
    /// Bulk add rejected
    CommitFailed {
        /// Parent the items were meant for
        parent: ParentId,
        /// Reason reported by the backend
        reason: String,
    },
    /// Confirmed items were removed
    Removed {
        /// Parent the items were removed from
        parent: ParentId,
        /// Removed items
        items: Vec<ItemId>,
    },
    /// Bulk remove rejected
    RemoveFailed {
        /// Reason reported by the backend
        reason: String,
        /// Items that stay confirmed
        items: Vec<ItemId>,
    },
}

/// Transient message for the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// What happened
    pub kind: NotificationKind,
    /// Rendered message
    pub message: String,
    /// When it happened
    pub at: DateTime<Utc>,
}

impl Notification {
    /// Build notification, rendering its message with `labels`
    #[must_use]
    pub fn new(kind: NotificationKind, labels: &CollectionLabels) -> Self {
        let message = render(&kind, labels);
        Self {
            kind,
            message,
            at: Utc::now(),
        }
    }

    /// Check if this reports a failure
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            NotificationKind::CommitFailed { .. } | NotificationKind::RemoveFailed { .. }
        )
    }
}

fn render(kind: &NotificationKind, labels: &CollectionLabels) -> String {
    match kind {
        NotificationKind::Committed { parent, items } => format!(
            "{} {} to {} {parent}",
            subject(labels, items),
            labels.added,
            labels.parent
        ),
        NotificationKind::CommitFailed { parent, reason } => format!(
            "Unable to {} {} to {} {parent}: {reason}",
            labels.add_verb, labels.plural, labels.parent
        ),
        NotificationKind::Removed { parent, items } => format!(
            "{} {} from {} {parent}",
            subject(labels, items),
            labels.removed,
            labels.parent
        ),
        NotificationKind::RemoveFailed { reason, items } => match items.as_slice() {
            [item] => format!(
                "Unable to {} {} {item}: {reason}",
                labels.remove_verb, labels.singular
            ),
            _ => format!("Unable to {} {}: {reason}", labels.remove_verb, labels.plural),
        },
    }
}

/// "Host 10.0.0.1" for one item, "3 hosts" otherwise
fn subject(labels: &CollectionLabels, items: &[ItemId]) -> String {
    match items {
        [item] => format!("{} {item}", capitalize(&labels.singular)),
        _ => format!("{} {}", items.len(), labels.plural),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Callbacks into the view layer
///
/// All methods are invoked synchronously, never while the synchronizer's
/// state lock is held, so implementations may read the synchronizer back.
pub trait SyncObserver: Send + Sync {
    /// An item was staged
    fn on_assign(&self, _item: &ItemId) {}

    /// Items left the collection (discarded locally or removed remotely)
    fn on_unassign(&self, _items: &[ItemId]) {}

    /// A network operation finished
    fn on_notification(&self, _notification: &Notification) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}

/// Recorded observer callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// `on_assign`
    Assigned(ItemId),
    /// `on_unassign`
    Unassigned(Vec<ItemId>),
    /// `on_notification`
    Notified(Notification),
}

/// Observer keeping every callback in memory
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<SyncEvent>>,
}

impl EventLog {
    /// Create empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events in order
    #[must_use]
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().clone()
    }

    /// Only the notifications
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SyncEvent::Notified(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    /// Most recent notification
    #[must_use]
    pub fn last_notification(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    /// Drop recorded events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl SyncObserver for EventLog {
    fn on_assign(&self, item: &ItemId) {
        self.events.lock().push(SyncEvent::Assigned(item.clone()));
    }

    fn on_unassign(&self, items: &[ItemId]) {
        self.events.lock().push(SyncEvent::Unassigned(items.to_vec()));
    }

    fn on_notification(&self, notification: &Notification) {
        self.events.lock().push(SyncEvent::Notified(notification.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_labels() -> CollectionLabels {
        CollectionLabels::new("host", "hosts", "worker-manager").assignment()
    }

    #[test]
    fn remove_failed_names_single_item() {
        let n = Notification::new(
            NotificationKind::RemoveFailed {
                reason: "network timeout".to_string(),
                items: vec!["hostA".into()],
            },
            &host_labels(),
        );
        assert_eq!(n.message, "Unable to unassign host hostA: network timeout");
        assert!(n.is_error());
    }

    #[test]
    fn remove_failed_uses_plural_for_many() {
        let n = Notification::new(
            NotificationKind::RemoveFailed {
                reason: "conflict".to_string(),
                items: vec!["hostA".into(), "hostB".into()],
            },
            &host_labels(),
        );
        assert_eq!(n.message, "Unable to unassign hosts: conflict");
    }

    #[test]
    fn committed_message() {
        let one = Notification::new(
            NotificationKind::Committed {
                parent: ParentId::from(42),
                items: vec!["hostA".into()],
            },
            &host_labels(),
        );
        assert_eq!(one.message, "Host hostA assigned to worker-manager 42");
        assert!(!one.is_error());

        let many = Notification::new(
            NotificationKind::Committed {
                parent: ParentId::from(42),
                items: vec!["hostA".into(), "hostB".into()],
            },
            &host_labels(),
        );
        assert_eq!(many.message, "2 hosts assigned to worker-manager 42");
    }

    #[test]
    fn commit_failed_names_parent() {
        let n = Notification::new(
            NotificationKind::CommitFailed {
                parent: ParentId::from(42),
                reason: "forbidden".to_string(),
            },
            &CollectionLabels::new("condition", "conditions", "rule"),
        );
        assert_eq!(n.message, "Unable to add conditions to rule 42: forbidden");
    }

    #[test]
    fn event_log_records_in_order() {
        let log = EventLog::new();
        log.on_assign(&"a".into());
        log.on_unassign(&["a".into()]);

        assert_eq!(
            log.events(),
            vec![
                SyncEvent::Assigned("a".into()),
                SyncEvent::Unassigned(vec!["a".into()])
            ]
        );
        assert!(log.last_notification().is_none());
    }
}
