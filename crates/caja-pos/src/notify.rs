//! # Notification Sink
//!
//! Toast-style operator feedback as an injected capability.
//!
//! The browser original kept a module-level singleton list of active
//! toasts. Here the sink is a trait passed into every component that
//! needs it: the UI shell implements it over its toast widget, tests
//! implement it over a Vec and assert on what the operator would have
//! seen. Nothing in the services ever blocks on a notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Notification Types
// =============================================================================

/// Severity of an operator notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    Success,
    Error,
    Warning,
    Info,
}

/// One notification as a UI toast list would hold it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub kind: NotifyKind,
    pub title: String,
    pub message: Option<String>,
    pub at: DateTime<Utc>,
}

impl Notification {
    fn new(kind: NotifyKind, title: &str, message: Option<&str>) -> Self {
        Notification {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.to_string(),
            message: message.map(|m| m.to_string()),
            at: Utc::now(),
        }
    }
}

// =============================================================================
// Notifier Trait
// =============================================================================

/// The injected notification sink.
pub trait Notifier: Send + Sync {
    /// Pushes one notification toward the operator.
    fn notify(&self, kind: NotifyKind, title: &str, message: Option<&str>);

    fn success(&self, title: &str) {
        self.notify(NotifyKind::Success, title, None);
    }

    fn error(&self, title: &str) {
        self.notify(NotifyKind::Error, title, None);
    }

    fn warning(&self, title: &str) {
        self.notify(NotifyKind::Warning, title, None);
    }

    fn info(&self, title: &str) {
        self.notify(NotifyKind::Info, title, None);
    }
}

/// Discards everything; for headless use.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _kind: NotifyKind, _title: &str, _message: Option<&str>) {}
}

/// Collects notifications in memory; what tests assert against.
#[derive(Default)]
pub struct MemoryNotifier {
    entries: std::sync::Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        MemoryNotifier::default()
    }

    /// Takes every notification recorded so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().expect("notifier mutex poisoned"))
    }

    /// Titles recorded so far, oldest first.
    pub fn titles(&self) -> Vec<String> {
        self.entries
            .lock()
            .expect("notifier mutex poisoned")
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }

    /// The most recent notification.
    pub fn last(&self) -> Option<Notification> {
        self.entries
            .lock()
            .expect("notifier mutex poisoned")
            .last()
            .cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, kind: NotifyKind, title: &str, message: Option<&str>) {
        self.entries
            .lock()
            .expect("notifier mutex poisoned")
            .push(Notification::new(kind, title, message));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.success("Product added");
        notifier.error("Insufficient stock");

        let titles = notifier.titles();
        assert_eq!(titles, vec!["Product added", "Insufficient stock"]);

        let last = notifier.last().unwrap();
        assert_eq!(last.kind, NotifyKind::Error);
    }

    #[test]
    fn test_drain_empties() {
        let notifier = MemoryNotifier::new();
        notifier.info("one");
        assert_eq!(notifier.drain().len(), 1);
        assert!(notifier.drain().is_empty());
    }

    #[test]
    fn test_null_notifier_is_silent() {
        // compiles and does nothing; used wherever feedback is unwanted
        NullNotifier.warning("ignored");
    }
}
