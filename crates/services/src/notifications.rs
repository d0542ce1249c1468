use std::sync::{Arc, Mutex, PoisonError};

use tracker_core::model::{Notification, NotificationKind, Severity};

/// Receives notification descriptions. Rendering is entirely up to the implementor.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: Notification);
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, notification: Notification) {
        let title = notification.title();
        match notification.severity {
            Severity::Info => tracing::info!(title, message = %notification.message, "notification"),
            Severity::Destructive => {
                tracing::warn!(title, message = %notification.message, "notification");
            }
        }
    }
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl NotificationSink for SilentSink {
    fn publish(&self, _notification: Notification) {}
}

/// Keeps every notification in memory, oldest first.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.entries().into_iter().map(|n| n.kind).collect()
    }

    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.entries().pop()
    }

    /// Empties the log, returning what it held.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NotificationSink for NotificationLog {
    fn publish(&self, notification: Notification) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// Cheap, cloneable handle components use to emit notifications.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    #[must_use]
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    #[must_use]
    pub fn silent() -> Self {
        Self::new(Arc::new(SilentSink))
    }

    #[must_use]
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingSink))
    }

    /// A notifier that records into `log`.
    #[must_use]
    pub fn logging_to(log: &NotificationLog) -> Self {
        Self::new(Arc::new(log.clone()))
    }

    pub fn emit(&self, notification: Notification) {
        self.sink.publish(notification);
    }

    pub fn info(&self, kind: NotificationKind, message: impl Into<String>) {
        self.emit(Notification::info(kind, message));
    }

    pub fn destructive(&self, kind: NotificationKind, message: impl Into<String>) {
        self.emit(Notification::destructive(kind, message));
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::tracing()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}
