//! Notification boundary
//!
//! Sessions report every user-facing outcome here and never read anything
//! back. Implementations decide where the notice goes: the console or a buffer
//! for tests. Every notice passing through [`MeteredNotifier`] is also logged.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::metrics::MetricsCollector;

/// How a notice should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral information
    Info,
    /// An operation completed
    Success,
    /// Validation failure or simulated failure
    Destructive,
}

impl Severity {
    /// Lowercase name, used as a metrics label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Destructive => "destructive",
        }
    }
}

/// A transient notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Short title
    pub title: String,
    /// One-line description
    pub description: String,
    /// Presentation severity
    pub severity: Severity,
}

impl Notification {
    /// Informational notice
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    /// Success notice
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Success,
        }
    }

    /// Failure notice
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

/// Fire-and-forget observer for notices
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Surface one notice
    fn notify(&self, notification: Notification);
}

/// Shared handle passed to every session
pub type SharedNotifier = Arc<dyn Notifier>;

/// Keeps every notice in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice received so far
    #[must_use]
    pub fn all(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Remove and return every notice received so far
    pub fn take(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }

    /// The most recent notice
    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.received
            .lock()
            .ok()
            .and_then(|guard| guard.last().cloned())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut guard) = self.received.lock() {
            guard.push(notification);
        }
    }
}

/// Counts notices by severity, then forwards them
pub struct MeteredNotifier {
    inner: SharedNotifier,
    metrics: MetricsCollector,
}

impl MeteredNotifier {
    /// Wrap `inner`
    pub fn new(inner: SharedNotifier) -> Self {
        Self {
            inner,
            metrics: MetricsCollector::default(),
        }
    }
}

impl Notifier for MeteredNotifier {
    fn notify(&self, notification: Notification) {
        self.metrics.record_notification(notification.severity);
        if notification.severity == Severity::Destructive {
            warn!(title = %notification.title, description = %notification.description, "Notice");
        } else {
            info!(title = %notification.title, description = %notification.description, "Notice");
        }
        self.inner.notify(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_take_drains() {
        let recorder = RecordingNotifier::new();
        recorder.notify(Notification::info("a", "b"));
        recorder.notify(Notification::destructive("c", "d"));
        assert_eq!(recorder.all().len(), 2);
        assert_eq!(recorder.last().unwrap().title, "c");
        assert_eq!(recorder.take().len(), 2);
        assert!(recorder.all().is_empty());
    }

    #[test]
    fn test_metered_notifier_forwards() {
        let mut inner = MockNotifier::new();
        inner
            .expect_notify()
            .withf(|n| n.severity == Severity::Success)
            .times(1)
            .return_const(());
        let metered = MeteredNotifier::new(Arc::new(inner));
        metered.notify(Notification::success("ok", "done"));
    }
}
