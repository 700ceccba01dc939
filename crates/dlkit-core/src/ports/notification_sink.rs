//! Notification sink port.
//!
//! This port abstracts lifecycle event delivery, allowing the session to
//! notify its host (GUI layer, CLI, test harness) without coupling to how
//! the host displays them.

use tokio::sync::mpsc;

use crate::download::{DownloadEvent, PropertyChange};

/// Port receiving lifecycle notifications.
///
/// Called on the session's control task, in order. Implementations must not
/// block; buffer or forward instead.
pub trait NotificationSink: Send + Sync {
    /// Deliver a lifecycle event.
    fn emit(&self, event: DownloadEvent);
}

/// Observer of individual property changes.
///
/// Every change is delivered synchronously on the session's control task,
/// in the order it happened.
pub trait PropertyObserver: Send + Sync {
    /// Called once per changed property.
    fn on_property_changed(&self, change: &PropertyChange);
}

impl<F> PropertyObserver for F
where
    F: Fn(&PropertyChange) + Send + Sync,
{
    fn on_property_changed(&self, change: &PropertyChange) {
        self(change);
    }
}

/// A sink that discards every event.
///
/// Suitable for tests that don't verify notifications and for hosts that
/// only poll the state snapshot.
#[derive(Debug, Clone, Default)]
pub struct NoopNotificationSink;

impl NoopNotificationSink {
    /// Create a new no-op sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl NotificationSink for NoopNotificationSink {
    fn emit(&self, _event: DownloadEvent) {
        // Intentionally do nothing
    }
}

/// A sink forwarding events into an unbounded channel.
///
/// Useful for hosts that consume notifications on another task.
#[derive(Debug, Clone)]
pub struct ChannelNotificationSink {
    tx: mpsc::UnboundedSender<DownloadEvent>,
}

impl ChannelNotificationSink {
    /// Create a sink together with the receiving end.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DownloadEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelNotificationSink {
    fn emit(&self, event: DownloadEvent) {
        // A closed receiver just means nobody is listening anymore.
        let _ = self.tx.send(event);
    }
}
