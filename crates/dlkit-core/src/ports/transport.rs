//! HTTP transport port.
//!
//! The session drives transfers through this port and never touches an
//! HTTP client directly. An implementation starts a GET without blocking
//! and feeds an ordered stream of [`TransportEvent`]s into the returned
//! [`RequestHandle`].
//!
//! # Event contract
//!
//! Per request: zero or more `BodyChunk`, `Progress` and `TlsWarning`
//! events in arrival order, then exactly one terminal event
//! (`Completed`, `Redirected` or `TransportError`). Nothing is delivered
//! after the terminal event or after [`RequestHandle::cancel`].

use std::fmt;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use url::Url;

/// Default capacity of a request's event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 32;

/// Identifier of one outstanding request, minted by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Event delivered by a transport for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// A slice of the response body, in arrival order.
    BodyChunk(Bytes),
    /// Transfer progress; `total` is `None` when the server sent no length.
    Progress {
        /// Body bytes received so far.
        read: u64,
        /// Announced body length, if any.
        total: Option<u64>,
    },
    /// Advisory TLS warnings. Never aborts the transfer by itself.
    TlsWarning(Vec<String>),
    /// Response fully received with this status.
    Completed {
        /// HTTP status code.
        status: u16,
    },
    /// Response carried a redirect status; the location was not followed.
    Redirected {
        /// HTTP status code.
        status: u16,
        /// `Location` header, when present.
        location: Option<String>,
    },
    /// DNS/connect/TLS/timeout or stream failure.
    TransportError {
        /// Description of the failure.
        message: String,
    },
}

impl TransportEvent {
    /// Create a transport error event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: message.into(),
        }
    }

    /// Whether this is the last event of a request.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Redirected { .. } | Self::TransportError { .. }
        )
    }
}

/// Session-side handle of an outstanding request.
///
/// Owned exclusively by the session for the duration of one transfer.
#[derive(Debug)]
pub struct RequestHandle {
    id: RequestId,
    events: mpsc::Receiver<TransportEvent>,
    cancel: CancellationToken,
    finished: bool,
}

impl RequestHandle {
    /// Create a connected handle/sender pair with the given channel capacity.
    #[must_use]
    pub fn channel(id: RequestId, buffer: usize) -> (Self, TransportEventSender) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let cancel = CancellationToken::new();
        let handle = Self {
            id,
            events: rx,
            cancel: cancel.clone(),
            finished: false,
        };
        (handle, TransportEventSender { id, tx, cancel })
    }

    /// The request identifier.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Receive the next event.
    ///
    /// Returns `None` once the request was cancelled, after the terminal
    /// event was received, or when the transport dropped its sender.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        if self.finished || self.cancel.is_cancelled() {
            return None;
        }
        let event = self.events.recv().await;
        match &event {
            Some(e) if e.is_terminal() => self.finished = true,
            None => self.finished = true,
            Some(_) => {}
        }
        event
    }

    /// Abort the request. Idempotent; a no-op after the terminal event.
    pub fn cancel(&mut self) {
        if !self.cancel.is_cancelled() {
            self.cancel.cancel();
        }
        self.events.close();
    }

    /// Whether `cancel` was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for RequestHandle {
    fn drop(&mut self) {
        // An abandoned request must not keep the transport busy.
        self.cancel.cancel();
    }
}

/// Transport-side half of a request: pushes events toward the session.
#[derive(Debug, Clone)]
pub struct TransportEventSender {
    id: RequestId,
    tx: mpsc::Sender<TransportEvent>,
    cancel: CancellationToken,
}

impl TransportEventSender {
    /// The request identifier.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Deliver an event. Returns `false` if the session stopped listening.
    pub async fn send(&self, event: TransportEvent) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.tx.send(event).await.is_ok()
    }

    /// Whether the session cancelled (or abandoned) the request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }

    /// Future resolving when the session cancels the request.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }
}

/// Port for issuing HTTP GET requests.
///
/// Implementations must not block: `start_get` schedules the request and
/// returns immediately.
pub trait HttpTransport: Send + Sync {
    /// Begin a GET for `url`.
    fn start_get(&self, url: &Url) -> RequestHandle;
}
