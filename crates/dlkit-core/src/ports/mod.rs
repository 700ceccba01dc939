//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define the interfaces that the download session expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No HTTP client types in any signature
//! - Event delivery never blocks the session's control task

pub mod notification_sink;
pub mod transport;

pub use notification_sink::{
    ChannelNotificationSink, NoopNotificationSink, NotificationSink, PropertyObserver,
};
pub use transport::{
    DEFAULT_EVENT_BUFFER, HttpTransport, RequestHandle, RequestId, TransportEvent,
    TransportEventSender,
};
