//! Core domain types and ports for dlkit download sessions.
//!
//! - `download` - transfer state, events, errors and status classification
//! - `ports` - `HttpTransport`, `NotificationSink` and `PropertyObserver`
#![deny(unused_crate_dependencies)]

pub mod download;
pub mod ports;

// Re-export commonly used types for convenience
pub use download::{
    DownloadError, DownloadEvent, DownloadResult, FailureReason, OutputTarget, PropertyChange,
    REDIRECT_STATUS_CODES, SessionPhase, StatusClass, TransferState, is_redirect_status,
};
pub use ports::{
    ChannelNotificationSink, HttpTransport, NoopNotificationSink, NotificationSink,
    PropertyObserver, RequestHandle, RequestId, TransportEvent, TransportEventSender,
};
