//! Production [`HttpTransport`](dlkit_core::HttpTransport) adapter.
//!
//! Requests run on their own tokio task and stream events back to the
//! session through the request's channel. Redirects are reported, never
//! followed.

mod http;

use std::time::Duration;

use thiserror::Error;

pub use http::ReqwestTransport;

/// Error building a [`ReqwestTransport`].
#[derive(Debug, Error)]
pub enum TransportBuildError {
    /// The underlying HTTP client could not be constructed (TLS backend,
    /// invalid user agent, ...).
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct ReqwestTransportConfig {
    pub(crate) user_agent: String,
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Option<Duration>,
    pub(crate) accept_invalid_certs: bool,
    pub(crate) event_buffer: usize,
}

impl Default for ReqwestTransportConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("dlkit/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Some(Duration::from_secs(60)),
            accept_invalid_certs: false,
            event_buffer: dlkit_core::ports::DEFAULT_EVENT_BUFFER,
        }
    }
}

impl ReqwestTransportConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the connect timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-read timeout, or `None` to wait indefinitely for data.
    ///
    /// Defaults to 60 seconds. This bounds stalls, not the whole transfer.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Accept invalid TLS certificates. Each HTTPS request then carries a
    /// TLS warning.
    #[must_use]
    pub const fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set the capacity of each request's event channel (minimum 1).
    #[must_use]
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }

    /// The configured user agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// The configured connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// The configured read timeout.
    #[must_use]
    pub const fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Whether invalid certificates are accepted.
    #[must_use]
    pub const fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }
}
