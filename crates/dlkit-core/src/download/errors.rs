//! Download error types.
//!
//! Two families live here:
//!
//! - [`DownloadError`]: synchronous rejections returned to the caller of a
//!   session operation (usage errors and session plumbing).
//! - [`FailureReason`]: the stable reason code attached to a terminal
//!   `DownloadFailed` notification.
//!
//! Both are serializable so adapters can forward them without depending on
//! non-serializable types like `std::io::Error`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned synchronously by session operations.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DownloadError {
    /// `start_download` was called while a transfer is running.
    #[error("Unable to download file: already downloading")]
    AlreadyDownloading,

    /// A configuration setter was called while a transfer is running.
    #[error("Unable to set {field}: a file is downloading")]
    ConfigurationLocked {
        /// Name of the rejected configuration field.
        field: String,
    },

    /// `start_download` was called before a URL was configured.
    #[error("No URL configured")]
    MissingUrl,

    /// The URL could not be parsed as an absolute URI.
    #[error("Invalid URL '{value}': {message}")]
    InvalidUrl {
        /// The rejected input.
        value: String,
        /// Parser message.
        message: String,
    },

    /// The URL scheme is not `http` or `https`.
    #[error("Unsupported URL scheme '{scheme}' (only http and https are supported)")]
    UnsupportedScheme {
        /// The rejected scheme.
        scheme: String,
    },

    /// The session runner is gone (session dropped or runtime shut down).
    #[error("Download session is closed")]
    SessionClosed,
}

impl DownloadError {
    /// Create a configuration-locked error for the named field.
    pub fn configuration_locked(field: impl Into<String>) -> Self {
        Self::ConfigurationLocked {
            field: field.into(),
        }
    }

    /// Create an invalid URL error.
    pub fn invalid_url(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported scheme error.
    pub fn unsupported_scheme(scheme: impl Into<String>) -> Self {
        Self::UnsupportedScheme {
            scheme: scheme.into(),
        }
    }

    /// Check if this is a usage error (the caller broke a precondition).
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        !matches!(self, Self::SessionClosed)
    }
}

/// Convenience result type for session operations.
pub type DownloadResult<T> = Result<T, DownloadError>;

/// Stable reason code carried by a `DownloadFailed` notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    /// A start was attempted while a transfer was already running.
    AlreadyDownloading,
    /// The destination file could not be opened for writing.
    CannotOpenDestination,
    /// DNS/connect/TLS/timeout failure, or a non-2xx status outside the redirect set.
    TransportError,
    /// The server answered with a redirect status.
    Redirected,
    /// The caller cancelled the transfer.
    Cancelled,
    /// Writing a received chunk to the destination failed.
    DestinationWriteFailed,
}

impl FailureReason {
    /// Stable string code, suitable for logs and wire formats.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyDownloading => "already-downloading",
            Self::CannotOpenDestination => "cannot-open-destination",
            Self::TransportError => "transport-error",
            Self::Redirected => "redirected",
            Self::Cancelled => "cancelled",
            Self::DestinationWriteFailed => "destination-write-failed",
        }
    }

    /// Parse a reason from its stable string code.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "already-downloading" => Some(Self::AlreadyDownloading),
            "cannot-open-destination" => Some(Self::CannotOpenDestination),
            "transport-error" => Some(Self::TransportError),
            "redirected" => Some(Self::Redirected),
            "cancelled" => Some(Self::Cancelled),
            "destination-write-failed" => Some(Self::DestinationWriteFailed),
            _ => None,
        }
    }

    /// Check if this is a caller-initiated cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Default human-readable message for notification sinks.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::AlreadyDownloading => "Download refused: another download is in progress.",
            Self::CannotOpenDestination => {
                "Download failed: the destination file could not be opened for writing."
            }
            Self::TransportError => "Download failed: the server or network reported an error.",
            Self::Redirected => "Download failed: server redirected the request.",
            Self::Cancelled => "Download was cancelled.",
            Self::DestinationWriteFailed => {
                "Download failed: data could not be written to the destination file."
            }
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
