//! CLI-specific error types and mappings.
//!
//! Maps session errors and terminal download failures to exit codes and
//! user-facing messages.

use dlkit_core::{DownloadError, FailureReason};
use dlkit_download::TransportBuildError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument or usage error reported by the session.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// The HTTP client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The download ran and failed.
    #[error("{}", .reason.user_message())]
    Download {
        /// Terminal failure reason.
        reason: FailureReason,
    },

    /// The session went away unexpectedly.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Specific error categories (see sysexits.h)
    /// - 130: Interrupted
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,
            Self::Config(_) => 78, // EX_CONFIG
            Self::Internal(_) => 70, // EX_SOFTWARE
            Self::Download { reason } => match reason {
                FailureReason::CannotOpenDestination => 73, // EX_CANTCREAT
                FailureReason::DestinationWriteFailed => 74, // EX_IOERR
                FailureReason::TransportError => 69, // EX_UNAVAILABLE
                FailureReason::Cancelled => 130,
                FailureReason::Redirected | FailureReason::AlreadyDownloading => 1,
            },
        }
    }
}

impl From<DownloadError> for CliError {
    fn from(err: DownloadError) -> Self {
        if err.is_usage_error() {
            Self::Arguments(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<TransportBuildError> for CliError {
    fn from(err: TransportBuildError) -> Self {
        Self::Config(err.to_string())
    }
}
