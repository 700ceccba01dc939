//! Download events - lifecycle notifications and property changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::FailureReason;
use super::state::SessionPhase;

/// Lifecycle notification delivered to a notification sink.
///
/// Hosts can forward this as JSON:
///
/// ```typescript
/// type DownloadEvent =
///   | { type: "download_started"; url: string; output_path: string }
///   | { type: "download_progress"; read: number; total: number }
///   | { type: "tls_warnings"; warnings: string[] }
///   | { type: "download_finished"; output_path: string; bytes: number }
///   | { type: "download_failed"; reason: string; message: string };
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    /// The GET was issued for a freshly opened destination.
    DownloadStarted {
        /// Target resource.
        url: Url,
        /// Resolved destination.
        output_path: PathBuf,
    },

    /// Progress update.
    DownloadProgress {
        /// Bytes received so far.
        read: u64,
        /// Display total (never the unknown sentinel).
        total: u64,
    },

    /// Advisory TLS warnings; the transfer continues.
    TlsWarnings {
        /// Human-readable warning descriptions.
        warnings: Vec<String>,
    },

    /// Download completed successfully.
    DownloadFinished {
        /// Path of the written file.
        output_path: PathBuf,
        /// Bytes written to the file.
        bytes: u64,
    },

    /// Download failed (or was refused / cancelled).
    DownloadFailed {
        /// Stable reason code.
        reason: FailureReason,
        /// Diagnostic detail for logs; not meant as presentation text.
        message: String,
    },
}

impl DownloadEvent {
    /// Create a progress event.
    #[must_use]
    pub const fn progress(read: u64, total: u64) -> Self {
        Self::DownloadProgress { read, total }
    }

    /// Create a failure event.
    pub fn failed(reason: FailureReason, message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            reason,
            message: message.into(),
        }
    }

    /// Whether this event ends a transfer.
    ///
    /// `already-downloading` refusals are not terminal: the running
    /// transfer continues.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        match self {
            Self::DownloadFinished { .. } => true,
            Self::DownloadFailed { reason, .. } => {
                !matches!(reason, FailureReason::AlreadyDownloading)
            }
            _ => false,
        }
    }

    /// Short event name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DownloadStarted { .. } => "download_started",
            Self::DownloadProgress { .. } => "download_progress",
            Self::TlsWarnings { .. } => "tls_warnings",
            Self::DownloadFinished { .. } => "download_finished",
            Self::DownloadFailed { .. } => "download_failed",
        }
    }
}

/// A discrete change of one observable session property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "snake_case")]
pub enum PropertyChange {
    /// Target URL changed.
    Url(Option<Url>),
    /// Resolved destination changed.
    OutputPath(Option<PathBuf>),
    /// Auto-naming folder changed.
    DownloadFolder(Option<PathBuf>),
    /// Bytes read changed.
    BytesRead(u64),
    /// Display total changed.
    BytesTotal(u64),
    /// In-progress flag flipped.
    InProgress(bool),
    /// State-machine phase changed.
    Phase(SessionPhase),
}
