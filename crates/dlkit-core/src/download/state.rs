//! Transfer state: the single source of truth queried by observers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::FailureReason;

/// Phase of a download session's state machine.
///
/// `Idle → Requesting → Streaming → Finished`, or `→ Failed` from any
/// non-terminal phase. `Finished` and `Failed` are terminal until the next
/// transfer starts (or the session is reset).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No transfer has run yet, or the session was reset.
    #[default]
    Idle,
    /// The GET was issued; no body bytes received yet.
    Requesting,
    /// At least one body chunk was written.
    Streaming,
    /// The last transfer completed successfully.
    Finished,
    /// The last transfer failed or was cancelled.
    Failed,
}

impl SessionPhase {
    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Streaming => "streaming",
            Self::Finished => "finished",
            Self::Failed => "failed",
        }
    }

    /// Whether a transfer is outstanding in this phase.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Requesting | Self::Streaming)
    }

    /// Whether this phase ends a transfer.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a session's observable properties.
///
/// Written only by the session's runner; any number of readers may hold a
/// clone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferState {
    /// Target resource.
    pub url: Option<Url>,
    /// Resolved absolute destination; `None` until a transfer resolves it.
    pub output_path: Option<PathBuf>,
    /// Folder used for auto-named destinations.
    pub download_folder: Option<PathBuf>,
    /// Bytes received so far in the current transfer.
    pub bytes_read: u64,
    /// Total bytes as presented to observers (see the session's display ceiling).
    pub bytes_total: u64,
    /// True from an accepted start until the terminal event is processed.
    pub in_progress: bool,
    /// Current state-machine phase.
    pub phase: SessionPhase,
    /// Reason of the most recent failure, cleared when a transfer starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<FailureReason>,
}

impl TransferState {
    /// Progress as a percentage (0.0 - 100.0); zero while the total is unknown.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.bytes_total == 0 {
            0.0
        } else {
            ((self.bytes_read as f64 / self.bytes_total as f64) * 100.0).min(100.0)
        }
    }

    /// File name of the resolved destination, if any.
    #[must_use]
    pub fn output_file_name(&self) -> Option<&str> {
        self.output_path
            .as_deref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
    }
}
