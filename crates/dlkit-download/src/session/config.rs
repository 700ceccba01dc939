//! Session configuration.

use std::path::PathBuf;
use std::time::Duration;

/// What happens to a partially written file when a transfer is cancelled
/// or the session is dropped mid-transfer.
///
/// Failures (transport errors, redirects, write errors) always keep the
/// file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartialFilePolicy {
    /// Keep whatever was written.
    Retain,
    /// Remove the file after closing it.
    #[default]
    Discard,
}

impl PartialFilePolicy {
    /// Whether the partial file is removed.
    #[must_use]
    pub const fn discards(self) -> bool {
        matches!(self, Self::Discard)
    }
}

/// Configuration for a [`DownloadSession`](super::DownloadSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Folder used when neither an explicit path nor a download folder was
    /// configured on the session.
    pub default_download_folder: Option<PathBuf>,
    /// Cleanup behavior on cancel/drop.
    pub partial_file_policy: PartialFilePolicy,
    /// Minimum delay between `DownloadProgress` notifications.
    pub progress_interval: Duration,
    /// Capacity of the command channel between handle and runner.
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_download_folder: None,
            partial_file_policy: PartialFilePolicy::default(),
            progress_interval: Duration::from_millis(100),
            command_buffer: 16,
        }
    }
}

impl SessionConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback download folder.
    #[must_use]
    pub fn with_default_download_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.default_download_folder = Some(folder.into());
        self
    }

    /// Set the partial-file policy.
    #[must_use]
    pub const fn with_partial_file_policy(mut self, policy: PartialFilePolicy) -> Self {
        self.partial_file_policy = policy;
        self
    }

    /// Set the progress notification interval. `Duration::ZERO` disables
    /// throttling.
    #[must_use]
    pub const fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Set the command channel capacity (minimum 1).
    #[must_use]
    pub fn with_command_buffer(mut self, capacity: usize) -> Self {
        self.command_buffer = capacity.max(1);
        self
    }
}
