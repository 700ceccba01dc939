//! Download session: one download slot with observable state.
//!
//! # Architecture
//!
//! [`DownloadSession`] is a thin handle. All work happens on a single runner
//! task spawned by [`DownloadSession::spawn`]:
//!
//! - Operations are sent as commands over an mpsc channel and answered via
//!   oneshot. They never wait on network I/O.
//! - The runner owns the open destination file and the outstanding
//!   [`RequestHandle`](dlkit_core::RequestHandle), so file writes and state
//!   transitions are serialized without locks.
//! - State is published through a `watch` channel; property observers are
//!   called synchronously on the runner, in order.
//!
//! Dropping the handle closes the command channel; the runner then cancels
//! any outstanding request, closes the file and exits.

mod config;
mod runner;

use std::path::PathBuf;
use std::sync::Arc;

use dlkit_core::{
    DownloadError, DownloadResult, HttpTransport, NotificationSink, PropertyObserver,
    TransferState,
};
use tokio::sync::{mpsc, oneshot, watch};
use url::Url;

pub use config::{PartialFilePolicy, SessionConfig};
pub use crate::progress::UNKNOWN_TOTAL_DISPLAY_CEILING;

use runner::Runner;

type Reply<T> = oneshot::Sender<T>;

/// Commands processed by the runner task.
pub(crate) enum Command {
    Start {
        reply: Reply<DownloadResult<()>>,
    },
    Cancel {
        reply: Reply<()>,
    },
    Reset {
        reply: Reply<DownloadResult<()>>,
    },
    SetUrl {
        url: Option<Url>,
        reply: Reply<DownloadResult<()>>,
    },
    SetOutputPath {
        path: Option<PathBuf>,
        reply: Reply<DownloadResult<()>>,
    },
    SetDownloadFolder {
        folder: Option<PathBuf>,
        reply: Reply<DownloadResult<()>>,
    },
    AddObserver {
        observer: Arc<dyn PropertyObserver>,
        reply: Reply<()>,
    },
}

/// Handle to a download session.
///
/// # Example
///
/// ```ignore
/// let session = DownloadSession::spawn(config, transport, sink);
/// session.set_url("https://example.test/file.bin").await?;
/// session.set_download_folder(Some("downloads".into())).await?;
/// session.start_download().await?;
/// let state = session.wait_until_idle().await?;
/// ```
#[derive(Debug)]
pub struct DownloadSession {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<TransferState>,
}

impl DownloadSession {
    /// Spawn the runner task and return its handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        config: SessionConfig,
        transport: Arc<dyn HttpTransport>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(config.command_buffer.max(1));
        let (state_tx, state_rx) = watch::channel(TransferState::default());

        let runner = Runner::new(config, transport, sink, state_tx);
        tokio::spawn(runner.run(commands_rx));

        Self {
            commands: commands_tx,
            state: state_rx,
        }
    }

    /// Start downloading the configured URL.
    ///
    /// Returns `Ok` once the transfer was accepted; its outcome is reported
    /// through the notification sink and the state snapshot. A destination
    /// that cannot be opened is such an outcome, not an error here.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::AlreadyDownloading`] if a transfer is running
    /// - [`DownloadError::MissingUrl`] if no URL was configured
    /// - [`DownloadError::SessionClosed`] if the runner is gone
    pub async fn start_download(&self) -> DownloadResult<()> {
        self.request(|reply| Command::Start { reply }).await?
    }

    /// Cancel the running transfer. A no-op when nothing is running.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::SessionClosed`] if the runner is gone.
    pub async fn cancel(&self) -> DownloadResult<()> {
        self.request(|reply| Command::Cancel { reply }).await
    }

    /// Return a finished or failed session to `Idle`, clearing progress.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ConfigurationLocked`] while a transfer runs.
    pub async fn reset(&self) -> DownloadResult<()> {
        self.request(|reply| Command::Reset { reply }).await?
    }

    /// Set the URL to download. An empty string clears it.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::InvalidUrl`] if `url` is not an absolute URL
    /// - [`DownloadError::UnsupportedScheme`] unless the scheme is http(s)
    /// - [`DownloadError::ConfigurationLocked`] while a transfer runs
    pub async fn set_url(&self, url: &str) -> DownloadResult<()> {
        let url = parse_url(url)?;
        self.request(|reply| Command::SetUrl { url, reply }).await?
    }

    /// Set an explicit destination file, or `None` to auto-name in the
    /// download folder. Explicit files are truncated, never disambiguated.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ConfigurationLocked`] while a transfer runs.
    pub async fn set_output_path(&self, path: Option<PathBuf>) -> DownloadResult<()> {
        self.request(|reply| Command::SetOutputPath { path, reply }).await?
    }

    /// Set the folder used for auto-named destinations.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ConfigurationLocked`] while a transfer runs.
    pub async fn set_download_folder(&self, folder: Option<PathBuf>) -> DownloadResult<()> {
        self.request(|reply| Command::SetDownloadFolder { folder, reply }).await?
    }

    /// Register an observer for property changes.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::SessionClosed`] if the runner is gone.
    pub async fn add_property_observer(
        &self,
        observer: Arc<dyn PropertyObserver>,
    ) -> DownloadResult<()> {
        self.request(|reply| Command::AddObserver { observer, reply }).await
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> TransferState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TransferState> {
        self.state.clone()
    }

    /// Wait until no transfer is in progress and return the final snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::SessionClosed`] if the runner exits first.
    pub async fn wait_until_idle(&self) -> DownloadResult<TransferState> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|s| !s.in_progress)
            .await
            .map_err(|_| DownloadError::SessionClosed)?;
        Ok(state.clone())
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> DownloadResult<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| DownloadError::SessionClosed)?;
        rx.await.map_err(|_| DownloadError::SessionClosed)
    }
}

/// Parse a download URL. Blank input yields `None`; only `http` and
/// `https` are accepted.
///
/// # Errors
///
/// [`DownloadError::InvalidUrl`] or [`DownloadError::UnsupportedScheme`].
pub fn parse_url(raw: &str) -> DownloadResult<Option<Url>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let url = Url::parse(raw).map_err(|e| DownloadError::invalid_url(raw, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(Some(url)),
        other => Err(DownloadError::unsupported_scheme(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_http_and_https() {
        assert!(parse_url("http://example.test/a").unwrap().is_some());
        assert!(parse_url("https://example.test/a").unwrap().is_some());
    }

    #[test]
    fn parse_empty_clears() {
        assert_eq!(parse_url("  ").unwrap(), None);
    }

    #[test]
    fn parse_rejects_other_schemes() {
        assert_eq!(
            parse_url("ftp://example.test/a").unwrap_err(),
            DownloadError::unsupported_scheme("ftp")
        );
    }

    #[test]
    fn parse_rejects_relative() {
        assert!(matches!(
            parse_url("file.bin").unwrap_err(),
            DownloadError::InvalidUrl { .. }
        ));
    }
}
