//! Session runner: the single task that owns a session's resources.
//!
//! Every state transition happens here. The loop waits on commands while
//! idle and on commands *and* transport events while a transfer runs;
//! commands win ties so a cancel is never starved by a fast transport.
//!
//! Terminal notifications are emitted before `in_progress` drops, so a
//! caller woken by the flag has already been notified.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dlkit_core::{
    DownloadError, DownloadEvent, DownloadResult, FailureReason, HttpTransport, NotificationSink,
    OutputTarget, PropertyChange, PropertyObserver, RequestHandle, SessionPhase, StatusClass,
    TransferState, TransportEvent,
};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, watch};
use url::Url;

use super::Command;
use super::config::SessionConfig;
use crate::paths;
use crate::progress::{ProgressThrottle, ProgressTracker};

/// Resources of the transfer currently running.
struct ActiveTransfer {
    request: RequestHandle,
    file: File,
    path: PathBuf,
    written: u64,
    tracker: ProgressTracker,
    last_emitted: Option<(u64, u64)>,
}

/// What woke the loop up.
enum Step {
    Command(Option<Command>),
    Transport(Option<TransportEvent>),
}

pub(super) struct Runner {
    config: SessionConfig,
    transport: Arc<dyn HttpTransport>,
    sink: Arc<dyn NotificationSink>,
    observers: Vec<Arc<dyn PropertyObserver>>,
    state_tx: watch::Sender<TransferState>,
    state: TransferState,
    explicit_output: Option<PathBuf>,
    throttle: ProgressThrottle,
    active: Option<ActiveTransfer>,
}

impl Runner {
    pub(super) fn new(
        config: SessionConfig,
        transport: Arc<dyn HttpTransport>,
        sink: Arc<dyn NotificationSink>,
        state_tx: watch::Sender<TransferState>,
    ) -> Self {
        let throttle = ProgressThrottle::new(config.progress_interval);
        Self {
            config,
            transport,
            sink,
            observers: Vec::new(),
            state_tx,
            state: TransferState::default(),
            explicit_output: None,
            throttle,
            active: None,
        }
    }

    /// Process commands and transport events until the handle is dropped.
    pub(super) async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        loop {
            let step = match self.active.as_mut() {
                Some(active) => tokio::select! {
                    biased;

                    cmd = commands.recv() => Step::Command(cmd),
                    event = active.request.next_event() => Step::Transport(event),
                },
                None => Step::Command(commands.recv().await),
            };

            match step {
                Step::Command(Some(cmd)) => self.handle_command(cmd).await,
                Step::Command(None) => {
                    self.shutdown().await;
                    break;
                }
                Step::Transport(Some(event)) => self.handle_transport(event).await,
                Step::Transport(None) => {
                    self.fail_transfer(
                        FailureReason::TransportError,
                        "transport ended the request without a result".to_string(),
                    )
                    .await;
                }
            }
        }
        tracing::debug!(target: "dlkit.download", "Session runner stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        // A dropped reply receiver only means the caller stopped waiting.
        match cmd {
            Command::Start { reply } => {
                let result = self.start().await;
                let _ = reply.send(result);
            }
            Command::Cancel { reply } => {
                if self.active.is_some() {
                    self.cancel_transfer().await;
                }
                let _ = reply.send(());
            }
            Command::Reset { reply } => {
                let _ = reply.send(self.reset());
            }
            Command::SetUrl { url, reply } => {
                let result = self.ensure_idle("url").map(|()| self.set_url(url));
                let _ = reply.send(result);
            }
            Command::SetOutputPath { path, reply } => {
                let result = self.ensure_idle("output path").map(|()| {
                    self.explicit_output.clone_from(&path);
                    self.set_output_path(path);
                });
                let _ = reply.send(result);
            }
            Command::SetDownloadFolder { folder, reply } => {
                let result = self
                    .ensure_idle("download folder")
                    .map(|()| self.set_download_folder(folder));
                let _ = reply.send(result);
            }
            Command::AddObserver { observer, reply } => {
                self.observers.push(observer);
                let _ = reply.send(());
            }
        }
    }

    fn ensure_idle(&self, field: &str) -> DownloadResult<()> {
        if self.state.in_progress {
            tracing::warn!(
                target: "dlkit.download",
                field,
                "Unable to change configuration, a file is downloading"
            );
            return Err(DownloadError::configuration_locked(field));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transfer lifecycle
    // ------------------------------------------------------------------

    async fn start(&mut self) -> DownloadResult<()> {
        if self.state.in_progress {
            tracing::warn!(target: "dlkit.download", "Unable to download file, already downloading");
            self.sink.emit(DownloadEvent::failed(
                FailureReason::AlreadyDownloading,
                "a download is already in progress",
            ));
            return Err(DownloadError::AlreadyDownloading);
        }
        let Some(url) = self.state.url.clone() else {
            tracing::warn!(target: "dlkit.download", "Unable to download file, no URL configured");
            return Err(DownloadError::MissingUrl);
        };

        self.state.last_failure = None;
        self.set_bytes_read(0);
        self.set_bytes_total(0);
        self.set_in_progress(true);

        let target = self.output_target();
        let path = paths::resolve_destination(&target, &url);
        self.set_output_path(Some(path.clone()));

        let file = match open_destination(&path, target.avoids_collisions()).await {
            Ok(file) => file,
            Err(e) => {
                self.finish_failed(
                    FailureReason::CannotOpenDestination,
                    format!("could not open {} for writing: {e}", path.display()),
                );
                return Ok(());
            }
        };

        let request = self.transport.start_get(&url);
        tracing::info!(
            target: "dlkit.download",
            request = %request.id(),
            url = %url,
            path = %path.display(),
            "Download started"
        );

        self.throttle.reset();
        self.active = Some(ActiveTransfer {
            request,
            file,
            path: path.clone(),
            written: 0,
            tracker: ProgressTracker::new(),
            last_emitted: None,
        });
        self.set_phase(SessionPhase::Requesting);
        self.sink.emit(DownloadEvent::DownloadStarted {
            url,
            output_path: path,
        });
        Ok(())
    }

    /// Explicit path if configured, otherwise the download folder (falling
    /// back to the configured default, then the working directory).
    fn output_target(&mut self) -> OutputTarget {
        if let Some(path) = &self.explicit_output {
            return OutputTarget::Explicit(path.clone());
        }
        let folder = match &self.state.download_folder {
            Some(folder) => folder.clone(),
            None => {
                let fallback = self
                    .config
                    .default_download_folder
                    .clone()
                    .or_else(|| std::env::current_dir().ok())
                    .unwrap_or_else(|| PathBuf::from("."));
                self.set_download_folder(Some(fallback.clone()));
                fallback
            }
        };
        OutputTarget::Folder(folder)
    }

    async fn handle_transport(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::BodyChunk(bytes) => self.write_chunk(&bytes).await,
            TransportEvent::Progress { read, total } => self.record_progress(read, total),
            TransportEvent::TlsWarning(warnings) => {
                for warning in &warnings {
                    tracing::warn!(target: "dlkit.download", warning = %warning, "TLS warning");
                }
                self.sink.emit(DownloadEvent::TlsWarnings { warnings });
            }
            TransportEvent::Completed { status } => match StatusClass::of(status) {
                StatusClass::Success => self.finish_transfer().await,
                StatusClass::Redirect => {
                    self.fail_transfer(
                        FailureReason::Redirected,
                        format!("request was redirected (HTTP {status})"),
                    )
                    .await;
                }
                StatusClass::Error => {
                    self.fail_transfer(
                        FailureReason::TransportError,
                        format!("server answered HTTP {status}"),
                    )
                    .await;
                }
            },
            TransportEvent::Redirected { status, location } => {
                let message = location.map_or_else(
                    || format!("request was redirected (HTTP {status})"),
                    |to| format!("request was redirected (HTTP {status}) to {to}"),
                );
                self.fail_transfer(FailureReason::Redirected, message).await;
            }
            TransportEvent::TransportError { message } => {
                self.fail_transfer(FailureReason::TransportError, message).await;
            }
        }
    }

    async fn write_chunk(&mut self, bytes: &[u8]) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let written = active.file.write_all(bytes).await;
        if let Err(e) = written {
            let message = format!("could not write to {}: {e}", active.path.display());
            self.fail_transfer(FailureReason::DestinationWriteFailed, message).await;
            return;
        }
        active.written += bytes.len() as u64;
        tracing::debug!(
            target: "dlkit.download",
            chunk = bytes.len(),
            written = active.written,
            "Chunk written"
        );
        if self.state.phase == SessionPhase::Requesting {
            self.set_phase(SessionPhase::Streaming);
        }
    }

    fn record_progress(&mut self, read: u64, total: Option<u64>) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let (read, total) = active.tracker.apply(read, total);
        let emit = self.throttle.should_emit();
        if emit {
            active.last_emitted = Some((read, total));
        }

        self.set_bytes_read(read);
        self.set_bytes_total(total);
        if emit {
            self.sink.emit(DownloadEvent::progress(read, total));
        }
    }

    async fn finish_transfer(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        if let Err(e) = close_file(&mut active.file).await {
            let message = format!("could not flush {}: {e}", active.path.display());
            self.finish_failed(FailureReason::DestinationWriteFailed, message);
            return;
        }
        drop(active.file);

        // Observers must see the last progress even if the throttle ate it.
        let last = (active.tracker.read(), active.tracker.total());
        if active.last_emitted != Some(last) && last != (0, 0) {
            self.sink.emit(DownloadEvent::progress(last.0, last.1));
        }

        tracing::info!(
            target: "dlkit.download",
            request = %active.request.id(),
            path = %active.path.display(),
            bytes = active.written,
            "Download finished"
        );
        self.set_phase(SessionPhase::Finished);
        self.sink.emit(DownloadEvent::DownloadFinished {
            output_path: active.path,
            bytes: active.written,
        });
        self.set_in_progress(false);
    }

    /// Abort the running transfer with `reason`. The file is kept.
    async fn fail_transfer(&mut self, reason: FailureReason, message: String) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        active.request.cancel();
        if let Err(e) = close_file(&mut active.file).await {
            tracing::debug!(
                target: "dlkit.download",
                path = %active.path.display(),
                error = %e,
                "Flush of partial file failed"
            );
        }
        self.finish_failed(reason, message);
    }

    /// Cancel the running transfer and apply the partial-file policy.
    async fn cancel_transfer(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        active.request.cancel();
        let _ = close_file(&mut active.file).await;
        drop(active.file);

        if self.config.partial_file_policy.discards() {
            if let Err(e) = tokio::fs::remove_file(&active.path).await {
                tracing::warn!(
                    target: "dlkit.download",
                    path = %active.path.display(),
                    error = %e,
                    "Could not remove partial file"
                );
            }
        }
        self.finish_failed(FailureReason::Cancelled, "download cancelled".to_string());
    }

    fn finish_failed(&mut self, reason: FailureReason, message: String) {
        if reason.is_cancelled() {
            tracing::info!(
                target: "dlkit.download",
                url = self.state.url.as_ref().map_or("", Url::as_str),
                "Download cancelled"
            );
        } else {
            tracing::warn!(
                target: "dlkit.download",
                reason = %reason,
                message = %message,
                "Download failed"
            );
        }
        self.state.last_failure = Some(reason);
        self.set_phase(SessionPhase::Failed);
        self.sink.emit(DownloadEvent::failed(reason, message));
        self.set_in_progress(false);
    }

    fn reset(&mut self) -> DownloadResult<()> {
        self.ensure_idle("session")?;
        self.state.last_failure = None;
        self.set_bytes_read(0);
        self.set_bytes_total(0);
        let output = self.explicit_output.clone();
        self.set_output_path(output);
        self.set_phase(SessionPhase::Idle);
        self.publish_snapshot();
        Ok(())
    }

    async fn shutdown(&mut self) {
        if self.active.is_some() {
            tracing::info!(target: "dlkit.download", "Session dropped during a download");
            self.cancel_transfer().await;
        }
    }

    // ------------------------------------------------------------------
    // Observable properties
    // ------------------------------------------------------------------

    fn publish(&self, change: &PropertyChange) {
        self.publish_snapshot();
        for observer in &self.observers {
            observer.on_property_changed(change);
        }
    }

    fn publish_snapshot(&self) {
        self.state_tx.send_replace(self.state.clone());
    }

    fn set_url(&mut self, url: Option<Url>) {
        if self.state.url != url {
            self.state.url.clone_from(&url);
            self.publish(&PropertyChange::Url(url));
        }
    }

    fn set_output_path(&mut self, path: Option<PathBuf>) {
        if self.state.output_path != path {
            self.state.output_path.clone_from(&path);
            self.publish(&PropertyChange::OutputPath(path));
        }
    }

    fn set_download_folder(&mut self, folder: Option<PathBuf>) {
        if self.state.download_folder != folder {
            self.state.download_folder.clone_from(&folder);
            self.publish(&PropertyChange::DownloadFolder(folder));
        }
    }

    fn set_bytes_read(&mut self, read: u64) {
        if self.state.bytes_read != read {
            self.state.bytes_read = read;
            self.publish(&PropertyChange::BytesRead(read));
        }
    }

    fn set_bytes_total(&mut self, total: u64) {
        if self.state.bytes_total != total {
            self.state.bytes_total = total;
            self.publish(&PropertyChange::BytesTotal(total));
        }
    }

    fn set_in_progress(&mut self, in_progress: bool) {
        if self.state.in_progress != in_progress {
            self.state.in_progress = in_progress;
            self.publish(&PropertyChange::InProgress(in_progress));
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.state.phase != phase {
            self.state.phase = phase;
            self.publish(&PropertyChange::Phase(phase));
        }
    }
}

/// Open the destination for writing.
///
/// Auto-named files must not exist yet; explicit files are truncated.
async fn open_destination(path: &Path, create_new: bool) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if create_new {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }
    options.open(path).await
}

async fn close_file(file: &mut File) -> std::io::Result<()> {
    file.flush().await
}
