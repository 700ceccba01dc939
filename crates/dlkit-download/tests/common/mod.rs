//! Shared fixtures for session integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dlkit_core::{
    ChannelNotificationSink, DownloadEvent, HttpTransport, RequestHandle, RequestId,
    TransferState, TransportEvent, TransportEventSender,
};
use dlkit_download::{DownloadSession, SessionConfig};
use tempfile::TempDir;
use tokio::sync::mpsc;
use url::Url;

/// Transport that hands every request's sender to the test, which then
/// plays the server.
pub struct ScriptedTransport {
    requests: mpsc::UnboundedSender<(Url, TransportEventSender)>,
    next_id: AtomicU64,
}

impl ScriptedTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(Url, TransportEventSender)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                requests: tx,
                next_id: AtomicU64::new(1),
            },
            rx,
        )
    }
}

impl HttpTransport for ScriptedTransport {
    fn start_get(&self, url: &Url) -> RequestHandle {
        let id = RequestId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (handle, sender) = RequestHandle::channel(id, 64);
        self.requests
            .send((url.clone(), sender))
            .expect("test dropped the request receiver");
        handle
    }
}

/// A session wired to a scripted transport and a channel sink.
pub struct Harness {
    pub session: DownloadSession,
    pub requests: mpsc::UnboundedReceiver<(Url, TransportEventSender)>,
    pub events: mpsc::UnboundedReceiver<DownloadEvent>,
    pub dir: TempDir,
}

impl Harness {
    /// Progress is never throttled so event sequences are deterministic.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::new().with_progress_interval(Duration::ZERO))
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let (transport, requests) = ScriptedTransport::new();
        let (sink, events) = ChannelNotificationSink::new();
        let session = DownloadSession::spawn(config, Arc::new(transport), Arc::new(sink));
        Self {
            session,
            requests,
            events,
            dir: TempDir::new().unwrap(),
        }
    }

    /// Configure `url` into the harness folder and start.
    pub async fn start(&mut self, url: &str) -> TransportEventSender {
        self.session.set_url(url).await.unwrap();
        self.session
            .set_download_folder(Some(self.dir.path().to_path_buf()))
            .await
            .unwrap();
        self.session.start_download().await.unwrap();
        self.next_request().await
    }

    pub async fn next_request(&mut self) -> TransportEventSender {
        let (_, sender) = tokio::time::timeout(Duration::from_secs(5), self.requests.recv())
            .await
            .expect("no request issued")
            .expect("transport gone");
        sender
    }

    pub async fn finish(&self) -> TransferState {
        tokio::time::timeout(Duration::from_secs(5), self.session.wait_until_idle())
            .await
            .expect("transfer did not finish")
            .unwrap()
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for(&self, predicate: impl FnMut(&TransferState) -> bool) {
        let mut rx = self.session.subscribe();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
            .await
            .expect("state never reached")
            .unwrap();
    }

    /// Every notification emitted so far.
    pub fn drain_events(&mut self) -> Vec<DownloadEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

pub async fn send_all(sender: &TransportEventSender, events: Vec<TransportEvent>) {
    for event in events {
        assert!(sender.send(event).await, "session stopped listening");
    }
}
