//! Integration tests for the reqwest transport against a local mock server.

use std::sync::Arc;
use std::time::Duration;

use dlkit_core::{
    DownloadEvent, FailureReason, HttpTransport, NoopNotificationSink, RequestHandle,
    SessionPhase, TransportEvent,
};
use dlkit_download::{DownloadSession, ReqwestTransport, ReqwestTransportConfig, SessionConfig};
use httpmock::prelude::*;
use url::Url;

fn transport() -> ReqwestTransport {
    ReqwestTransport::new(&ReqwestTransportConfig::new()).unwrap()
}

async fn collect(mut handle: RequestHandle) -> Vec<TransportEvent> {
    let mut events = Vec::new();
    let drain = async {
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }
    };
    tokio::time::timeout(Duration::from_secs(10), drain)
        .await
        .expect("transport never finished");
    events
}

fn body_of(events: &[TransportEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            TransportEvent::BodyChunk(bytes) => Some(bytes.to_vec()),
            _ => None,
        })
        .flatten()
        .collect()
}

#[tokio::test]
async fn test_success_streams_body_then_completes() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/file.bin");
            then.status(200).body("hello world");
        })
        .await;

    let url = Url::parse(&server.url("/file.bin")).unwrap();
    let events = collect(transport().start_get(&url)).await;

    mock.assert_async().await;
    assert_eq!(body_of(&events), b"hello world");
    assert!(events.contains(&TransportEvent::Progress {
        read: 11,
        total: Some(11),
    }));
    assert_eq!(events.last(), Some(&TransportEvent::Completed { status: 200 }));
}

#[tokio::test]
async fn test_redirect_is_reported_not_followed() {
    let server = MockServer::start_async().await;
    let redirect = server
        .mock_async(|when, then| {
            when.method(GET).path("/old");
            then.status(302).header("Location", "/new");
        })
        .await;
    let target = server
        .mock_async(|when, then| {
            when.method(GET).path("/new");
            then.status(200).body("moved");
        })
        .await;

    let url = Url::parse(&server.url("/old")).unwrap();
    let events = collect(transport().start_get(&url)).await;

    redirect.assert_async().await;
    assert_eq!(target.hits_async().await, 0);
    assert_eq!(
        events,
        vec![TransportEvent::Redirected {
            status: 302,
            location: Some("/new".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_error_status_skips_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("not found page");
        })
        .await;

    let url = Url::parse(&server.url("/missing")).unwrap();
    let events = collect(transport().start_get(&url)).await;

    assert_eq!(events, vec![TransportEvent::Completed { status: 404 }]);
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    // Nothing listens on the discard port
    let url = Url::parse("http://127.0.0.1:9/file.bin").unwrap();
    let events = collect(transport().start_get(&url)).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], TransportEvent::TransportError { .. }));
}

#[tokio::test]
async fn test_cancel_silences_slow_request() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .body("late")
                .delay(Duration::from_secs(30));
        })
        .await;

    let url = Url::parse(&server.url("/slow")).unwrap();
    let mut handle = transport().start_get(&url);
    handle.cancel();

    assert_eq!(handle.next_event().await, None);
}

#[tokio::test]
async fn test_request_ids_are_unique() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200);
        })
        .await;

    let transport = transport();
    let url = Url::parse(&server.url("/a")).unwrap();
    let first = transport.start_get(&url);
    let second = transport.start_get(&url);
    assert_ne!(first.id(), second.id());
}

#[tokio::test]
async fn test_session_downloads_through_reqwest() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains("report");
            then.status(200).body("quarterly numbers");
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session = DownloadSession::spawn(
        SessionConfig::new(),
        Arc::new(transport()),
        Arc::new(NoopNotificationSink::new()),
    );

    session
        .set_url(&server.url("/files/report%20final.txt"))
        .await
        .unwrap();
    session
        .set_download_folder(Some(dir.path().to_path_buf()))
        .await
        .unwrap();
    session.start_download().await.unwrap();

    let state = tokio::time::timeout(Duration::from_secs(10), session.wait_until_idle())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(state.phase, SessionPhase::Finished);
    let path = dir.path().join("report final.txt");
    assert_eq!(state.output_path, Some(path.clone()));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "quarterly numbers");
    assert_eq!(state.bytes_read, 17);
}

#[tokio::test]
async fn test_session_reports_redirect_from_server() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/moved.bin");
            then.status(301).header("Location", "https://elsewhere.test/moved.bin");
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (sink, mut events) = dlkit_core::ChannelNotificationSink::new();
    let session =
        DownloadSession::spawn(SessionConfig::new(), Arc::new(transport()), Arc::new(sink));

    session.set_url(&server.url("/moved.bin")).await.unwrap();
    session
        .set_download_folder(Some(dir.path().to_path_buf()))
        .await
        .unwrap();
    session.start_download().await.unwrap();
    let state = session.wait_until_idle().await.unwrap();

    assert_eq!(state.last_failure, Some(FailureReason::Redirected));
    assert!(dir.path().join("moved.bin").exists());

    let mut reasons = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let DownloadEvent::DownloadFailed { reason, .. } = event {
            reasons.push(reason);
        }
    }
    assert_eq!(reasons, vec![FailureReason::Redirected]);
}
