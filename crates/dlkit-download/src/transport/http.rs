//! reqwest-backed transport.

use std::error::Error as _;
use std::sync::atomic::{AtomicU64, Ordering};

use dlkit_core::{
    HttpTransport, RequestHandle, RequestId, StatusClass, TransportEvent, TransportEventSender,
};
use futures_util::StreamExt;
use reqwest::header::LOCATION;
use url::Url;

use super::{ReqwestTransportConfig, TransportBuildError};

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
///
/// Redirect following is disabled on the client so that redirect statuses
/// reach the session unchanged.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    accept_invalid_certs: bool,
    event_buffer: usize,
    next_id: AtomicU64,
}

impl ReqwestTransport {
    /// Build a transport from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportBuildError::Client`] if the client cannot be built.
    pub fn new(config: &ReqwestTransportConfig) -> Result<Self, TransportBuildError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(config.connect_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(timeout) = config.read_timeout {
            builder = builder.read_timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            accept_invalid_certs: config.accept_invalid_certs,
            event_buffer: config.event_buffer,
            next_id: AtomicU64::new(1),
        })
    }

    fn tls_warnings(&self, url: &Url) -> Vec<String> {
        if self.accept_invalid_certs && url.scheme() == "https" {
            vec![format!(
                "certificate validation is disabled for {}",
                url.host_str().unwrap_or("<unknown host>")
            )]
        } else {
            Vec::new()
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn start_get(&self, url: &Url) -> RequestHandle {
        let id = RequestId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (handle, events) = RequestHandle::channel(id, self.event_buffer);

        let request = self.client.get(url.clone());
        let warnings = self.tls_warnings(url);
        tokio::spawn(async move {
            tokio::select! {
                biased;

                () = events.cancelled() => {
                    tracing::debug!(target: "dlkit.transport", request = %events.id(), "Request cancelled");
                }
                () = stream_response(request, &events, warnings) => {}
            }
        });

        handle
    }
}

/// Perform the GET and forward everything to `events`.
///
/// Returns early as soon as the session stops listening.
async fn stream_response(
    request: reqwest::RequestBuilder,
    events: &TransportEventSender,
    tls_warnings: Vec<String>,
) {
    if !tls_warnings.is_empty() && !events.send(TransportEvent::TlsWarning(tls_warnings)).await {
        return;
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            events.send(TransportEvent::error(describe(&e))).await;
            return;
        }
    };

    let status = response.status().as_u16();
    tracing::debug!(target: "dlkit.transport", request = %events.id(), status, "Response received");

    match StatusClass::of(status) {
        StatusClass::Success => {}
        StatusClass::Redirect => {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            events
                .send(TransportEvent::Redirected { status, location })
                .await;
            return;
        }
        // The error body is not part of the download.
        StatusClass::Error => {
            events.send(TransportEvent::Completed { status }).await;
            return;
        }
    }

    let total = response.content_length();
    let mut read: u64 = 0;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                read += bytes.len() as u64;
                if !events.send(TransportEvent::BodyChunk(bytes)).await
                    || !events.send(TransportEvent::Progress { read, total }).await
                {
                    return;
                }
            }
            Err(e) => {
                events.send(TransportEvent::error(describe(&e))).await;
                return;
            }
        }
    }

    events.send(TransportEvent::Completed { status }).await;
}

/// Render a reqwest error including its source chain.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
