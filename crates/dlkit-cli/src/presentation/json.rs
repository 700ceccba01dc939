//! JSON-lines notification sink.

use std::io::Write;
use std::sync::Mutex;

use dlkit_core::{DownloadEvent, NotificationSink};

/// Writes every event as one JSON object per line.
///
/// Intended for scripts: `dlkit get --json URL | jq .`
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Create a sink writing to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> NotificationSink for JsonLinesSink<W> {
    fn emit(&self, event: DownloadEvent) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let written = serde_json::to_writer(&mut *out, &event)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(out))
            .and_then(|()| out.flush());
        if let Err(e) = written {
            tracing::debug!(error = %e, "Could not write event");
        }
    }
}
