//! Terminal progress rendering for downloads.
//!
//! Draws an indicatif bar on stderr; indicatif hides it automatically when
//! stderr is not a terminal, in which case only the summary lines remain.

use std::fmt::Write as _;

use dlkit_core::{DownloadEvent, FailureReason, NotificationSink};
use dlkit_download::UNKNOWN_TOTAL_DISPLAY_CEILING;
use indicatif::{HumanBytes, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};

/// Notification sink showing a progress bar and one-line outcomes.
#[derive(Debug)]
pub struct ConsoleSink {
    bar: ProgressBar,
}

impl ConsoleSink {
    /// Create a sink drawing to stderr.
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// Create a sink drawing to `target`.
    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(None, target);
        bar.set_style(spinner_style());
        Self { bar }
    }

    fn update(&self, read: u64, total: u64) {
        // The ceiling only stands in for an unknown size; show a spinner.
        if total == UNKNOWN_TOTAL_DISPLAY_CEILING && read < total {
            self.bar.set_style(spinner_style());
            self.bar.set_length(0);
        } else if self.bar.length() != Some(total) {
            self.bar.set_style(bar_style());
            self.bar.set_length(total);
        }
        self.bar.set_position(read);
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for ConsoleSink {
    fn emit(&self, event: DownloadEvent) {
        match event {
            DownloadEvent::DownloadStarted { url, output_path } => {
                let name = output_path
                    .file_name()
                    .map_or_else(|| url.to_string(), |n| n.to_string_lossy().into_owned());
                self.bar.set_message(name);
            }
            DownloadEvent::DownloadProgress { read, total } => self.update(read, total),
            DownloadEvent::TlsWarnings { warnings } => {
                for warning in warnings {
                    self.bar.suspend(|| eprintln!("warning: {warning}"));
                }
            }
            DownloadEvent::DownloadFinished { output_path, bytes } => {
                self.bar.finish_and_clear();
                eprintln!("Saved {} to {}", HumanBytes(bytes), output_path.display());
            }
            DownloadEvent::DownloadFailed { reason, message } => {
                if reason == FailureReason::AlreadyDownloading {
                    return;
                }
                self.bar.abandon();
                eprintln!("{} ({message})", reason.user_message());
            }
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} {msg} {human_bytes}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .with_key("human_bytes", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{}", HumanBytes(state.pos()));
        })
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{msg} {bar:28.cyan/blue} {bytes:>9} / {total_bytes:>9} ({percent:>3}%) @ {binary_bytes_per_sec} ETA {eta}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}
