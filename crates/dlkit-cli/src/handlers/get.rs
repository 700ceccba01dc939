//! Get command handler.
//!
//! Configures one session, starts it and waits for the terminal event.
//! Ctrl-C cancels the transfer; the partial file is then handled according
//! to `--keep-partial`.

use std::path::PathBuf;
use std::sync::Arc;

use dlkit_core::{FailureReason, NotificationSink, SessionPhase, TransferState};
use dlkit_download::DownloadSession;

use crate::bootstrap::{CliConfig, bootstrap};
use crate::error::CliError;
use crate::parser::GetArgs;
use crate::presentation::{ConsoleSink, JsonLinesSink};

/// Execute the get command.
///
/// On success the written path is printed to stdout, unless `--json` is
/// set, in which case the event stream already carries it.
pub async fn execute(args: &GetArgs) -> Result<(), CliError> {
    let config = CliConfig::from_args(args);
    let sink: Arc<dyn NotificationSink> = if args.json {
        Arc::new(JsonLinesSink::new(std::io::stdout()))
    } else {
        Arc::new(ConsoleSink::new())
    };
    let session = bootstrap(&config, sink)?;

    let path = download(&session, args, &config).await?;
    if !args.json {
        println!("{}", path.display());
    }
    Ok(())
}

async fn download(
    session: &DownloadSession,
    args: &GetArgs,
    config: &CliConfig,
) -> Result<PathBuf, CliError> {
    session.set_url(&args.url).await?;
    match &args.output {
        Some(path) => session.set_output_path(Some(path.clone())).await?,
        None => {
            session
                .set_download_folder(Some(config.download_dir.clone()))
                .await?;
        }
    }

    session.start_download().await?;

    let state = tokio::select! {
        state = session.wait_until_idle() => state?,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::info!(url = %args.url, "Interrupted, cancelling download");
            session.cancel().await?;
            session.wait_until_idle().await?
        }
    };
    outcome(&state)
}

/// Map the settled state to the command result.
fn outcome(state: &TransferState) -> Result<PathBuf, CliError> {
    match state.phase {
        SessionPhase::Finished => state
            .output_path
            .clone()
            .ok_or_else(|| CliError::Internal("finished without an output path".to_string())),
        _ => Err(CliError::Download {
            reason: state.last_failure.unwrap_or(FailureReason::TransportError),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finished_returns_path() {
        let state = TransferState {
            phase: SessionPhase::Finished,
            output_path: Some(PathBuf::from("/tmp/a.bin")),
            ..TransferState::default()
        };
        assert_eq!(outcome(&state).unwrap(), PathBuf::from("/tmp/a.bin"));
    }

    #[test]
    fn test_failed_maps_reason() {
        let state = TransferState {
            phase: SessionPhase::Failed,
            last_failure: Some(FailureReason::Cancelled),
            ..TransferState::default()
        };
        let err = outcome(&state).unwrap_err();
        assert_eq!(err.exit_code(), 130);
    }
}
