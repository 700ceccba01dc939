//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter: the reqwest transport, the session and whichever
//! notification sink the presentation layer picked.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dlkit_core::NotificationSink;
use dlkit_download::{
    DownloadSession, PartialFilePolicy, ReqwestTransport, ReqwestTransportConfig, SessionConfig,
};

use crate::error::CliError;
use crate::parser::GetArgs;

/// Bootstrap configuration for one CLI download.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Folder used for auto-named files.
    pub download_dir: PathBuf,
    /// HTTP client settings.
    pub transport: ReqwestTransportConfig,
    /// What to do with a partial file on Ctrl-C.
    pub partial_file_policy: PartialFilePolicy,
}

impl CliConfig {
    /// Build the configuration from `get` arguments.
    pub fn from_args(args: &GetArgs) -> Self {
        let read_timeout = (args.read_timeout > 0).then(|| Duration::from_secs(args.read_timeout));
        let mut transport = ReqwestTransportConfig::new()
            .with_connect_timeout(Duration::from_secs(args.connect_timeout))
            .with_read_timeout(read_timeout)
            .with_accept_invalid_certs(args.insecure);
        if let Some(user_agent) = &args.user_agent {
            transport = transport.with_user_agent(user_agent.clone());
        }

        let partial_file_policy = if args.keep_partial {
            PartialFilePolicy::Retain
        } else {
            PartialFilePolicy::Discard
        };

        Self {
            download_dir: resolve_download_dir(args.dir.as_deref()),
            transport,
            partial_file_policy,
        }
    }
}

/// The folder auto-named downloads go to: the explicit choice, else the
/// user's download folder, else the working directory.
pub fn resolve_download_dir(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(dirs::download_dir)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Compose a session for `config`, reporting to `sink`.
pub fn bootstrap(
    config: &CliConfig,
    sink: Arc<dyn NotificationSink>,
) -> Result<DownloadSession, CliError> {
    let transport = ReqwestTransport::new(&config.transport)?;
    tracing::debug!(
        user_agent = config.transport.user_agent(),
        download_dir = %config.download_dir.display(),
        "Transport ready"
    );

    let session_config = SessionConfig::new()
        .with_default_download_folder(&config.download_dir)
        .with_partial_file_policy(config.partial_file_policy);
    Ok(DownloadSession::spawn(session_config, Arc::new(transport), sink))
}
