//! Download sessions for dlkit.
//!
//! - `paths` - destination resolution and collision-free naming
//! - `progress` - monotone progress tracking and notification throttling
//! - `session` - [`DownloadSession`], the single-slot download state machine
//! - `transport` - [`ReqwestTransport`], the production HTTP adapter
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings; these are used by tests/
#[cfg(test)]
use bytes as _;
#[cfg(test)]
use httpmock as _;
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;

// Re-export core types for convenience
pub use dlkit_core::{
    DownloadError, DownloadEvent, DownloadResult, FailureReason, OutputTarget, PropertyChange,
    SessionPhase, TransferState,
};

pub mod paths;
pub mod progress;
pub mod session;
pub mod transport;

pub use paths::{DEFAULT_FILE_NAME, resolve_destination};
pub use progress::ProgressThrottle;
pub use session::{
    DownloadSession, PartialFilePolicy, SessionConfig, UNKNOWN_TOTAL_DISPLAY_CEILING, parse_url,
};
pub use transport::{ReqwestTransport, ReqwestTransportConfig, TransportBuildError};
