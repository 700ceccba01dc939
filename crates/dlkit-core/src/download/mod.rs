//! Download domain types, events, errors, and state.
//!
//! This module contains pure data types for the download system. No
//! networking or filesystem access allowed.
//!
//! # Structure
//!
//! - `types` - Output targets and HTTP status classification
//! - `state` - `TransferState` snapshot and `SessionPhase`
//! - `events` - Lifecycle events (`DownloadEvent`) and `PropertyChange`
//! - `errors` - Usage errors (`DownloadError`) and failure reason codes

pub mod errors;
pub mod events;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use errors::{DownloadError, DownloadResult, FailureReason};
pub use events::{DownloadEvent, PropertyChange};
pub use state::{SessionPhase, TransferState};
pub use types::{OutputTarget, REDIRECT_STATUS_CODES, StatusClass, is_redirect_status};
