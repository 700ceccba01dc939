//! Core domain types for downloads.
//!
//! Pure data types with no I/O dependencies.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// HTTP status codes classified as redirects. Redirects are never followed.
pub const REDIRECT_STATUS_CODES: [u16; 6] = [301, 302, 303, 305, 307, 308];

/// Where a transfer writes its body.
///
/// The two intents are mutually exclusive: an explicit path is used as-is,
/// a folder gets an auto-named, collision-free file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "path", rename_all = "snake_case")]
pub enum OutputTarget {
    /// Exact file destination, no collision check.
    Explicit(PathBuf),
    /// Directory in which a name is derived from the URL.
    Folder(PathBuf),
}

impl OutputTarget {
    /// The configured path (file or folder).
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Explicit(path) | Self::Folder(path) => path,
        }
    }

    /// Whether collision avoidance applies to this target.
    #[must_use]
    pub const fn avoids_collisions(&self) -> bool {
        matches!(self, Self::Folder(_))
    }
}

/// Classification of a terminal HTTP status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    /// 2xx.
    Success,
    /// One of [`REDIRECT_STATUS_CODES`].
    Redirect,
    /// Anything else.
    Error,
}

impl StatusClass {
    /// Classify an HTTP status code.
    #[must_use]
    pub fn of(status: u16) -> Self {
        if is_redirect_status(status) {
            Self::Redirect
        } else if (200..300).contains(&status) {
            Self::Success
        } else {
            Self::Error
        }
    }
}

/// Check whether a status code is in the redirect set.
#[must_use]
pub fn is_redirect_status(status: u16) -> bool {
    REDIRECT_STATUS_CODES.contains(&status)
}
