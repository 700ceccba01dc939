//! Destination path resolution.
//!
//! Turns an [`OutputTarget`] and a URL into the absolute path a transfer
//! writes to. Folder targets get a name derived from the URL and, when that
//! name is taken, a numbered variant (`file(1).bin`, `file(2).bin`, ...).
//! The filesystem is only consulted to test for existence.

use std::path::{Path, PathBuf};

use dlkit_core::OutputTarget;
use url::Url;

/// File name used when the URL path yields nothing usable.
pub const DEFAULT_FILE_NAME: &str = "download";

/// Compute the destination for a transfer of `url` into `target`.
///
/// Explicit paths are used as given (made absolute, never disambiguated).
/// Folder targets get a collision-free name that did not exist at the time
/// of the call.
#[must_use]
pub fn resolve_destination(target: &OutputTarget, url: &Url) -> PathBuf {
    match target {
        OutputTarget::Explicit(path) => make_absolute(path),
        OutputTarget::Folder(dir) => {
            let name = file_name_from_url(url);
            disambiguate(&make_absolute(dir), &name)
        }
    }
}

/// Derive a file name from the last segment of the URL path.
///
/// The segment is percent-decoded. Empty names, `.`/`..` and names that
/// would escape the folder fall back to [`DEFAULT_FILE_NAME`].
#[must_use]
pub fn file_name_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(Iterator::last)
        .unwrap_or_default();

    let decoded = urlencoding::decode_binary(segment.as_bytes());
    let name = String::from_utf8_lossy(&decoded);

    if is_usable_name(&name) {
        name.into_owned()
    } else {
        DEFAULT_FILE_NAME.to_string()
    }
}

fn is_usable_name(name: &str) -> bool {
    !(name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']))
}

/// Return `dir/name`, or the first free `dir/base(N)suffix` for N = 1, 2, ...
///
/// `base` is the name up to its first `.` and `suffix` the remainder
/// including that dot, so `archive.tar.gz` becomes `archive(1).tar.gz`.
/// A dangling symlink counts as taken.
#[must_use]
pub fn disambiguate(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !exists(&candidate) {
        return candidate;
    }

    let (base, suffix) = split_name(name);
    let mut counter: u64 = 1;
    loop {
        let candidate = dir.join(format!("{base}({counter}){suffix}"));
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Split a file name at its first dot.
fn split_name(name: &str) -> (&str, &str) {
    let (base, suffix) = name.find('.').map_or((name, ""), |idx| name.split_at(idx));
    if base.is_empty() {
        (DEFAULT_FILE_NAME, suffix)
    } else {
        (base, suffix)
    }
}

fn exists(path: &Path) -> bool {
    // symlink_metadata so that dangling links are not reused
    path.symlink_metadata().is_ok()
}

fn make_absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
