//! Resolve command handler.
//!
//! Prints the path `get` would write to right now. Nothing is created, so a
//! file appearing in between can still shift the final name.

use std::path::Path;

use dlkit_core::{DownloadError, OutputTarget};
use dlkit_download::{parse_url, resolve_destination};

use crate::bootstrap::resolve_download_dir;
use crate::error::CliError;

/// Execute the resolve command.
pub fn execute(url: &str, dir: Option<&Path>) -> Result<(), CliError> {
    let path = destination_for(url, dir)?;
    println!("{}", path.display());
    Ok(())
}

fn destination_for(url: &str, dir: Option<&Path>) -> Result<std::path::PathBuf, CliError> {
    let url = parse_url(url)?.ok_or(DownloadError::MissingUrl)?;
    let folder = resolve_download_dir(dir);
    Ok(resolve_destination(&OutputTarget::Folder(folder), &url))
}
