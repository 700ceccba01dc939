//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for dlkit.
#[derive(Parser, Debug)]
#[command(name = "dlkit")]
#[command(about = "Download files over HTTP(S) without clobbering existing ones")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a URL into a folder (auto-named) or to an explicit file
    Get(GetArgs),

    /// Print the path a download of URL would be written to, without downloading
    Resolve {
        /// URL to resolve
        url: String,

        /// Folder for the auto-named file
        #[arg(short = 'd', long = "dir", env = "DLKIT_DOWNLOAD_DIR")]
        dir: Option<PathBuf>,
    },
}

/// Arguments of the `get` command.
#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// URL to download (http or https)
    pub url: String,

    /// Write to this exact file, truncating it if it exists (takes
    /// precedence over --dir)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Folder for the auto-named file (default: the user's download folder)
    #[arg(short = 'd', long = "dir", env = "DLKIT_DOWNLOAD_DIR")]
    pub dir: Option<PathBuf>,

    /// User agent sent with the request
    #[arg(long = "user-agent", env = "DLKIT_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Connect timeout in seconds
    #[arg(long = "connect-timeout", default_value_t = 30)]
    pub connect_timeout: u64,

    /// Read timeout in seconds (0 waits forever)
    #[arg(long = "read-timeout", default_value_t = 60)]
    pub read_timeout: u64,

    /// Accept invalid TLS certificates (a warning is printed)
    #[arg(long = "insecure")]
    pub insecure: bool,

    /// Keep the partial file when the download is interrupted
    #[arg(long = "keep-partial")]
    pub keep_partial: bool,

    /// Print lifecycle events as JSON lines instead of a progress bar
    #[arg(long = "json")]
    pub json: bool,
}
