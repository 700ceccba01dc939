//! Command-line adapter for dlkit.
//!
//! - `parser` - clap definitions
//! - `bootstrap` - composition of transport, session and sink
//! - `handlers` - one module per subcommand
//! - `presentation` - console and JSON-lines notification sinks
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, bootstrap, resolve_download_dir};
pub use error::CliError;
pub use parser::{Cli, Commands, GetArgs};
