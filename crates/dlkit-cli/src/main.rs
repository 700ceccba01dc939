//! CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dlkit_cli::{Cli, CliError, Commands, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Get(args) => handlers::get::execute(args).await,
        Commands::Resolve { url, dir } => handlers::resolve::execute(url, dir.as_deref()),
    };

    if let Err(err) = result {
        report(&err);
        std::process::exit(err.exit_code());
    }
    Ok(())
}

/// Log to stderr. `RUST_LOG` wins; otherwise `-v` enables debug output for
/// dlkit targets.
fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,dlkit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(err: &CliError) {
    // Download failures were already rendered by the sink.
    if !matches!(err, CliError::Download { .. }) {
        eprintln!("Error: {err}");
    }
}
