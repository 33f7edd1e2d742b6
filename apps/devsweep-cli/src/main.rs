//! devsweep - stale device cleanup and BitLocker key export for Entra ID
//!
//! This CLI enables administrators to:
//! - Export devices that stopped signing in, optionally sparing Autopilot devices
//! - Disable and delete devices listed in a CSV, with a dry run
//! - Export BitLocker recovery keys per device

use clap::{Parser, Subcommand};
use tracing::warn;

use devsweep_cli::{commands, config};
use devsweep_cli::error::CliResult;
use devsweep_cli::logging::{self, LogFormat};

/// devsweep - Entra ID device lifecycle
#[derive(Parser)]
#[command(name = "devsweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Debug-level diagnostics (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Diagnostic log format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export devices with no sign-in since the cutoff
    ExportStale(commands::export_stale::ExportStaleArgs),

    /// Disable and delete the devices listed in a CSV
    Remove(commands::remove::RemoveArgs),

    /// Export BitLocker recovery keys
    ExportKeys(commands::export_keys::ExportKeysArgs),
}

#[tokio::main]
async fn main() {
    let dotenv = config::load_dotenv();
    let cli = Cli::parse();

    let result = match logging::init_logging(cli.log_format, cli.verbose) {
        Ok(()) => {
            if let Err(e) = dotenv {
                warn!(error = %e, "Ignoring unreadable .env file");
            }
            run(cli).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::ExportStale(args) => commands::export_stale::execute(args).await,
        Commands::Remove(args) => commands::remove::execute(args).await,
        Commands::ExportKeys(args) => commands::export_keys::execute(args).await,
    }
}
