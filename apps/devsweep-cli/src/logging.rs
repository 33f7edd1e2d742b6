//! Diagnostic logging setup using tracing.
//!
//! Diagnostics go to stderr. Per-item status lines are printed to stdout by
//! the commands themselves and never pass through the subscriber.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{CliError, CliResult};

/// Diagnostic output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One flattened JSON object per event
    Json,
}

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "info,devsweep=debug"
    } else {
        "info,devsweep=info"
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the built-in directive.
pub fn init_logging(format: LogFormat, verbose: bool) -> CliResult<()> {
    let directive = default_directive(verbose);
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .map_err(|e| CliError::Config(format!("Failed to create log filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(filter_layer);
    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(false)
                    .flatten_event(true),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
    };
    result.map_err(|e| CliError::Config(format!("Failed to initialize logging: {e}")))?;

    tracing::debug!(filter = %directive, "Logging initialized");
    Ok(())
}
