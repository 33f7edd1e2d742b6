//! Guarded device removal command

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Args;
use devsweep_core::{DeviceMutation, GuardedRemoval, RemovalOptions, RemovalReport, RemovalTarget};
use dialoguer::Confirm;

use crate::error::{CliError, CliResult};
use crate::formats::{self, csv};

/// Arguments for the remove command
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// CSV with an Id column (DisplayName optional), e.g. an export-stale output
    #[arg(long, short)]
    pub input: PathBuf,

    /// Report what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Disable each device before deleting it
    #[arg(long)]
    pub disable_first: bool,

    /// Pause between devices, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

impl RemoveArgs {
    fn options(&self) -> RemovalOptions {
        RemovalOptions {
            dry_run: self.dry_run,
            disable_first: self.disable_first,
            delay: super::delay_from_ms(self.delay_ms),
        }
    }

    /// Whether the run must be confirmed interactively.
    pub fn needs_confirmation(&self) -> bool {
        !(self.force || self.dry_run)
    }
}

/// Execute the remove command
pub async fn execute(args: RemoveArgs) -> CliResult<()> {
    let targets = csv::read_removal_targets(formats::open_input(&args.input)?)?;
    if targets.is_empty() {
        println!("No devices in {}", args.input.display());
        return Ok(());
    }

    if args.needs_confirmation() && !confirm(&args, targets.len())? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let directory = super::connect()?;
    let report = run_removal(&directory, &targets, &args).await;
    print_report(&report);
    Ok(())
}

/// Runs the guarded removal over `targets`.
///
/// Per-device failures are recorded in the report and never returned.
pub async fn run_removal<D>(directory: &D, targets: &[RemovalTarget], args: &RemoveArgs) -> RemovalReport
where
    D: DeviceMutation + ?Sized,
{
    GuardedRemoval::new(directory, args.options())
        .run(targets)
        .await
}

fn confirm(args: &RemoveArgs, count: usize) -> CliResult<bool> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation(
            "Cannot confirm deletion in non-interactive mode. Use --force to skip confirmation."
                .to_string(),
        ));
    }

    let action = if args.disable_first {
        "disable and permanently delete"
    } else {
        "permanently delete"
    };
    println!("About to {} {} device(s) listed in {}.", action, count, args.input.display());

    Ok(Confirm::new()
        .with_prompt("Proceed?")
        .default(false)
        .interact()?)
}

/// Prints one line per device, then the tally.
pub fn print_report(report: &RemovalReport) {
    if report.dry_run {
        println!("Dry-run mode - no changes were made\n");
    }
    for outcome in &report.items {
        println!("{}", outcome.status_line());
    }
    println!();
    println!("{}", report.summary_line());
}
