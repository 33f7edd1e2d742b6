//! Stale device export command
//!
//! Inventory, optional Autopilot exclusion, classification, CSV.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use devsweep_core::staleness::DEFAULT_STALE_DAYS;
use devsweep_core::{
    build_exclusion_index, fetch_inventory, ClassificationSummary, DeviceDirectory,
    ExclusionIndex, StalenessPolicy,
};
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::formats::{self, csv};

/// Arguments for the export-stale command
#[derive(Debug, Args)]
pub struct ExportStaleArgs {
    /// Path of the CSV to write
    #[arg(long, short)]
    pub output: PathBuf,

    /// Devices with no sign-in for at least this many days are stale
    #[arg(long, default_value_t = DEFAULT_STALE_DAYS, value_parser = clap::value_parser!(i64).range(0..))]
    pub stale_days: i64,

    /// Also report devices that never recorded a sign-in
    #[arg(long)]
    pub include_no_timestamp: bool,

    /// Leave out devices registered through Windows Autopilot
    #[arg(long)]
    pub exclude_autopilot: bool,
}

/// Execute the export-stale command
pub async fn execute(args: ExportStaleArgs) -> CliResult<()> {
    let directory = super::connect()?;
    let summary = export_stale(&directory, &args, Utc::now()).await?;
    print_summary(&summary, &args);
    Ok(())
}

/// Runs the export against `directory` with `now` as the reference time.
///
/// Inventory and exclusion reads are fatal: a partial device set would
/// silently misclassify devices.
pub async fn export_stale<D>(
    directory: &D,
    args: &ExportStaleArgs,
    now: DateTime<Utc>,
) -> CliResult<ClassificationSummary>
where
    D: DeviceDirectory + ?Sized,
{
    let policy = StalenessPolicy::from_days(now, args.stale_days)
        .ok_or_else(|| {
            CliError::Validation(format!(
                "--stale-days {} puts the cutoff outside the supported date range",
                args.stale_days
            ))
        })?
        .include_no_timestamp(args.include_no_timestamp)
        .exclude_provisioned(args.exclude_autopilot);

    let devices = fetch_inventory(directory).await?;

    let exclusions = if args.exclude_autopilot {
        build_exclusion_index(directory).await?
    } else {
        ExclusionIndex::empty()
    };

    info!(cutoff = %policy.cutoff, "Classifying devices");

    let selection = policy.select_stale(&devices, &exclusions);

    let mut buffer = Vec::new();
    csv::write_stale_devices(&selection.stale, &mut buffer)?;
    formats::write_output(&args.output, &buffer)?;

    info!(
        path = %args.output.display(),
        rows = selection.stale.len(),
        "Stale device export written"
    );
    Ok(selection.summary)
}

fn print_summary(summary: &ClassificationSummary, args: &ExportStaleArgs) {
    println!("Devices scanned:        {}", summary.total);
    println!("Stale (exported):       {}", summary.stale);
    println!("Active:                 {}", summary.active);
    println!("No sign-in timestamp:   {}", summary.missing_timestamp);
    if args.exclude_autopilot {
        println!("Autopilot (protected):  {}", summary.protected);
    }
    println!("Written to {}", args.output.display());
}
