//! BitLocker recovery key export command

use std::path::PathBuf;

use clap::Args;
use devsweep_core::{
    fetch_inventory, DeviceDirectory, ExtractionOptions, ExtractionReport, KeyExportDevice,
    KeyExtractor, KeyFailureKind, RecoveryKeyDirectory,
};
use tracing::info;

use crate::error::CliResult;
use crate::formats::{self, csv};

/// Arguments for the export-keys command
#[derive(Debug, Args)]
pub struct ExportKeysArgs {
    /// Path of the CSV to write
    #[arg(long, short)]
    pub output: PathBuf,

    /// CSV with Id, DeviceId and DisplayName columns; defaults to every device in the tenant
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Leave out devices without a DeviceId instead of writing an empty row
    #[arg(long)]
    pub skip_missing_device_id: bool,

    /// Pause after each key, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}

impl ExportKeysArgs {
    fn options(&self) -> ExtractionOptions {
        ExtractionOptions {
            skip_missing_device_id: self.skip_missing_device_id,
            delay: super::delay_from_ms(self.delay_ms),
        }
    }
}

/// Execute the export-keys command
pub async fn execute(args: ExportKeysArgs) -> CliResult<()> {
    let listed = match args.input {
        Some(ref path) => Some(csv::read_key_export_devices(formats::open_input(path)?)?),
        None => None,
    };

    let directory = super::connect()?;
    let report = export_keys(&directory, listed, &args).await?;
    print_report(&report, &args);
    Ok(())
}

/// Extracts keys for `listed` devices, or for the whole inventory when
/// `listed` is `None`, and writes the export.
pub async fn export_keys<D>(
    directory: &D,
    listed: Option<Vec<KeyExportDevice>>,
    args: &ExportKeysArgs,
) -> CliResult<ExtractionReport>
where
    D: DeviceDirectory + RecoveryKeyDirectory + ?Sized,
{
    let devices = match listed {
        Some(devices) => devices,
        None => fetch_inventory(directory)
            .await?
            .iter()
            .map(KeyExportDevice::from)
            .collect(),
    };
    info!(devices = devices.len(), "Exporting recovery keys");

    let report = KeyExtractor::new(directory, args.options())
        .extract(&devices)
        .await;

    let mut buffer = Vec::new();
    csv::write_recovery_keys(&report.rows, &mut buffer)?;
    formats::write_output(&args.output, &buffer)?;

    info!(path = %args.output.display(), rows = report.rows.len(), "Recovery key export written");
    Ok(report)
}

/// Prints one line per row and per failure, then the tally. Key values are
/// never printed.
pub fn print_report(report: &ExtractionReport, args: &ExportKeysArgs) {
    for row in &report.rows {
        match (&row.bitlocker_key_id, &row.recovery_key) {
            (Some(key_id), Some(_)) => {
                println!("Exported: {} ({}) key {}", row.display_name, row.entra_object_id, key_id)
            }
            (Some(key_id), None) => println!(
                "Missing secret: {} ({}) key {}",
                row.display_name, row.entra_object_id, key_id
            ),
            (None, _) => println!(
                "No keys: {} ({})",
                row.display_name, row.entra_object_id
            ),
        }
    }
    for failure in &report.failures {
        let what = match failure.kind {
            KeyFailureKind::List => "listing keys".to_string(),
            KeyFailureKind::Fetch => format!(
                "fetching key {}",
                failure.key_id.as_deref().unwrap_or("-")
            ),
        };
        println!(
            "Failed {} for {} ({}): {}",
            what, failure.object_id, failure.device_id, failure.error
        );
    }
    println!();
    println!("{}", report.summary_line());
    println!("Written to {}", args.output.display());
}
