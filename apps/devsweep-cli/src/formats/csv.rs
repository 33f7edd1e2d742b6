//! CSV records for the stale-device, device-list and recovery-key files
//!
//! Header names are fixed and PascalCase so the files open cleanly in
//! spreadsheets and match what directory admin tooling already produces:
//! - Stale devices: Id, DeviceId, DisplayName, AccountEnabled, OperatingSystem,
//!   OperatingSystemVersion, TrustType, ApproximateLastSignInDateTime
//! - Recovery keys: EntraObjectId, DeviceId, DisplayName, BitLockerKeyId,
//!   RecoveryKey, VolumeType, KeyCreated
//!
//! Readers only require the `Id` column and ignore any column they do not know.

use std::io::{Read, Write};

use chrono::SecondsFormat;
use devsweep_core::{DeviceRecord, KeyExportDevice, RecoveryKeyRow, RemovalTarget};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CliError, CliResult};

pub const STALE_DEVICE_HEADERS: [&str; 8] = [
    "Id",
    "DeviceId",
    "DisplayName",
    "AccountEnabled",
    "OperatingSystem",
    "OperatingSystemVersion",
    "TrustType",
    "ApproximateLastSignInDateTime",
];

pub const RECOVERY_KEY_HEADERS: [&str; 7] = [
    "EntraObjectId",
    "DeviceId",
    "DisplayName",
    "BitLockerKeyId",
    "RecoveryKey",
    "VolumeType",
    "KeyCreated",
];

/// CSV record for a stale device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StaleDeviceRecord {
    pub id: String,
    pub device_id: String,
    pub display_name: String,
    pub account_enabled: Option<bool>,
    pub operating_system: Option<String>,
    pub operating_system_version: Option<String>,
    pub trust_type: Option<String>,
    /// RFC 3339, UTC
    pub approximate_last_sign_in_date_time: Option<String>,
}

impl From<&DeviceRecord> for StaleDeviceRecord {
    fn from(device: &DeviceRecord) -> Self {
        Self {
            id: device.id.clone(),
            device_id: device.device_id.clone(),
            display_name: device.display_name.clone(),
            account_enabled: device.account_enabled,
            operating_system: device.operating_system.clone(),
            operating_system_version: device.operating_system_version.clone(),
            trust_type: device.trust_type.clone(),
            approximate_last_sign_in_date_time: device
                .last_sign_in
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

/// CSV record for a device list row (removal input or key export input)
///
/// Only `Id` is meaningful for removal; `DisplayName` is carried for
/// reporting.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceListRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl From<DeviceListRecord> for RemovalTarget {
    fn from(record: DeviceListRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name,
        }
    }
}

/// CSV record for one exported recovery key (or a placeholder row)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecoveryKeyRecord {
    #[serde(rename = "EntraObjectId")]
    pub entra_object_id: String,
    #[serde(rename = "DeviceId")]
    pub device_id: String,
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    #[serde(rename = "BitLockerKeyId")]
    pub bitlocker_key_id: Option<String>,
    #[serde(rename = "RecoveryKey")]
    pub recovery_key: Option<String>,
    #[serde(rename = "VolumeType")]
    pub volume_type: Option<String>,
    #[serde(rename = "KeyCreated")]
    pub key_created: Option<String>,
}

impl From<&RecoveryKeyRow> for RecoveryKeyRecord {
    fn from(row: &RecoveryKeyRow) -> Self {
        Self {
            entra_object_id: row.entra_object_id.clone(),
            device_id: row.device_id.clone(),
            display_name: row.display_name.clone(),
            bitlocker_key_id: row.bitlocker_key_id.clone(),
            recovery_key: row.recovery_key.clone(),
            volume_type: row.volume_type.clone(),
            key_created: row.key_created.clone(),
        }
    }
}

fn writer<W: Write>(out: W, headers: &[&str]) -> CliResult<csv::Writer<W>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    wtr.write_record(headers)?;
    Ok(wtr)
}

fn finish<W: Write>(mut wtr: csv::Writer<W>) -> CliResult<()> {
    wtr.flush()
        .map_err(|e| CliError::Io(format!("Failed to flush CSV: {}", e)))
}

/// Export stale devices. The header row is written even for an empty list.
pub fn write_stale_devices<W: Write>(devices: &[&DeviceRecord], out: W) -> CliResult<()> {
    let mut wtr = writer(out, &STALE_DEVICE_HEADERS)?;
    for device in devices {
        wtr.serialize(StaleDeviceRecord::from(*device))?;
    }
    finish(wtr)
}

/// Export recovery key rows. The header row is written even for an empty list.
pub fn write_recovery_keys<W: Write>(rows: &[RecoveryKeyRow], out: W) -> CliResult<()> {
    let mut wtr = writer(out, &RECOVERY_KEY_HEADERS)?;
    for row in rows {
        wtr.serialize(RecoveryKeyRecord::from(row))?;
    }
    finish(wtr)
}

/// Read a device list, requiring an `Id` column.
///
/// Cells are trimmed and empty cells read as absent. Unknown columns are
/// ignored. A row that cannot be parsed is a fatal error naming its line.
pub fn read_device_list<R: Read>(input: R) -> CliResult<Vec<DeviceListRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = rdr.headers()?.clone();
    if !headers.iter().any(|h| h == "Id") {
        return Err(CliError::Validation(format!(
            "CSV missing required column: Id (found: {})",
            headers.iter().collect::<Vec<_>>().join(", ")
        )));
    }

    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<DeviceListRecord>().enumerate() {
        let line_num = idx + 2; // +1 for 0-index, +1 for header
        let record = result
            .map_err(|e| CliError::Csv(format!("line {}: {}", line_num, e)))?;
        records.push(record);
    }
    Ok(records)
}

/// Read the removal input.
pub fn read_removal_targets<R: Read>(input: R) -> CliResult<Vec<RemovalTarget>> {
    Ok(read_device_list(input)?
        .into_iter()
        .map(RemovalTarget::from)
        .collect())
}

/// Read the key export input.
///
/// Rows without an `Id` cannot be attributed to a directory object and are
/// dropped with a warning.
pub fn read_key_export_devices<R: Read>(input: R) -> CliResult<Vec<KeyExportDevice>> {
    let mut devices = Vec::new();
    for (idx, record) in read_device_list(input)?.into_iter().enumerate() {
        match record.id {
            Some(object_id) => devices.push(KeyExportDevice {
                object_id,
                device_id: record.device_id.unwrap_or_default(),
                display_name: record.display_name.unwrap_or_default(),
            }),
            None => warn!(line = idx + 2, "Row has no Id, skipping"),
        }
    }
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_stale_device_header_and_row() {
        let device = DeviceRecord {
            account_enabled: Some(true),
            operating_system: Some("Windows".into()),
            trust_type: Some("AzureAd".into()),
            ..DeviceRecord::new("obj-1", "dev-1", "LAPTOP-1")
        }
        .with_last_sign_in(Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap());

        let mut out = Vec::new();
        write_stale_devices(&[&device], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Id,DeviceId,DisplayName,AccountEnabled,OperatingSystem,OperatingSystemVersion,TrustType,ApproximateLastSignInDateTime"
        );
        assert_eq!(
            lines.next().unwrap(),
            "obj-1,dev-1,LAPTOP-1,true,Windows,,AzureAd,2025-03-01T08:30:00Z"
        );
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let mut out = Vec::new();
        write_recovery_keys(&[], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "EntraObjectId,DeviceId,DisplayName,BitLockerKeyId,RecoveryKey,VolumeType,KeyCreated\n"
        );
    }

    #[test]
    fn test_placeholder_row_has_empty_key_cells() {
        let row = RecoveryKeyRow {
            entra_object_id: "obj-1".into(),
            device_id: "dev-1".into(),
            display_name: "LAPTOP-1".into(),
            ..Default::default()
        };

        let mut out = Vec::new();
        write_recovery_keys(&[row], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().nth(1).unwrap(), "obj-1,dev-1,LAPTOP-1,,,,");
    }

    #[test]
    fn test_read_removal_targets_ignores_extra_columns() {
        let csv = "Id,DisplayName,OperatingSystem\n obj-1 , PC-1 ,Windows\n,PC-2,Windows\n";

        let targets = read_removal_targets(csv.as_bytes()).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].id.as_deref(), Some("obj-1"));
        assert_eq!(targets[0].display_name.as_deref(), Some("PC-1"));
        assert!(targets[1].id.is_none());
    }

    #[test]
    fn test_read_requires_id_column() {
        let csv = "DeviceId,DisplayName\ndev-1,PC-1\n";

        let err = read_removal_targets(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        assert!(err.to_string().contains("Id"));
    }

    #[test]
    fn test_read_id_only_file() {
        let csv = "Id\nobj-1\nobj-2\n";

        let targets = read_removal_targets(csv.as_bytes()).unwrap();
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| t.display_name.is_none()));
    }

    #[test]
    fn test_read_key_export_devices() {
        let csv = "Id,DeviceId,DisplayName\nobj-1,dev-1,PC-1\nobj-2,,PC-2\n,dev-3,PC-3\n";

        let devices = read_key_export_devices(csv.as_bytes()).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].device_id, "dev-1");
        assert_eq!(devices[1].device_id, "");
    }
}
