//! Recovery key extraction
//!
//! Flattens the device → key relation into one row per (device, key) pair.
//! Devices without keys still get a single placeholder row, so a device's
//! presence in the export never depends on what the key service returned.
//! Failures are isolated per key: a secret that cannot be fetched leaves
//! `recovery_key` empty on that row and nothing else.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::traits::RecoveryKeyDirectory;
use crate::types::{DeviceRecord, RecoveryKeyMetadata};

/// A device whose keys should be exported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyExportDevice {
    /// Directory object id.
    pub object_id: String,
    /// Secondary device id used by the key service. May be empty.
    pub device_id: String,
    pub display_name: String,
}

impl From<&DeviceRecord> for KeyExportDevice {
    fn from(device: &DeviceRecord) -> Self {
        Self {
            object_id: device.id.clone(),
            device_id: device.device_id.clone(),
            display_name: device.display_name.clone(),
        }
    }
}

/// One flattened export row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryKeyRow {
    pub entra_object_id: String,
    pub device_id: String,
    pub display_name: String,
    pub bitlocker_key_id: Option<String>,
    pub recovery_key: Option<String>,
    pub volume_type: Option<String>,
    pub key_created: Option<String>,
}

impl RecoveryKeyRow {
    /// Row for a device with all key fields empty.
    #[must_use]
    pub fn placeholder(device: &KeyExportDevice) -> Self {
        Self {
            entra_object_id: device.object_id.clone(),
            device_id: device.device_id.clone(),
            display_name: device.display_name.clone(),
            ..Default::default()
        }
    }

    /// Returns true if every key field is empty.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.bitlocker_key_id.is_none()
            && self.recovery_key.is_none()
            && self.volume_type.is_none()
            && self.key_created.is_none()
    }
}

/// Which call failed during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyFailureKind {
    /// Listing the device's key metadata failed.
    List,
    /// Fetching one key's secret failed.
    Fetch,
}

/// A recorded per-device or per-key failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFailure {
    pub kind: KeyFailureKind,
    pub object_id: String,
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    pub error: String,
}

/// Flags controlling an extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Skip devices without a secondary id instead of emitting a placeholder.
    pub skip_missing_device_id: bool,
    /// Pause after each key resolution.
    pub delay: Duration,
}

/// Rows and failures from one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub rows: Vec<RecoveryKeyRow>,
    pub failures: Vec<KeyFailure>,
    pub devices_processed: usize,
    pub devices_skipped: usize,
    pub keys_found: usize,
    pub keys_resolved: usize,
}

impl ExtractionReport {
    /// Number of placeholder rows.
    #[must_use]
    pub fn placeholder_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_placeholder()).count()
    }

    /// Final tally line.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "Key export complete: {} devices, {} skipped, {} keys found, {} resolved, {} failures, {} rows",
            self.devices_processed,
            self.devices_skipped,
            self.keys_found,
            self.keys_resolved,
            self.failures.len(),
            self.rows.len()
        )
    }
}

/// Two-step (metadata, then secret) key extractor.
pub struct KeyExtractor<'a, D: ?Sized> {
    directory: &'a D,
    options: ExtractionOptions,
}

impl<'a, D> KeyExtractor<'a, D>
where
    D: RecoveryKeyDirectory + ?Sized,
{
    pub fn new(directory: &'a D, options: ExtractionOptions) -> Self {
        Self { directory, options }
    }

    /// Extracts rows for every device, in input order.
    #[instrument(skip(self, devices), fields(count = devices.len()))]
    pub async fn extract(&self, devices: &[KeyExportDevice]) -> ExtractionReport {
        let mut report = ExtractionReport::default();

        for device in devices {
            self.extract_device(device, &mut report).await;
        }

        info!("{}", report.summary_line());
        report
    }

    async fn extract_device(&self, device: &KeyExportDevice, report: &mut ExtractionReport) {
        let device_id = device.device_id.trim();
        if device_id.is_empty() {
            if self.options.skip_missing_device_id {
                warn!(object_id = %device.object_id, name = %device.display_name, "No device id, skipping");
                report.devices_skipped += 1;
            } else {
                warn!(object_id = %device.object_id, name = %device.display_name, "No device id, emitting placeholder");
                report.devices_processed += 1;
                report.rows.push(RecoveryKeyRow::placeholder(device));
            }
            return;
        }

        report.devices_processed += 1;

        let keys = match self.directory.list_recovery_keys(device_id).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(device_id, name = %device.display_name, error = %e, "Listing recovery keys failed");
                report.failures.push(KeyFailure {
                    kind: KeyFailureKind::List,
                    object_id: device.object_id.clone(),
                    device_id: device_id.to_string(),
                    key_id: None,
                    error: e.to_string(),
                });
                report.rows.push(RecoveryKeyRow::placeholder(device));
                return;
            }
        };

        if keys.is_empty() {
            debug!(device_id, name = %device.display_name, "No recovery keys");
            report.rows.push(RecoveryKeyRow::placeholder(device));
            return;
        }

        report.keys_found += keys.len();
        for key in &keys {
            let row = self.resolve_key(device, key, report).await;
            report.rows.push(row);

            if !self.options.delay.is_zero() {
                tokio::time::sleep(self.options.delay).await;
            }
        }
    }

    async fn resolve_key(
        &self,
        device: &KeyExportDevice,
        key: &RecoveryKeyMetadata,
        report: &mut ExtractionReport,
    ) -> RecoveryKeyRow {
        let mut row = RecoveryKeyRow {
            bitlocker_key_id: Some(key.key_id.clone()),
            volume_type: key.resolved_volume_type(),
            key_created: key.resolved_created_at(),
            ..RecoveryKeyRow::placeholder(device)
        };

        match self.directory.get_recovery_key_value(&key.key_id).await {
            Ok(value) => {
                row.recovery_key = value.resolved_key();
                if row.recovery_key.is_some() {
                    report.keys_resolved += 1;
                } else {
                    warn!(key_id = %key.key_id, name = %device.display_name, "Recovery key response carried no secret");
                }
            }
            Err(e) => {
                warn!(key_id = %key.key_id, name = %device.display_name, error = %e, "Fetching recovery key failed");
                report.failures.push(KeyFailure {
                    kind: KeyFailureKind::Fetch,
                    object_id: device.object_id.clone(),
                    device_id: device.device_id.trim().to_string(),
                    key_id: Some(key.key_id.clone()),
                    error: e.to_string(),
                });
            }
        }

        row
    }
}
