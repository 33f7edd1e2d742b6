//! Directory record types
//!
//! Read-only snapshots of directory objects as returned by the capability
//! traits. Nothing in this crate mutates them after fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::{self, AttributeBag};

/// A device object held in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Directory object id (primary key).
    pub id: String,
    /// Secondary device id used by the management and key subsystems. May be empty.
    pub device_id: String,
    /// Display name.
    pub display_name: String,
    /// Whether the device account is enabled, if reported.
    pub account_enabled: Option<bool>,
    /// Operating system name.
    pub operating_system: Option<String>,
    /// Operating system version.
    pub operating_system_version: Option<String>,
    /// Join type (`AzureAd`, `ServerAd`, `Workplace`).
    pub trust_type: Option<String>,
    /// Approximate last sign-in. Absent for devices that never populated it.
    pub last_sign_in: Option<DateTime<Utc>>,
}

impl DeviceRecord {
    /// Creates a record with only identifiers and a display name set.
    pub fn new(
        id: impl Into<String>,
        device_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            device_id: device_id.into(),
            display_name: display_name.into(),
            account_enabled: None,
            operating_system: None,
            operating_system_version: None,
            trust_type: None,
            last_sign_in: None,
        }
    }

    /// Sets the last sign-in timestamp.
    #[must_use]
    pub fn with_last_sign_in(mut self, at: DateTime<Utc>) -> Self {
        self.last_sign_in = Some(at);
        self
    }
}

/// A device pre-registered through a zero-touch deployment program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedIdentity {
    /// Provisioning record id.
    pub id: String,
    /// Directory object id of the registered device, matched against
    /// [`DeviceRecord::id`] (never against `device_id`).
    pub directory_device_id: Option<String>,
    /// Hardware serial number, for logging.
    pub serial_number: Option<String>,
}

/// Partial device update. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_enabled: Option<bool>,
}

impl DeviceUpdate {
    /// The update that disables a device account.
    #[must_use]
    pub fn disable() -> Self {
        Self {
            account_enabled: Some(false),
        }
    }
}

/// Recovery key metadata as listed for a device.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecoveryKeyMetadata {
    pub key_id: String,
    pub device_id: Option<String>,
    /// First-class volume type, when the service delivers it as a field.
    pub volume_type: Option<String>,
    /// First-class creation timestamp, when the service delivers it as a field.
    pub created_at: Option<String>,
    /// Attributes delivered outside the typed fields.
    pub overflow: AttributeBag,
}

impl RecoveryKeyMetadata {
    /// Volume type from whichever location carries it.
    #[must_use]
    pub fn resolved_volume_type(&self) -> Option<String> {
        attributes::resolve_value(
            self.volume_type.as_deref(),
            &self.overflow,
            attributes::VOLUME_TYPE,
        )
    }

    /// Creation timestamp from whichever location carries it.
    #[must_use]
    pub fn resolved_created_at(&self) -> Option<String> {
        attributes::resolve_value(
            self.created_at.as_deref(),
            &self.overflow,
            attributes::CREATED_DATE_TIME,
        )
    }
}

/// Recovery key secret as fetched by key id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecoveryKeyValue {
    pub key_id: String,
    pub key: Option<String>,
    pub overflow: AttributeBag,
}

impl RecoveryKeyValue {
    /// Secret from whichever location carries it.
    #[must_use]
    pub fn resolved_key(&self) -> Option<String> {
        attributes::resolve_value(self.key.as_deref(), &self.overflow, attributes::KEY)
    }
}
