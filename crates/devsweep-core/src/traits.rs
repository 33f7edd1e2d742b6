//! Directory capability traits
//!
//! The workflows only see the directory through these traits. Each read
//! returns the complete result set; paging is the implementation's concern.

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::types::{
    DeviceRecord, DeviceUpdate, ProvisionedIdentity, RecoveryKeyMetadata, RecoveryKeyValue,
};

/// Read access to device and provisioning records.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Lists every device, requesting only the named attributes.
    async fn list_devices(&self, projection: &[&str]) -> DirectoryResult<Vec<DeviceRecord>>;

    /// Lists every provisioned (zero-touch registered) identity.
    ///
    /// Needs a management read scope beyond plain device read.
    async fn list_provisioned_identities(&self) -> DirectoryResult<Vec<ProvisionedIdentity>>;
}

/// Write access to device records.
#[async_trait]
pub trait DeviceMutation: Send + Sync {
    /// Applies a partial update to the device with directory id `id`.
    async fn update_device(&self, id: &str, update: &DeviceUpdate) -> DirectoryResult<()>;

    /// Deletes the device with directory id `id`.
    async fn delete_device(&self, id: &str) -> DirectoryResult<()>;
}

/// Read access to disk-encryption recovery keys.
#[async_trait]
pub trait RecoveryKeyDirectory: Send + Sync {
    /// Lists key metadata for the device with secondary id `device_id`.
    async fn list_recovery_keys(&self, device_id: &str)
        -> DirectoryResult<Vec<RecoveryKeyMetadata>>;

    /// Fetches the secret value of one key.
    async fn get_recovery_key_value(&self, key_id: &str) -> DirectoryResult<RecoveryKeyValue>;
}
