//! Common test utilities for devsweep-cli integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use devsweep_core::{
    DeviceDirectory, DeviceMutation, DeviceRecord, DeviceUpdate, DirectoryError, DirectoryResult,
    ProvisionedIdentity, RecoveryKeyDirectory, RecoveryKeyMetadata, RecoveryKeyValue,
};

/// In-memory tenant for driving commands without a network.
#[derive(Default)]
pub struct MockTenant {
    pub devices: Vec<DeviceRecord>,
    pub autopilot: Vec<ProvisionedIdentity>,
    pub keys: HashMap<String, Vec<RecoveryKeyMetadata>>,
    pub secrets: HashMap<String, String>,
    pub fail_inventory: bool,
    pub fail_autopilot: bool,
    pub fail_delete: HashSet<String>,
    mutations: Mutex<Vec<String>>,
}

impl MockTenant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutating calls as `"PATCH id"` / `"DELETE id"`, in order.
    pub fn mutations(&self) -> Vec<String> {
        self.mutations.lock().unwrap().clone()
    }

    pub fn add_key(&mut self, device_id: &str, key_id: &str, secret: &str) {
        self.keys
            .entry(device_id.to_string())
            .or_default()
            .push(RecoveryKeyMetadata {
                key_id: key_id.to_string(),
                device_id: Some(device_id.to_string()),
                volume_type: Some("1".to_string()),
                created_at: Some("2025-01-10T09:00:00Z".to_string()),
                ..Default::default()
            });
        self.secrets.insert(key_id.to_string(), secret.to_string());
    }
}

#[async_trait]
impl DeviceDirectory for MockTenant {
    async fn list_devices(&self, _projection: &[&str]) -> DirectoryResult<Vec<DeviceRecord>> {
        if self.fail_inventory {
            return Err(DirectoryError::Transport("connection reset".into()));
        }
        Ok(self.devices.clone())
    }

    async fn list_provisioned_identities(&self) -> DirectoryResult<Vec<ProvisionedIdentity>> {
        if self.fail_autopilot {
            return Err(DirectoryError::PermissionDenied {
                operation: "Authorization_RequestDenied".into(),
                message: "Insufficient privileges to complete the operation.".into(),
            });
        }
        Ok(self.autopilot.clone())
    }
}

#[async_trait]
impl DeviceMutation for MockTenant {
    async fn update_device(&self, id: &str, _update: &DeviceUpdate) -> DirectoryResult<()> {
        self.mutations.lock().unwrap().push(format!("PATCH {id}"));
        Ok(())
    }

    async fn delete_device(&self, id: &str) -> DirectoryResult<()> {
        self.mutations.lock().unwrap().push(format!("DELETE {id}"));
        if self.fail_delete.contains(id) {
            return Err(DirectoryError::NotFound(format!("device {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl RecoveryKeyDirectory for MockTenant {
    async fn list_recovery_keys(
        &self,
        device_id: &str,
    ) -> DirectoryResult<Vec<RecoveryKeyMetadata>> {
        Ok(self.keys.get(device_id).cloned().unwrap_or_default())
    }

    async fn get_recovery_key_value(&self, key_id: &str) -> DirectoryResult<RecoveryKeyValue> {
        Ok(RecoveryKeyValue {
            key_id: key_id.to_string(),
            key: self.secrets.get(key_id).cloned(),
            ..Default::default()
        })
    }
}

/// Fixed reference time for classification.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 8, 0, 0).unwrap()
}

pub fn device_signed_in_days_ago(id: &str, name: &str, days: i64) -> DeviceRecord {
    DeviceRecord::new(id, format!("dev-{id}"), name).with_last_sign_in(test_now() - Duration::days(days))
}

pub fn device_without_sign_in(id: &str, name: &str) -> DeviceRecord {
    DeviceRecord::new(id, format!("dev-{id}"), name)
}
