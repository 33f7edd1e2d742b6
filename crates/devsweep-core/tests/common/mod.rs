//! Common test utilities for devsweep-core integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use devsweep_core::attributes::AttributeBag;
use devsweep_core::{
    DeviceDirectory, DeviceMutation, DeviceRecord, DeviceUpdate, DirectoryError, DirectoryResult,
    ProvisionedIdentity, RecoveryKeyDirectory, RecoveryKeyMetadata, RecoveryKeyValue,
};

/// Calls observed by the fake directory, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListDevices(Vec<String>),
    ListProvisioned,
    Update(String, Option<bool>),
    Delete(String),
    ListKeys(String),
    GetKey(String),
}

/// In-memory directory that records every call and fails on request.
#[derive(Default)]
pub struct FakeDirectory {
    pub devices: Vec<DeviceRecord>,
    pub provisioned: Vec<ProvisionedIdentity>,
    pub keys: HashMap<String, Vec<RecoveryKeyMetadata>>,
    pub secrets: HashMap<String, RecoveryKeyValue>,
    pub fail_update: HashSet<String>,
    pub fail_delete: HashSet<String>,
    pub fail_list_keys: HashSet<String>,
    pub fail_get_key: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Update(..) | Call::Delete(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Registers a key with first-class metadata and a fetchable secret.
    pub fn add_key(&mut self, device_id: &str, key_id: &str, volume: &str, secret: &str) {
        self.keys
            .entry(device_id.to_string())
            .or_default()
            .push(RecoveryKeyMetadata {
                key_id: key_id.to_string(),
                device_id: Some(device_id.to_string()),
                volume_type: Some(volume.to_string()),
                created_at: Some("2025-01-10T09:00:00Z".to_string()),
                overflow: AttributeBag::new(),
            });
        self.secrets.insert(
            key_id.to_string(),
            RecoveryKeyValue {
                key_id: key_id.to_string(),
                key: Some(secret.to_string()),
                overflow: AttributeBag::new(),
            },
        );
    }

    /// Registers a key whose attributes only exist in the overflow bag.
    pub fn add_overflow_key(&mut self, device_id: &str, key_id: &str, volume: &str, secret: &str) {
        let mut meta_bag = AttributeBag::new();
        meta_bag.insert("volumeType".into(), json!(volume));
        meta_bag.insert("createdDateTime".into(), json!("2023-07-04T12:30:00Z"));
        self.keys
            .entry(device_id.to_string())
            .or_default()
            .push(RecoveryKeyMetadata {
                key_id: key_id.to_string(),
                device_id: Some(device_id.to_string()),
                volume_type: None,
                created_at: None,
                overflow: meta_bag,
            });

        let mut value_bag = AttributeBag::new();
        value_bag.insert("key".into(), json!(secret));
        self.secrets.insert(
            key_id.to_string(),
            RecoveryKeyValue {
                key_id: key_id.to_string(),
                key: None,
                overflow: value_bag,
            },
        );
    }
}

fn failure(op: &str, id: &str) -> DirectoryError {
    DirectoryError::service("Request_BadRequest", format!("{op} failed for {id}"))
}

#[async_trait]
impl DeviceDirectory for FakeDirectory {
    async fn list_devices(&self, projection: &[&str]) -> DirectoryResult<Vec<DeviceRecord>> {
        self.record(Call::ListDevices(
            projection.iter().map(|s| s.to_string()).collect(),
        ));
        Ok(self.devices.clone())
    }

    async fn list_provisioned_identities(&self) -> DirectoryResult<Vec<ProvisionedIdentity>> {
        self.record(Call::ListProvisioned);
        Ok(self.provisioned.clone())
    }
}

#[async_trait]
impl DeviceMutation for FakeDirectory {
    async fn update_device(&self, id: &str, update: &DeviceUpdate) -> DirectoryResult<()> {
        self.record(Call::Update(id.to_string(), update.account_enabled));
        if self.fail_update.contains(id) {
            return Err(failure("update", id));
        }
        Ok(())
    }

    async fn delete_device(&self, id: &str) -> DirectoryResult<()> {
        self.record(Call::Delete(id.to_string()));
        if self.fail_delete.contains(id) {
            return Err(failure("delete", id));
        }
        Ok(())
    }
}

#[async_trait]
impl RecoveryKeyDirectory for FakeDirectory {
    async fn list_recovery_keys(
        &self,
        device_id: &str,
    ) -> DirectoryResult<Vec<RecoveryKeyMetadata>> {
        self.record(Call::ListKeys(device_id.to_string()));
        if self.fail_list_keys.contains(device_id) {
            return Err(failure("list keys", device_id));
        }
        Ok(self.keys.get(device_id).cloned().unwrap_or_default())
    }

    async fn get_recovery_key_value(&self, key_id: &str) -> DirectoryResult<RecoveryKeyValue> {
        self.record(Call::GetKey(key_id.to_string()));
        if self.fail_get_key.contains(key_id) {
            return Err(failure("get key", key_id));
        }
        self.secrets
            .get(key_id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(key_id.to_string()))
    }
}

/// Fixed "now" for deterministic cutoffs.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 8, 0, 0).unwrap()
}

/// Device that last signed in `days` before [`test_now`].
pub fn device_signed_in_days_ago(id: &str, days: i64) -> DeviceRecord {
    DeviceRecord::new(id, format!("{id}-device"), format!("PC-{id}"))
        .with_last_sign_in(test_now() - Duration::days(days))
}

/// Device that never reported a sign-in.
pub fn device_without_sign_in(id: &str) -> DeviceRecord {
    DeviceRecord::new(id, format!("{id}-device"), format!("PC-{id}"))
}

pub fn provisioned(directory_id: &str) -> ProvisionedIdentity {
    ProvisionedIdentity {
        id: format!("autopilot-{directory_id}"),
        directory_device_id: Some(directory_id.to_string()),
        serial_number: Some(format!("SN-{directory_id}")),
    }
}
