//! Device inventory and device writes.

use chrono::{DateTime, Utc};
use devsweep_core::{DeviceRecord, DeviceUpdate};
use tracing::{debug, info, instrument, warn};

use crate::{EntraDirectory, EntraError, EntraResult};

/// Maps a Graph `device` object onto a [`DeviceRecord`].
///
/// Only `id` is required. An empty or unparseable
/// `approximateLastSignInDateTime` is treated as absent.
pub fn device_from_json(value: &serde_json::Value) -> EntraResult<DeviceRecord> {
    let text = |name: &str| {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let id = text("id").ok_or_else(|| EntraError::InvalidObject {
        object: "device",
        message: "missing id".into(),
    })?;

    let last_sign_in = text("approximateLastSignInDateTime").and_then(|raw| {
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                debug!(device = %id, raw = %raw, error = %e, "Unparseable last sign-in, treating as absent");
                None
            }
        }
    });

    Ok(DeviceRecord {
        device_id: text("deviceId").unwrap_or_default(),
        display_name: text("displayName").unwrap_or_default(),
        account_enabled: value.get("accountEnabled").and_then(|v| v.as_bool()),
        operating_system: text("operatingSystem"),
        operating_system_version: text("operatingSystemVersion"),
        trust_type: text("trustType"),
        last_sign_in,
        id,
    })
}

impl EntraDirectory {
    fn device_query_url(&self, projection: &[&str]) -> String {
        let mut url = format!(
            "{}/devices?$top={}",
            self.graph_client().base_url(),
            self.config().page_size
        );
        if !projection.is_empty() {
            url.push_str("&$select=");
            url.push_str(&projection.join(","));
        }
        url
    }

    /// Lists every device in the tenant.
    #[instrument(skip(self))]
    pub async fn fetch_devices(&self, projection: &[&str]) -> EntraResult<Vec<DeviceRecord>> {
        let url = self.device_query_url(projection);
        let mut devices = Vec::new();

        let pages = self
            .graph_client()
            .get_paginated(&url, &[], |page: Vec<serde_json::Value>| {
                debug!("Processing page with {} devices", page.len());
                for value in page {
                    match device_from_json(&value) {
                        Ok(device) => devices.push(device),
                        Err(e) => warn!("Skipping device: {}", e),
                    }
                }
                Ok(())
            })
            .await?;

        info!(pages, count = devices.len(), "Devices listed");
        Ok(devices)
    }

    /// Applies a partial update to a device.
    #[instrument(skip(self, update))]
    pub async fn patch_device(&self, id: &str, update: &DeviceUpdate) -> EntraResult<()> {
        let url = format!(
            "{}/devices/{}",
            self.graph_client().base_url(),
            urlencoding::encode(id)
        );
        self.graph_client().patch(&url, update).await?;
        debug!(device = id, "Device updated");
        Ok(())
    }

    /// Deletes a device.
    #[instrument(skip(self))]
    pub async fn remove_device(&self, id: &str) -> EntraResult<()> {
        let url = format!(
            "{}/devices/{}",
            self.graph_client().base_url(),
            urlencoding::encode(id)
        );
        self.graph_client().delete(&url).await?;
        debug!(device = id, "Device deleted");
        Ok(())
    }
}
