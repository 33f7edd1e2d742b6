//! Windows Autopilot device identities.
//!
//! Needs `DeviceManagementServiceConfig.Read.All` on top of device read.

use devsweep_core::ProvisionedIdentity;
use tracing::{info, instrument, warn};

use crate::{EntraDirectory, EntraError, EntraResult};

const AUTOPILOT_SELECT: &str = "id,azureActiveDirectoryDeviceId,serialNumber";

/// Maps a `windowsAutopilotDeviceIdentity` onto a [`ProvisionedIdentity`].
pub fn provisioned_identity_from_json(
    value: &serde_json::Value,
) -> EntraResult<ProvisionedIdentity> {
    let text = |name: &str| {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let id = text("id").ok_or_else(|| EntraError::InvalidObject {
        object: "windowsAutopilotDeviceIdentity",
        message: "missing id".into(),
    })?;

    Ok(ProvisionedIdentity {
        id,
        directory_device_id: text("azureActiveDirectoryDeviceId"),
        serial_number: text("serialNumber"),
    })
}

impl EntraDirectory {
    /// Lists every Autopilot registration in the tenant.
    #[instrument(skip(self))]
    pub async fn fetch_autopilot_identities(&self) -> EntraResult<Vec<ProvisionedIdentity>> {
        let url = format!(
            "{}/deviceManagement/windowsAutopilotDeviceIdentities?$select={}",
            self.graph_client().base_url(),
            AUTOPILOT_SELECT
        );

        let mut identities = Vec::new();
        self.graph_client()
            .get_paginated(&url, &[], |page: Vec<serde_json::Value>| {
                for value in page {
                    match provisioned_identity_from_json(&value) {
                        Ok(identity) => identities.push(identity),
                        Err(e) => warn!("Skipping Autopilot identity: {}", e),
                    }
                }
                Ok(())
            })
            .await?;

        let unlinked = identities
            .iter()
            .filter(|i| i.directory_device_id.is_none())
            .count();
        info!(
            count = identities.len(),
            unlinked, "Autopilot identities listed"
        );
        Ok(identities)
    }
}
