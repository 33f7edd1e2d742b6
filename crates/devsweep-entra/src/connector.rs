//! Entra ID implementation of the directory capability traits.

use async_trait::async_trait;
use devsweep_core::{
    DeviceDirectory, DeviceMutation, DeviceRecord, DeviceUpdate, DirectoryError, DirectoryResult,
    ProvisionedIdentity, RecoveryKeyDirectory, RecoveryKeyMetadata, RecoveryKeyValue,
};
use tracing::info;

use crate::{EntraConfig, EntraCredentials, EntraResult, GraphClient};

/// Directory backed by Microsoft Graph for one tenant.
#[derive(Debug)]
pub struct EntraDirectory {
    config: EntraConfig,
    graph_client: GraphClient,
}

impl EntraDirectory {
    /// Creates a directory client. No network traffic happens until the
    /// first call.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: EntraConfig, credentials: EntraCredentials) -> EntraResult<Self> {
        let graph_client = GraphClient::new(&config, credentials)?;
        info!(
            tenant = %config.tenant_id,
            cloud = %config.cloud_environment,
            "Entra directory client created"
        );
        Ok(Self {
            config,
            graph_client,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EntraConfig {
        &self.config
    }

    #[must_use]
    pub fn graph_client(&self) -> &GraphClient {
        &self.graph_client
    }
}

#[async_trait]
impl DeviceDirectory for EntraDirectory {
    async fn list_devices(&self, projection: &[&str]) -> DirectoryResult<Vec<DeviceRecord>> {
        self.fetch_devices(projection)
            .await
            .map_err(DirectoryError::from)
    }

    async fn list_provisioned_identities(&self) -> DirectoryResult<Vec<ProvisionedIdentity>> {
        self.fetch_autopilot_identities()
            .await
            .map_err(DirectoryError::from)
    }
}

#[async_trait]
impl DeviceMutation for EntraDirectory {
    async fn update_device(&self, id: &str, update: &DeviceUpdate) -> DirectoryResult<()> {
        self.patch_device(id, update)
            .await
            .map_err(DirectoryError::from)
    }

    async fn delete_device(&self, id: &str) -> DirectoryResult<()> {
        self.remove_device(id).await.map_err(DirectoryError::from)
    }
}

#[async_trait]
impl RecoveryKeyDirectory for EntraDirectory {
    async fn list_recovery_keys(
        &self,
        device_id: &str,
    ) -> DirectoryResult<Vec<RecoveryKeyMetadata>> {
        self.fetch_recovery_keys(device_id)
            .await
            .map_err(DirectoryError::from)
    }

    async fn get_recovery_key_value(&self, key_id: &str) -> DirectoryResult<RecoveryKeyValue> {
        self.fetch_recovery_key_value(key_id)
            .await
            .map_err(DirectoryError::from)
    }
}
