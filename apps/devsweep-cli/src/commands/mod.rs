//! CLI command implementations

use std::time::Duration;

use devsweep_entra::EntraDirectory;
use tracing::debug;

use crate::config::DirectorySettings;
use crate::error::CliResult;

pub mod export_keys;
pub mod export_stale;
pub mod remove;

/// Builds the directory client from environment settings.
///
/// Fails before any network traffic if settings are missing or invalid.
pub fn connect() -> CliResult<EntraDirectory> {
    let settings = DirectorySettings::from_env()?;
    debug!(tenant = %settings.tenant_id, cloud = %settings.cloud, "Directory settings loaded");
    let (config, credentials) = settings.into_parts()?;
    Ok(EntraDirectory::new(config, credentials)?)
}

pub(crate) fn delay_from_ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
