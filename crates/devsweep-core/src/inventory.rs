//! Device inventory retrieval.

use tracing::{info, instrument};

use crate::error::DirectoryResult;
use crate::traits::DeviceDirectory;
use crate::types::DeviceRecord;

/// Attributes requested for every inventory fetch.
pub const DEVICE_PROJECTION: &[&str] = &[
    "id",
    "deviceId",
    "displayName",
    "accountEnabled",
    "operatingSystem",
    "operatingSystemVersion",
    "trustType",
    "approximateLastSignInDateTime",
];

/// Fetches the complete device set with the fixed projection.
#[instrument(skip(directory))]
pub async fn fetch_inventory<D>(directory: &D) -> DirectoryResult<Vec<DeviceRecord>>
where
    D: DeviceDirectory + ?Sized,
{
    info!("Fetching device inventory");
    let devices = directory.list_devices(DEVICE_PROJECTION).await?;
    info!(count = devices.len(), "Device inventory fetched");
    Ok(devices)
}
