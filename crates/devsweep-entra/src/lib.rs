//! Microsoft Entra ID directory client for devsweep
//!
//! Implements the `devsweep-core` capability traits over the Microsoft Graph
//! API: device inventory, Windows Autopilot identities, device disable and
//! delete, and BitLocker recovery keys.
//!
//! # Features
//!
//! - `OAuth2` client credentials authentication with token caching
//! - `OData` paging for every collection read
//! - Multi-cloud support (Commercial, US Government, China, Germany, custom)
//!
//! Requests are never retried. A throttled or failed call surfaces as an
//! error for the caller to record.
//!
//! # Example
//!
//! ```no_run
//! use devsweep_core::fetch_inventory;
//! use devsweep_entra::{EntraConfig, EntraCredentials, EntraDirectory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EntraConfig::builder()
//!     .tenant_id("your-tenant-id")
//!     .build()?;
//!
//! let credentials = EntraCredentials {
//!     client_id: "your-client-id".to_string(),
//!     client_secret: "your-client-secret".to_string().into(),
//! };
//!
//! let directory = EntraDirectory::new(config, credentials)?;
//! let devices = fetch_inventory(&directory).await?;
//! println!("{} devices", devices.len());
//! # Ok(())
//! # }
//! ```

mod auth;
mod autopilot;
mod config;
mod connector;
mod devices;
mod error;
mod graph_client;
mod recovery_keys;

// Re-exports
pub use auth::TokenCache;
pub use autopilot::provisioned_identity_from_json;
pub use config::{
    EntraCloudEnvironment, EntraConfig, EntraConfigBuilder, EntraCredentials, DEFAULT_API_VERSION,
    MAX_PAGE_SIZE,
};
pub use connector::EntraDirectory;
pub use devices::device_from_json;
pub use error::{EntraError, EntraResult};
pub use graph_client::{GraphClient, Headers, ODataError, ODataErrorBody, ODataResponse};
pub use recovery_keys::{
    device_filter, key_metadata_from_json, key_value_from_json, CLIENT_HEADERS,
};
