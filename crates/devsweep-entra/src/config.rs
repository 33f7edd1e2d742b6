//! Connection configuration for Entra ID.

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;

use crate::{EntraError, EntraResult};

/// Largest page size Graph accepts for `/devices`.
pub const MAX_PAGE_SIZE: u32 = 999;

/// Default Graph API version.
pub const DEFAULT_API_VERSION: &str = "v1.0";

/// National cloud hosting the tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EntraCloudEnvironment {
    #[default]
    Commercial,
    UsGovernment,
    China,
    Germany,
    /// Explicit endpoints, for sovereign deployments and tests.
    Custom {
        graph_endpoint: String,
        login_endpoint: String,
    },
}

impl EntraCloudEnvironment {
    /// Builds a custom environment, validating both URLs.
    pub fn custom(graph_endpoint: &str, login_endpoint: &str) -> EntraResult<Self> {
        url::Url::parse(graph_endpoint)?;
        url::Url::parse(login_endpoint)?;
        Ok(Self::Custom {
            graph_endpoint: graph_endpoint.trim_end_matches('/').to_string(),
            login_endpoint: login_endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Microsoft Graph root, without trailing slash.
    #[must_use]
    pub fn graph_endpoint(&self) -> &str {
        match self {
            Self::Commercial => "https://graph.microsoft.com",
            Self::UsGovernment => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
            Self::Germany => "https://graph.microsoft.de",
            Self::Custom { graph_endpoint, .. } => graph_endpoint.as_str(),
        }
    }

    /// Token authority root, without trailing slash.
    #[must_use]
    pub fn login_endpoint(&self) -> &str {
        match self {
            Self::Commercial => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
            Self::Germany => "https://login.microsoftonline.de",
            Self::Custom { login_endpoint, .. } => login_endpoint.as_str(),
        }
    }
}

impl FromStr for EntraCloudEnvironment {
    type Err = EntraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "commercial" | "public" | "global" => Ok(Self::Commercial),
            "usgov" | "usgovernment" | "gcchigh" => Ok(Self::UsGovernment),
            "china" => Ok(Self::China),
            "germany" => Ok(Self::Germany),
            other => Err(EntraError::Config(format!(
                "Unknown cloud environment '{other}'. Supported: commercial, usgov, china, germany"
            ))),
        }
    }
}

impl fmt::Display for EntraCloudEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commercial => write!(f, "commercial"),
            Self::UsGovernment => write!(f, "usgov"),
            Self::China => write!(f, "china"),
            Self::Germany => write!(f, "germany"),
            Self::Custom { graph_endpoint, .. } => write!(f, "custom ({graph_endpoint})"),
        }
    }
}

/// App registration credentials for the client credentials flow.
#[derive(Debug)]
pub struct EntraCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Validated connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntraConfig {
    pub tenant_id: String,
    pub cloud_environment: EntraCloudEnvironment,
    pub api_version: String,
    pub page_size: u32,
}

impl EntraConfig {
    #[must_use]
    pub fn builder() -> EntraConfigBuilder {
        EntraConfigBuilder::default()
    }

    /// Graph root including the API version, e.g. `https://graph.microsoft.com/v1.0`.
    #[must_use]
    pub fn graph_base_url(&self) -> String {
        format!(
            "{}/{}",
            self.cloud_environment.graph_endpoint(),
            self.api_version
        )
    }
}

/// Builder for [`EntraConfig`].
#[derive(Debug, Default)]
pub struct EntraConfigBuilder {
    tenant_id: Option<String>,
    cloud_environment: EntraCloudEnvironment,
    api_version: Option<String>,
    page_size: Option<u32>,
}

impl EntraConfigBuilder {
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    #[must_use]
    pub fn cloud_environment(mut self, env: EntraCloudEnvironment) -> Self {
        self.cloud_environment = env;
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EntraError::Config`] if the tenant id is missing, the API
    /// version is empty, or the page size is outside `1..=999`.
    pub fn build(self) -> EntraResult<EntraConfig> {
        let tenant_id = self
            .tenant_id
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| EntraError::Config("tenant_id is required".into()))?;

        let api_version = self
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        if api_version.trim().is_empty() || api_version.contains('/') {
            return Err(EntraError::Config(format!(
                "Invalid API version '{api_version}'"
            )));
        }

        let page_size = self.page_size.unwrap_or(MAX_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(EntraError::Config(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        Ok(EntraConfig {
            tenant_id,
            cloud_environment: self.cloud_environment,
            api_version,
            page_size,
        })
    }
}
