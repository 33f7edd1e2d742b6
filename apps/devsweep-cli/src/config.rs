//! Directory connection settings from the environment.

use std::env::VarError;

use devsweep_entra::{
    EntraCloudEnvironment, EntraConfig, EntraCredentials, DEFAULT_API_VERSION, MAX_PAGE_SIZE,
};
use secrecy::SecretString;

/// Loads `.env` from the working directory when one exists.
///
/// A missing file is fine; a file that cannot be read or parsed is an error.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    ignore_missing(dotenvy::dotenv().map(|_| ()))
}

fn ignore_missing(result: Result<(), dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Err(e) if e.not_found() => Ok(()),
        other => other,
    }
}

/// Settings needed to reach the tenant's directory.
#[derive(Debug)]
pub struct DirectorySettings {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub cloud: EntraCloudEnvironment,
    pub api_version: String,
    pub page_size: u32,
}

impl DirectorySettings {
    /// Load settings from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load settings from a custom variable reader.
    ///
    /// Empty values count as unset.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let optional = |key: &str| {
            reader(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required =
            |key: &str| optional(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        let tenant_id = required("AZURE_TENANT_ID")?;
        let client_id = required("AZURE_CLIENT_ID")?;
        let client_secret = SecretString::from(required("AZURE_CLIENT_SECRET")?);

        let cloud = match (
            optional("DEVSWEEP_GRAPH_ENDPOINT"),
            optional("DEVSWEEP_LOGIN_ENDPOINT"),
        ) {
            (Some(graph), Some(login)) => EntraCloudEnvironment::custom(&graph, &login)
                .map_err(|e| ConfigError::InvalidValue("DEVSWEEP_GRAPH_ENDPOINT".into(), e.to_string()))?,
            (None, None) => match optional("DEVSWEEP_CLOUD") {
                Some(name) => name
                    .parse()
                    .map_err(|e: devsweep_entra::EntraError| {
                        ConfigError::InvalidValue("DEVSWEEP_CLOUD".into(), e.to_string())
                    })?,
                None => EntraCloudEnvironment::default(),
            },
            (Some(_), None) => return Err(ConfigError::MissingVar("DEVSWEEP_LOGIN_ENDPOINT".into())),
            (None, Some(_)) => return Err(ConfigError::MissingVar("DEVSWEEP_GRAPH_ENDPOINT".into())),
        };

        let api_version =
            optional("DEVSWEEP_GRAPH_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let page_size = match optional("DEVSWEEP_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=MAX_PAGE_SIZE).contains(n))
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "DEVSWEEP_PAGE_SIZE".into(),
                        format!("expected 1..={MAX_PAGE_SIZE}, got '{raw}'"),
                    )
                })?,
            None => MAX_PAGE_SIZE,
        };

        Ok(Self {
            tenant_id,
            client_id,
            client_secret,
            cloud,
            api_version,
            page_size,
        })
    }

    /// Splits the settings into the client configuration and credentials.
    pub fn into_parts(self) -> Result<(EntraConfig, EntraCredentials), devsweep_entra::EntraError> {
        let config = EntraConfig::builder()
            .tenant_id(self.tenant_id)
            .cloud_environment(self.cloud)
            .api_version(self.api_version)
            .page_size(self.page_size)
            .build()?;
        let credentials = EntraCredentials {
            client_id: self.client_id,
            client_secret: self.client_secret,
        };
        Ok((config, credentials))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
