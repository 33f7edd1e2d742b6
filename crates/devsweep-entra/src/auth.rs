//! OAuth2 client credentials authentication for Microsoft Graph.

use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::{EntraCloudEnvironment, EntraCredentials, EntraError, EntraResult};

/// OAuth2 token response from the token authority.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Cached OAuth2 access token.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Access token source for one tenant and app registration.
///
/// Tokens are reused until five minutes before expiry.
#[derive(Debug)]
pub struct TokenCache {
    credentials: EntraCredentials,
    token_url: String,
    scope: String,
    http_client: reqwest::Client,
    cached_token: Mutex<Option<CachedToken>>,
    grace_period: Duration,
}

impl TokenCache {
    pub fn new(
        credentials: EntraCredentials,
        cloud_environment: &EntraCloudEnvironment,
        tenant_id: &str,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            credentials,
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                cloud_environment.login_endpoint(),
                tenant_id
            ),
            scope: format!("{}/.default", cloud_environment.graph_endpoint()),
            http_client,
            cached_token: Mutex::new(None),
            grace_period: Duration::minutes(5),
        }
    }

    /// Token endpoint this cache requests tokens from.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Gets a valid access token, requesting a new one if necessary.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> EntraResult<String> {
        let mut cache = self.cached_token.lock().await;
        if let Some(ref token) = *cache {
            if !token.is_expired(self.grace_period) {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Requesting access token");
        let token = self.acquire_token().await?;
        let access_token = token.access_token.clone();
        *cache = Some(token);
        Ok(access_token)
    }

    async fn acquire_token(&self) -> EntraResult<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.expose_secret()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| EntraError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EntraError::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| EntraError::Auth(format!("Failed to parse token response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);
        debug!(
            "Acquired token, expires at {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}
