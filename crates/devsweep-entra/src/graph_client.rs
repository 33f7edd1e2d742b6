//! Microsoft Graph HTTP client with `OData` paging.
//!
//! Every request is issued exactly once. Throttling is the caller's job
//! (inter-item delays); error responses are decoded into
//! [`EntraError::GraphApi`] and handed back untouched.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{EntraConfig, EntraCredentials, EntraError, EntraResult, TokenCache};

/// `OData` error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error body.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "innerError")]
    pub inner_error: Option<serde_json::Value>,
}

/// One page of a collection response.
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Extra request headers, as `(name, value)` pairs.
pub type Headers<'a> = &'a [(&'a str, &'a str)];

/// Microsoft Graph API client.
#[derive(Debug)]
pub struct GraphClient {
    http_client: reqwest::Client,
    token_cache: TokenCache,
    base_url: String,
}

impl GraphClient {
    /// Creates a client for the configured tenant and cloud.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &EntraConfig, credentials: EntraCredentials) -> EntraResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EntraError::Config(format!("Failed to create HTTP client: {e}")))?;

        let token_cache = TokenCache::new(
            credentials,
            &config.cloud_environment,
            &config.tenant_id,
            http_client.clone(),
        );

        Ok(Self {
            http_client,
            token_cache,
            base_url: config.graph_base_url(),
        })
    }

    /// Graph root including the API version.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs a GET request and decodes the JSON body.
    #[instrument(skip(self, headers))]
    pub async fn get<T: DeserializeOwned>(&self, url: &str, headers: Headers<'_>) -> EntraResult<T> {
        let response = self.send(reqwest::Method::GET, url, headers, None::<&()>).await?;
        response.json().await.map_err(EntraError::from)
    }

    /// Performs a PATCH request; Graph answers 204 No Content.
    #[instrument(skip(self, body))]
    pub async fn patch<B: Serialize>(&self, url: &str, body: &B) -> EntraResult<()> {
        self.send(reqwest::Method::PATCH, url, &[], Some(body)).await?;
        Ok(())
    }

    /// Performs a DELETE request.
    #[instrument(skip(self))]
    pub async fn delete(&self, url: &str) -> EntraResult<()> {
        self.send(reqwest::Method::DELETE, url, &[], None::<&()>)
            .await?;
        Ok(())
    }

    async fn send<B: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        headers: Headers<'_>,
        body: Option<&B>,
    ) -> EntraResult<reqwest::Response> {
        let token = self.token_cache.get_token().await?;

        let mut request = self
            .http_client
            .request(method, url)
            .bearer_auth(&token);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(decode_error(status.as_u16(), &error_body))
    }

    /// Fetches every page of a collection, handing each page to `callback`.
    ///
    /// Returns the number of pages fetched.
    #[instrument(skip(self, headers, callback))]
    pub async fn get_paginated<T, F>(
        &self,
        initial_url: &str,
        headers: Headers<'_>,
        mut callback: F,
    ) -> EntraResult<usize>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>) -> EntraResult<()>,
    {
        let mut url = initial_url.to_string();
        let mut pages = 0;

        loop {
            debug!("Fetching page: {}", url);
            let response: ODataResponse<T> = self.get(&url, headers).await?;
            pages += 1;

            callback(response.value)?;

            match response.next_link {
                Some(next) => url = next,
                None => return Ok(pages),
            }
        }
    }

    /// Fetches every page of a collection into one vector.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        initial_url: &str,
        headers: Headers<'_>,
    ) -> EntraResult<Vec<T>> {
        let mut items = Vec::new();
        self.get_paginated(initial_url, headers, |page: Vec<T>| {
            items.extend(page);
            Ok(())
        })
        .await?;
        Ok(items)
    }
}

/// Turns a non-success response body into a Graph error.
fn decode_error(status: u16, body: &str) -> EntraError {
    match serde_json::from_str::<ODataError>(body) {
        Ok(odata_error) => EntraError::GraphApi {
            status,
            code: odata_error.error.code,
            message: odata_error.error.message,
            inner_error: odata_error.error.inner_error.map(|v| v.to_string()),
        },
        Err(_) => EntraError::GraphApi {
            status,
            code: status.to_string(),
            message: body.to_string(),
            inner_error: None,
        },
    }
}
