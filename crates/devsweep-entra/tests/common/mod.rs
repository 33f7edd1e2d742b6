//! Common test utilities for devsweep-entra integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use devsweep_entra::{EntraCloudEnvironment, EntraConfig, EntraCredentials, EntraDirectory};

pub const TENANT_ID: &str = "test-tenant";
pub const ACCESS_TOKEN: &str = "mock-access-token";

/// Test data factory for Entra devices.
pub fn create_test_device(id: &str, name: &str, last_sign_in: Option<&str>) -> Value {
    json!({
        "id": id,
        "deviceId": format!("dev-{}", id),
        "displayName": name,
        "accountEnabled": true,
        "operatingSystem": "Windows",
        "operatingSystemVersion": "10.0.22631.3007",
        "trustType": "AzureAd",
        "approximateLastSignInDateTime": last_sign_in
    })
}

/// Test data factory for Autopilot identities.
pub fn create_autopilot_identity(id: &str, directory_device_id: Option<&str>) -> Value {
    json!({
        "id": id,
        "azureActiveDirectoryDeviceId": directory_device_id,
        "serialNumber": format!("SN-{}", id)
    })
}

/// Test data factory for recovery key metadata.
pub fn create_key_metadata(key_id: &str, device_id: &str, volume_type: &str) -> Value {
    json!({
        "id": key_id,
        "createdDateTime": "2025-01-10T09:00:00Z",
        "volumeType": volume_type,
        "deviceId": device_id
    })
}

/// Wraps items in an `OData` collection response.
pub fn create_odata_response(items: Vec<Value>, next_link: Option<&str>) -> Value {
    let mut response = json!({ "value": items });
    if let Some(link) = next_link {
        response["@odata.nextLink"] = json!(link);
    }
    response
}

/// Creates an `OData` error response.
pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

/// Mock server wrapper with common setup helpers.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    /// Creates a mock Graph server with the token endpoint mounted.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let mock = Self { server };
        mock.mock_token_endpoint().await;
        mock
    }

    /// Returns the mock server's base URL.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Builds a directory client pointed at this server.
    pub fn directory(&self, page_size: u32) -> EntraDirectory {
        let config = EntraConfig::builder()
            .tenant_id(TENANT_ID)
            .cloud_environment(EntraCloudEnvironment::custom(&self.url(), &self.url()).unwrap())
            .page_size(page_size)
            .build()
            .unwrap();
        let credentials = EntraCredentials {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string().into(),
        };
        EntraDirectory::new(config, credentials).unwrap()
    }

    /// Sets up the OAuth token endpoint.
    pub async fn mock_token_endpoint(&self) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/oauth2/v2.0/token", TENANT_ID)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_token_response(ACCESS_TOKEN, 3600)),
            )
            .mount(&self.server)
            .await;
    }

    /// Serves `items` from `collection` in pages of `page_size`, linked by
    /// `$skiptoken`.
    pub async fn mock_paged_collection(&self, collection: &str, items: Vec<Value>, page_size: usize) {
        let pages: Vec<Vec<Value>> = if items.is_empty() {
            vec![Vec::new()]
        } else {
            items.chunks(page_size).map(|c| c.to_vec()).collect()
        };
        let total_pages = pages.len();

        for (i, page) in pages.into_iter().enumerate() {
            let next_link = if i < total_pages - 1 {
                Some(format!(
                    "{}/v1.0/{}?$skiptoken=page{}",
                    self.url(),
                    collection,
                    i + 1
                ))
            } else {
                None
            };
            let response = create_odata_response(page, next_link.as_deref());

            let mock = Mock::given(method("GET"))
                .and(path(format!("/v1.0/{}", collection)))
                .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()));
            let mock = if i == 0 {
                mock.and(query_param_is_missing("$skiptoken"))
            } else {
                mock.and(query_param("$skiptoken", format!("page{}", i).as_str()))
            };
            mock.respond_with(ResponseTemplate::new(200).set_body_json(response))
                .expect(1)
                .mount(&self.server)
                .await;
        }
    }

    /// Sets up the device list endpoint.
    pub async fn mock_devices_endpoint(&self, devices: Vec<Value>, page_size: usize) {
        self.mock_paged_collection("devices", devices, page_size).await;
    }

    /// Sets up the Autopilot identity list endpoint.
    pub async fn mock_autopilot_endpoint(&self, identities: Vec<Value>) {
        self.mock_paged_collection(
            "deviceManagement/windowsAutopilotDeviceIdentities",
            identities,
            100,
        )
        .await;
    }

    /// Sets up the device disable endpoint.
    pub async fn mock_disable_device_endpoint(&self, id: &str, status: u16) {
        Mock::given(method("PATCH"))
            .and(path(format!("/v1.0/devices/{}", id)))
            .and(body_json(json!({"accountEnabled": false})))
            .respond_with(self.status_response(status))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Sets up the device delete endpoint.
    pub async fn mock_delete_device_endpoint(&self, id: &str, status: u16) {
        Mock::given(method("DELETE"))
            .and(path(format!("/v1.0/devices/{}", id)))
            .respond_with(self.status_response(status))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Sets up the recovery key listing for one device.
    pub async fn mock_recovery_keys_endpoint(&self, device_id: &str, keys: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/v1.0/informationProtection/bitlocker/recoveryKeys"))
            .and(query_param(
                "$filter",
                format!("deviceId eq '{}'", device_id).as_str(),
            ))
            .and(header("ocp-client-name", "devsweep"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_odata_response(keys, None)),
            )
            .mount(&self.server)
            .await;
    }

    /// Sets up the recovery key secret endpoint.
    pub async fn mock_recovery_key_value_endpoint(&self, key_id: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/v1.0/informationProtection/bitlocker/recoveryKeys/{}",
                key_id
            )))
            .and(query_param("$select", "key"))
            .and(header("ocp-client-name", "devsweep"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answers any request on `path` with an `OData` error.
    pub async fn mock_error(&self, http_method: &str, at: &str, status: u16, code: &str) {
        Mock::given(method(http_method))
            .and(path(at))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(create_odata_error(code, "mock failure")),
            )
            .mount(&self.server)
            .await;
    }

    fn status_response(&self, status: u16) -> ResponseTemplate {
        if status < 300 {
            ResponseTemplate::new(status)
        } else {
            ResponseTemplate::new(status)
                .set_body_json(create_odata_error("Request_ResourceNotFound", "mock failure"))
        }
    }
}

/// Generate a sequence of test devices that never signed in.
pub fn generate_test_devices(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| create_test_device(&format!("device-{}", i), &format!("PC-{:04}", i), None))
        .collect()
}
