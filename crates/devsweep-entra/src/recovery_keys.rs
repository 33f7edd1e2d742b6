//! BitLocker recovery keys.
//!
//! Listing needs `BitLockerKey.ReadBasic.All`; reading the secret needs
//! `BitLockerKey.Read.All`. Every call carries the client identification
//! headers the recovery key endpoints audit.

use devsweep_core::attributes::{AttributeBag, CREATED_DATE_TIME, KEY, VOLUME_TYPE};
use devsweep_core::{RecoveryKeyMetadata, RecoveryKeyValue};
use tracing::{debug, instrument, warn};

use crate::{EntraDirectory, EntraError, EntraResult};

const CLIENT_NAME: &str = "devsweep";
const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client identification headers for recovery key calls.
pub const CLIENT_HEADERS: [(&str, &str); 2] = [
    ("ocp-client-name", CLIENT_NAME),
    ("ocp-client-version", CLIENT_VERSION),
];

/// Property some SDK serializations nest unknown attributes under.
const ADDITIONAL_PROPERTIES: &str = "additionalProperties";

/// Splits a Graph object into its `id`, the named string properties, and
/// everything else.
///
/// A typed property only counts when it is a JSON string. Anything else
/// under that name is left in the bag for the resolver to render.
fn split_object(
    object: &'static str,
    value: &serde_json::Value,
    typed: &[&str],
) -> EntraResult<(String, Vec<Option<String>>, AttributeBag)> {
    let map = value.as_object().ok_or_else(|| EntraError::InvalidObject {
        object,
        message: "expected a JSON object".into(),
    })?;

    let id = map
        .get("id")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(String::from)
        .ok_or_else(|| EntraError::InvalidObject {
            object,
            message: "missing id".into(),
        })?;

    let mut fields = vec![None; typed.len()];
    let mut overflow = AttributeBag::new();

    for (name, v) in map {
        if name == "id" || name.starts_with("@odata.") {
            continue;
        }
        if name == ADDITIONAL_PROPERTIES {
            if let Some(nested) = v.as_object() {
                for (k, nv) in nested {
                    overflow.entry(k.clone()).or_insert_with(|| nv.clone());
                }
                continue;
            }
        }
        match (typed.iter().position(|t| *t == name.as_str()), v.as_str()) {
            (Some(pos), Some(s)) => fields[pos] = Some(s.to_string()),
            _ => {
                overflow.insert(name.clone(), v.clone());
            }
        }
    }

    Ok((id, fields, overflow))
}

/// Maps a `bitlockerRecoveryKey` listing entry onto [`RecoveryKeyMetadata`].
pub fn key_metadata_from_json(value: &serde_json::Value) -> EntraResult<RecoveryKeyMetadata> {
    let (key_id, mut fields, overflow) = split_object(
        "bitlockerRecoveryKey",
        value,
        &["deviceId", VOLUME_TYPE, CREATED_DATE_TIME],
    )?;
    let created_at = fields.pop().flatten();
    let volume_type = fields.pop().flatten();
    let device_id = fields.pop().flatten();

    Ok(RecoveryKeyMetadata {
        key_id,
        device_id,
        volume_type,
        created_at,
        overflow,
    })
}

/// Maps a `bitlockerRecoveryKey` fetched with `$select=key`.
pub fn key_value_from_json(value: &serde_json::Value) -> EntraResult<RecoveryKeyValue> {
    let (key_id, mut fields, overflow) = split_object("bitlockerRecoveryKey", value, &[KEY])?;

    Ok(RecoveryKeyValue {
        key_id,
        key: fields.pop().flatten(),
        overflow,
    })
}

/// `$filter` expression selecting keys of one device, with the literal quoted.
pub fn device_filter(device_id: &str) -> String {
    format!("deviceId eq '{}'", device_id.replace('\'', "''"))
}

impl EntraDirectory {
    /// Lists recovery key metadata for a device, by its `deviceId`.
    #[instrument(skip(self))]
    pub async fn fetch_recovery_keys(&self, device_id: &str) -> EntraResult<Vec<RecoveryKeyMetadata>> {
        let url = format!(
            "{}/informationProtection/bitlocker/recoveryKeys?$filter={}",
            self.graph_client().base_url(),
            urlencoding::encode(&device_filter(device_id))
        );

        let raw: Vec<serde_json::Value> = self
            .graph_client()
            .get_all(&url, &CLIENT_HEADERS)
            .await?;
        let mut keys = Vec::with_capacity(raw.len());
        for value in &raw {
            match key_metadata_from_json(value) {
                Ok(key) => keys.push(key),
                Err(e) => warn!(device_id, "Skipping recovery key: {}", e),
            }
        }

        debug!(device_id, count = keys.len(), "Recovery keys listed");
        Ok(keys)
    }

    /// Fetches the secret of one recovery key.
    ///
    /// The secret is never logged.
    #[instrument(skip(self))]
    pub async fn fetch_recovery_key_value(&self, key_id: &str) -> EntraResult<RecoveryKeyValue> {
        let url = format!(
            "{}/informationProtection/bitlocker/recoveryKeys/{}?$select={}",
            self.graph_client().base_url(),
            urlencoding::encode(key_id),
            KEY
        );

        let raw: serde_json::Value = self.graph_client().get(&url, &CLIENT_HEADERS).await?;
        key_value_from_json(&raw)
    }
}
