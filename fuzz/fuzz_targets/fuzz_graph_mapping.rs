//! Fuzz target for the Graph JSON mappers.
//!
//! Any JSON document must map to a record or a typed error, never a panic.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_graph_mapping -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    if let Ok(device) = devsweep_entra::device_from_json(&value) {
        assert!(!device.id.is_empty());
    }
    let _ = devsweep_entra::provisioned_identity_from_json(&value);

    if let Ok(meta) = devsweep_entra::key_metadata_from_json(&value) {
        assert!(!meta.key_id.is_empty());
        let _ = meta.resolved_volume_type();
        let _ = meta.resolved_created_at();
    }
    if let Ok(secret) = devsweep_entra::key_value_from_json(&value) {
        let _ = secret.resolved_key();
    }
});
