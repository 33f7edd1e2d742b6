//! Fuzz target for device list CSV parsing.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_device_list_csv -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(targets) = devsweep_cli::formats::csv::read_removal_targets(data) {
        for target in &targets {
            if let Some(ref id) = target.id {
                assert!(!id.is_empty());
            }
        }
    }
    let _ = devsweep_cli::formats::csv::read_key_export_devices(data);
});
