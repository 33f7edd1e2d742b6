//! Fuzz target for first-class / overflow attribute resolution.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_attribute_resolver -- -max_total_time=600

#![no_main]

use arbitrary::Arbitrary;
use devsweep_core::attributes::{resolve_attribute, AttributeBag, LookupStrategy};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct ResolverInput {
    first_class: Option<String>,
    overflow: Vec<(String, String)>,
    name: String,
}

fuzz_target!(|input: ResolverInput| {
    let mut bag = AttributeBag::new();
    for (k, v) in input.overflow {
        bag.insert(k, serde_json::Value::String(v));
    }

    if let Some(resolved) = resolve_attribute(input.first_class.as_deref(), &bag, &input.name) {
        assert!(!resolved.value.trim().is_empty());
        if resolved.source == LookupStrategy::Overflow {
            assert!(input
                .first_class
                .as_deref()
                .map_or(true, |v| v.trim().is_empty()));
        }
    }
});
