//! Two-location attribute resolution
//!
//! Depending on the service version, key attributes arrive either as
//! first-class fields or inside an overflow property bag. Every read of such
//! an attribute goes through [`resolve_attribute`], which knows exactly these
//! two locations and prefers the first-class one.

use serde_json::{Map, Value};

/// Overflow property bag holding attributes the typed model does not name.
pub type AttributeBag = Map<String, Value>;

/// Overflow name of a key's volume type.
pub const VOLUME_TYPE: &str = "volumeType";

/// Overflow name of a key's creation timestamp.
pub const CREATED_DATE_TIME: &str = "createdDateTime";

/// Overflow name of a key's secret value.
pub const KEY: &str = "key";

/// Where a resolved attribute was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// The typed field on the record.
    FirstClass,
    /// The overflow property bag.
    Overflow,
}

/// An attribute value together with the location it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttribute {
    pub value: String,
    pub source: LookupStrategy,
}

/// Resolves an attribute from the first-class field, falling back to the
/// overflow bag entry called `name`.
///
/// Empty strings count as absent in both locations. Overflow values that are
/// numbers or booleans are rendered as text; nested objects, arrays and nulls
/// are treated as absent.
#[must_use]
pub fn resolve_attribute(
    first_class: Option<&str>,
    overflow: &AttributeBag,
    name: &str,
) -> Option<ResolvedAttribute> {
    if let Some(value) = first_class.filter(|v| !v.trim().is_empty()) {
        return Some(ResolvedAttribute {
            value: value.to_string(),
            source: LookupStrategy::FirstClass,
        });
    }

    let value = match overflow.get(name)? {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };

    Some(ResolvedAttribute {
        value,
        source: LookupStrategy::Overflow,
    })
}

/// Convenience wrapper returning only the resolved value.
#[must_use]
pub fn resolve_value(first_class: Option<&str>, overflow: &AttributeBag, name: &str) -> Option<String> {
    resolve_attribute(first_class, overflow, name).map(|r| r.value)
}
