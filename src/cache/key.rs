//! Key Codec Module
//!
//! Derives one canonical string key from a (namespace, parameter object)
//! pair, and matches wildcard patterns against canonical keys.
//!
//! Two calls with the same namespace and field-reordered-but-equal
//! parameter objects produce the same key: parameters are canonicalized
//! by sorting object keys before hashing. The hash is xxh64, which is
//! deterministic across processes — canonical keys end up in persisted
//! snapshots, so a per-process seed would break recovery.

use serde_json::{Map, Value};
use xxhash_rust::xxh64::xxh64;

// == Make Key ==
/// Derives the canonical key for a namespace and optional parameters.
///
/// Without parameters the key is the namespace verbatim. With parameters
/// the key is `"{namespace}:{hash}"` where the hash is a fixed-width hex
/// digest of the canonicalized parameter object.
pub fn make_key(namespace: &str, params: Option<&Value>) -> String {
    match params {
        None => namespace.to_string(),
        Some(params) => {
            let canonical = canonicalize(params).to_string();
            let hash = xxh64(canonical.as_bytes(), 0);
            format!("{namespace}:{hash:016x}")
        }
    }
}

// == Canonicalize ==
/// Rebuilds a JSON value with all object keys in sorted order.
///
/// Sorting is applied recursively so the serialized form is identical
/// for equal values regardless of map insertion order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<(&String, &Value)> = map.iter().collect();
            sorted.sort_by_key(|(key, _)| key.as_str());

            let mut out = Map::new();
            for (key, value) in sorted {
                out.insert(key.clone(), canonicalize(value));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

// == Wildcard Match ==
/// Matches a wildcard pattern against a full canonical key.
///
/// `*` matches any substring (including the empty one); everything else
/// matches literally. The pattern is anchored at both ends. Because the
/// hash suffix of a parameterized key is opaque, patterns are in practice
/// namespace-prefix matchers such as `"orders_*"`.
pub fn wildcard_match(pattern: &str, key: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();

    // No wildcard: exact match only
    if segments.len() == 1 {
        return pattern == key;
    }

    let mut rest = key;

    // First segment is anchored at the start
    if let Some(first) = segments.first() {
        match rest.strip_prefix(first) {
            Some(after) => rest = after,
            None => return false,
        }
    }

    // Last segment is anchored at the end
    let last = segments[segments.len() - 1];
    match rest.strip_suffix(last) {
        Some(before) => rest = before,
        None => return false,
    }

    // Middle segments must appear in order in what remains
    for segment in &segments[1..segments.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(at) => rest = &rest[at + segment.len()..],
            None => return false,
        }
    }

    true
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_without_params_is_namespace() {
        assert_eq!(make_key("trusted_devices_all", None), "trusted_devices_all");
    }

    #[test]
    fn test_key_with_params_has_namespace_prefix_and_hash() {
        let key = make_key("operator_summary", Some(&json!({"line": 3})));

        let (prefix, hash) = key.split_once(':').expect("key should contain ':'");
        assert_eq!(prefix, "operator_summary");
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_field_order_does_not_change_key() {
        let a = json!({"line": 3, "shift": "night", "site": "A"});
        let b = json!({"site": "A", "line": 3, "shift": "night"});

        assert_eq!(make_key("ops", Some(&a)), make_key("ops", Some(&b)));
    }

    #[test]
    fn test_nested_field_order_does_not_change_key() {
        let a = json!({"filter": {"min": 1, "max": 9}, "page": 2});
        let b = json!({"page": 2, "filter": {"max": 9, "min": 1}});

        assert_eq!(make_key("ops", Some(&a)), make_key("ops", Some(&b)));
    }

    #[test]
    fn test_different_params_differ() {
        let a = make_key("ops", Some(&json!({"line": 3})));
        let b = make_key("ops", Some(&json!({"line": 4})));
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_params_different_namespace_differ() {
        let params = json!({"line": 3});
        assert_ne!(
            make_key("ops", Some(&params)),
            make_key("devices", Some(&params))
        );
    }

    #[test]
    fn test_wildcard_exact_match() {
        assert!(wildcard_match("orders_open", "orders_open"));
        assert!(!wildcard_match("orders_open", "orders_open:abc"));
    }

    #[test]
    fn test_wildcard_prefix_match() {
        assert!(wildcard_match("orders_*", "orders_open"));
        assert!(wildcard_match("orders_*", "orders_open:1a2b3c4d5e6f7890"));
        assert!(wildcard_match("orders_*", "orders_"));
        assert!(!wildcard_match("orders_*", "users_open"));
    }

    #[test]
    fn test_wildcard_suffix_and_middle() {
        assert!(wildcard_match("*_all", "trusted_devices_all"));
        assert!(wildcard_match("orders_*_v2", "orders_open_v2"));
        assert!(!wildcard_match("orders_*_v2", "orders_open_v3"));
    }

    #[test]
    fn test_wildcard_multiple_stars() {
        assert!(wildcard_match("*orders*open*", "all_orders_currently_open_x"));
        assert!(!wildcard_match("*open*orders*", "all_orders_currently_open"));
    }

    #[test]
    fn test_wildcard_star_only_matches_everything() {
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("*", "anything:0011223344556677"));
    }
}
