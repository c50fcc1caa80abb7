//! Cache key derivation.

use std::collections::BTreeMap;

/// Builds the cache key for an endpoint and its query parameters.
///
/// Parameters are sorted by name, so the key does not depend on the order
/// the client sent them in. An endpoint without parameters is its own key.
///
/// ```
/// use std::collections::BTreeMap;
/// use gb_grid_proxy::cache::cache_key;
///
/// let mut params = BTreeMap::new();
/// params.insert("b".to_string(), "2".to_string());
/// params.insert("a".to_string(), "1".to_string());
/// assert_eq!(cache_key("demand", &params), "demand?a=1&b=2");
/// ```
pub fn cache_key(endpoint: &str, params: &BTreeMap<String, String>) -> String {
    if params.is_empty() {
        return endpoint.to_string();
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", endpoint, query)
}
