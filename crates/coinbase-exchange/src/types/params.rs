/*
[INPUT]:  Caller-supplied request parameters
[OUTPUT]: Ordered query strings and JSON bodies
[POS]:    Data layer - request parameter mapping
[UPDATE]: When parameter encoding rules change
*/

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Ordered, string-keyed request parameters
///
/// Insertion order is kept for both the query string and the JSON body, so
/// the signed path/body matches what is sent byte for byte.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, Value)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Params::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a parameter, keeping its original position
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    /// Insert only when the key is absent
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if !self.contains(&key) {
            self.0.push((key, value.into()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(index).1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Form-encoded query string, without the leading `?`
    ///
    /// Strings are sent verbatim, other scalars in their JSON form, nulls are
    /// skipped.
    pub fn to_query(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            match value {
                Value::Null => {}
                Value::String(s) => {
                    serializer.append_pair(key, s);
                }
                other => {
                    serializer.append_pair(key, &other.to_string());
                }
            }
        }
        serializer.finish()
    }

    /// Append the query string to `path` when there is one
    pub fn to_path_and_query(&self, path: &str) -> String {
        let query = self.to_query();
        if query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{query}")
        }
    }

    /// JSON object body
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_keeps_insertion_order() {
        let params = Params::new()
            .with("status", "all")
            .with("limit", 100)
            .with("after", "abc def");
        assert_eq!(params.to_query(), "status=all&limit=100&after=abc+def");
        assert_eq!(
            params.to_path_and_query("/orders"),
            "/orders?status=all&limit=100&after=abc+def"
        );
    }

    #[test]
    fn test_empty_params_leave_path_untouched() {
        assert_eq!(Params::new().to_path_and_query("/time"), "/time");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut params = Params::new().with("a", 1).with("b", 2);
        params.set("a", 3);
        assert_eq!(params.to_query(), "a=3&b=2");
    }

    #[test]
    fn test_set_default_does_not_override() {
        let mut params = Params::new().with("limit", 5);
        params.set_default("limit", 100);
        params.set_default("status", "all");
        assert_eq!(params.get("limit"), Some(&json!(5)));
        assert_eq!(params.get("status"), Some(&json!("all")));
    }

    #[test]
    fn test_json_body_keeps_insertion_order() {
        let params = Params::new()
            .with("size", "10")
            .with("price", 250)
            .with("side", "buy");
        assert_eq!(
            params.to_json().unwrap(),
            r#"{"size":"10","price":250,"side":"buy"}"#
        );
    }

    #[test]
    fn test_remove_and_nulls() {
        let mut params: Params = [("product_id", json!("BTC-USD")), ("after", Value::Null)]
            .into_iter()
            .collect();
        assert_eq!(params.to_query(), "product_id=BTC-USD");
        assert_eq!(params.remove("product_id"), Some(json!("BTC-USD")));
        assert!(!params.contains("product_id"));
        assert_eq!(params.len(), 1);
    }
}
