/*
[INPUT]:  Transport responses (status, headers, body)
[OUTPUT]: Normalized responses, decoded payloads, and data+metadata wrappers
[POS]:    Data layer - response model returned to callers
[UPDATE]: When response metadata or payload shapes change
*/

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

use super::record::Record;

/// Header key normalization shared by both transports
pub fn normalize_header_name(name: &str) -> String {
    name.to_ascii_uppercase().replace('_', "-")
}

/// Transport-independent response shape
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    pub status: u16,
    /// Upper-cased keys; repeated headers joined with `", "`
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub received_at: DateTime<Utc>,
}

impl NormalizedResponse {
    pub fn new<K, V, I>(status: u16, headers: I, body: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut normalized: BTreeMap<String, String> = BTreeMap::new();
        for (key, value) in headers {
            let key = normalize_header_name(key.as_ref());
            normalized
                .entry(key)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value.as_ref());
                })
                .or_insert_with(|| value.as_ref().to_string());
        }

        Self {
            status,
            headers: normalized,
            body: body.into(),
            received_at: Utc::now(),
        }
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&normalize_header_name(name))
            .map(String::as_str)
    }
}

/// Decoded body: JSON when it parses, the raw string otherwise
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Raw(String),
}

impl Payload {
    /// Never fails; a body that is not JSON is kept verbatim
    pub fn decode(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Raw(body.to_string()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Payload::Raw(raw) => Some(raw),
            Payload::Json(_) => None,
        }
    }

    /// Length when the payload is a JSON array
    pub fn array_len(&self) -> Option<usize> {
        self.as_json().and_then(Value::as_array).map(Vec::len)
    }

    /// Single-record view; anything but an object gives an empty record
    pub fn into_record(self) -> Record {
        match self {
            Payload::Json(value) => Record::from_value(value),
            Payload::Raw(_) => Record::default(),
        }
    }

    /// Collection view; anything but an array gives an empty collection
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Payload::Json(Value::Array(items)) => {
                items.into_iter().map(Record::from_value).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Metadata of the response a value was decoded from
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMeta(NormalizedResponse);

impl ResponseMeta {
    pub fn new(response: NormalizedResponse) -> Self {
        Self(response)
    }

    pub fn response(&self) -> &NormalizedResponse {
        &self.0
    }

    /// Raw body bytes as received
    pub fn raw(&self) -> &str {
        &self.0.body
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.0.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.0.header(name)
    }

    pub fn status(&self) -> u16 {
        self.0.status
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.0.received_at
    }
}

/// Value returned by every client call: decoded data plus response metadata
///
/// For paginated calls `meta` describes the last page fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, response: NormalizedResponse) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(response),
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    /// Transform the data, keeping the metadata
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            meta: self.meta,
        }
    }
}

impl ApiResponse<Payload> {
    pub fn into_record(self) -> ApiResponse<Record> {
        self.map(Payload::into_record)
    }

    pub fn into_records(self) -> ApiResponse<Vec<Record>> {
        self.map(Payload::into_records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headers_are_normalized() {
        let response = NormalizedResponse::new(
            200,
            [("cb-after", "123"), ("Content_Type", "application/json"), ("set-cookie", "a"), ("Set-Cookie", "b")],
            "[]",
        );
        assert_eq!(response.headers.get("CB-AFTER").map(String::as_str), Some("123"));
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("SET_COOKIE"), Some("a, b"));
    }

    #[test]
    fn test_non_json_body_falls_back_to_raw() {
        assert_eq!(Payload::decode("<html>oops</html>"), Payload::Raw("<html>oops</html>".to_string()));
        assert_eq!(Payload::decode(""), Payload::Raw(String::new()));
        assert_eq!(Payload::decode("[1,2]").array_len(), Some(2));
    }

    #[test]
    fn test_shape_conversion() {
        let record = Payload::Json(json!({"id": "test", "status": "OK"})).into_record();
        assert_eq!(record.str("status"), Some("OK"));
        assert!(Payload::Raw(String::new()).into_record().is_empty());

        let records = Payload::Json(json!([{"id": "a"}, {"id": "b"}])).into_records();
        assert_eq!(records.len(), 2);
        assert!(Payload::Json(json!({"message": "x"})).into_records().is_empty());
    }

    #[test]
    fn test_metadata_is_separate_from_data() {
        let response = NormalizedResponse::new(200, [("CB-AFTER", "9")], r#"{"status":"x","headers":"y"}"#);
        let payload = Payload::decode(&response.body);
        let api = ApiResponse::new(payload, response).into_record();

        assert_eq!(api.data.str("status"), Some("x"));
        assert_eq!(api.data.str("headers"), Some("y"));
        assert_eq!(api.meta.status(), 200);
        assert_eq!(api.meta.header("cb-after"), Some("9"));
        assert_eq!(api.meta.raw(), r#"{"status":"x","headers":"y"}"#);
    }
}
