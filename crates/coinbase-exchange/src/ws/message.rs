/*
[INPUT]:  Raw feed frames and outbound subscription requests
[OUTPUT]: Decoded feed records, event types and subscribe frames
[POS]:    WebSocket layer - message parsing and building
[UPDATE]: When adding new event types or changing the subscribe format
*/

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::Record;

const RAW_LOG_MAX_BYTES: usize = 1024;

/// Feed event types with a dedicated handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedEventType {
    Received,
    Open,
    Match,
    Change,
    Done,
    Error,
}

impl FeedEventType {
    /// Map a message `type` field; unknown types give `None`
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "received" => Some(Self::Received),
            "open" => Some(Self::Open),
            "match" => Some(Self::Match),
            "change" => Some(Self::Change),
            "done" => Some(Self::Done),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Open => "open",
            Self::Match => "match",
            Self::Change => "change",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

/// Outbound subscription request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub product_id: String,
}

impl SubscribeRequest {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            kind: "subscribe".to_string(),
            product_id: product_id.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Decode one text frame; frames that are not JSON are logged and dropped
pub(crate) fn parse_message(text: &str) -> Option<Record> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => Some(Record::from_value(value)),
        Err(err) => {
            warn!(error = %err, bytes = text.len(), "ws message parse failed, skipping");
            debug!(message = %truncate_for_log(text, RAW_LOG_MAX_BYTES), "ws message dropped");
            None
        }
    }
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut cut = max_len;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &value[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types_round_trip_names() {
        for kind in ["received", "open", "match", "change", "done", "error"] {
            let parsed = FeedEventType::from_type(kind).unwrap();
            assert_eq!(parsed.as_str(), kind);
        }
        assert_eq!(FeedEventType::from_type("heartbeat"), None);
        assert_eq!(FeedEventType::from_type("MATCH"), None);
    }

    #[test]
    fn test_subscribe_frame() {
        let frame = SubscribeRequest::new("BTC-USD").to_json().unwrap();
        assert_eq!(frame, r#"{"type":"subscribe","product_id":"BTC-USD"}"#);
    }

    #[test]
    fn test_parse_message() {
        let record = parse_message(r#"{"type":"match","price":"400.23"}"#).unwrap();
        assert_eq!(record.str("type"), Some("match"));
        assert!(parse_message("not json").is_none());
        assert!(parse_message("[1,2]").unwrap().is_empty());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_for_log("abc", 10), "abc");
        assert_eq!(truncate_for_log("aé", 2), "a...");
    }
}
