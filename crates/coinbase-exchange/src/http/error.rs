/*
[INPUT]:  Error sources (transport, HTTP status, serialization, config, WebSocket)
[OUTPUT]: Structured error types with status/body context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or changing the status mapping
*/

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Main error type for the Coinbase Exchange client
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Connectivity failure before any HTTP status was received
    #[error("{method} {url}: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Status 400
    #[error("bad request: {body}")]
    BadRequest { body: String },

    /// Status 401
    #[error("not authorized: {body}")]
    NotAuthorized { body: String },

    /// Status 403
    #[error("forbidden: {body}")]
    Forbidden { body: String },

    /// Status 404
    #[error("not found: {body}")]
    NotFound { body: String },

    /// Status 429
    #[error("rate limit exceeded: {body}")]
    RateLimit { body: String },

    /// Status 500
    #[error("internal server error: {body}")]
    InternalServer { body: String },

    /// Any other non-2xx status
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Streaming socket failure
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Feed sequence gap. Reserved; nothing raises it yet.
    #[error("WebSocket dropped packets: {0}")]
    DroppedPackets(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExchangeError {
    /// Classify a non-success HTTP status, attaching the raw body
    pub fn from_status(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        match status.as_u16() {
            400 => ExchangeError::BadRequest { body },
            401 => ExchangeError::NotAuthorized { body },
            403 => ExchangeError::Forbidden { body },
            404 => ExchangeError::NotFound { body },
            429 => ExchangeError::RateLimit { body },
            500 => ExchangeError::InternalServer { body },
            code => ExchangeError::Api { status: code, body },
        }
    }

    /// HTTP status behind the error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ExchangeError::BadRequest { .. } => Some(400),
            ExchangeError::NotAuthorized { .. } => Some(401),
            ExchangeError::Forbidden { .. } => Some(403),
            ExchangeError::NotFound { .. } => Some(404),
            ExchangeError::RateLimit { .. } => Some(429),
            ExchangeError::InternalServer { .. } => Some(500),
            ExchangeError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body attached to a status error
    pub fn body(&self) -> Option<&str> {
        match self {
            ExchangeError::BadRequest { body }
            | ExchangeError::NotAuthorized { body }
            | ExchangeError::Forbidden { body }
            | ExchangeError::NotFound { body }
            | ExchangeError::RateLimit { body }
            | ExchangeError::InternalServer { body }
            | ExchangeError::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Check if the error is retryable
    ///
    /// The client itself never retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExchangeError::Transport { .. }
            | ExchangeError::RateLimit { .. }
            | ExchangeError::InternalServer { .. }
            | ExchangeError::WebSocket(_) => true,
            ExchangeError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ExchangeError::NotAuthorized { .. } | ExchangeError::Forbidden { .. }
        )
    }
}

/// Result type alias for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;
