/*
[INPUT]:  Credentials, clock, request method/path/body
[OUTPUT]: HMAC-SHA256 signatures and the CB-ACCESS-* header envelope
[POS]:    Auth layer - cryptographic signing for request authentication
[UPDATE]: When changing signing algorithm or header format
*/

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;

use super::Credentials;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_TIMESTAMP: &str = "CB-ACCESS-TIMESTAMP";
pub const HEADER_PASSPHRASE: &str = "CB-ACCESS-PASSPHRASE";
pub const HEADER_KEY: &str = "CB-ACCESS-KEY";
pub const HEADER_SIGN: &str = "CB-ACCESS-SIGN";

/// Source of Unix timestamps (seconds) used when signing
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Compute the request signature
///
/// Signs `timestamp + method + path + body` with HMAC-SHA256 and returns the
/// base64 digest. `body` is empty for verbs without a payload.
pub fn sign(secret: &[u8], timestamp: &str, method: &str, path: &str, body: &str) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts keys of any length"),
    };
    mac.update(timestamp.as_bytes());
    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    mac.update(body.as_bytes());
    BASE64.encode(mac.finalize().into_bytes()).trim_end().to_string()
}

/// Request plus its computed authentication headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub method: Method,
    pub path: String,
    pub body: String,
    pub timestamp: String,
    pub signature: String,
    api_key: String,
    passphrase: String,
}

impl SignedEnvelope {
    /// Fixed header set in send order
    pub fn headers(&self) -> [(&'static str, &str); 5] {
        [
            (HEADER_CONTENT_TYPE, "application/json"),
            (HEADER_TIMESTAMP, &self.timestamp),
            (HEADER_PASSPHRASE, &self.passphrase),
            (HEADER_KEY, &self.api_key),
            (HEADER_SIGN, &self.signature),
        ]
    }
}

/// Signs requests with the held credentials
///
/// A new envelope is built for every send; envelopes are never reused.
#[derive(Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    clock: Clock,
}

impl RequestSigner {
    /// Create a signer using the system clock
    pub fn new(credentials: Credentials) -> Self {
        Self::with_clock(credentials, || chrono::Utc::now().timestamp())
    }

    /// Create a signer with a custom timestamp source
    pub fn with_clock(
        credentials: Credentials,
        clock: impl Fn() -> i64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            credentials,
            clock: Arc::new(clock),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Current timestamp as sent in `CB-ACCESS-TIMESTAMP`
    pub fn timestamp(&self) -> String {
        (self.clock)().to_string()
    }

    /// Sign one request immediately before it is sent
    pub fn envelope(&self, method: &Method, path: &str, body: &str) -> SignedEnvelope {
        let timestamp = self.timestamp();
        let signature = sign(
            self.credentials.secret(),
            &timestamp,
            method.as_str(),
            path,
            body,
        );

        SignedEnvelope {
            method: method.clone(),
            path: path.to_string(),
            body: body.to_string(),
            timestamp,
            signature,
            api_key: self.credentials.api_key().to_string(),
            passphrase: self.credentials.passphrase().to_string(),
        }
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_signer() -> RequestSigner {
        let creds = Credentials::new("key", "c2hhcmVkLXNlY3JldA==", "pass").unwrap();
        RequestSigner::with_clock(creds, || 1_700_000_000)
    }

    #[test]
    fn test_sign_known_vector_get() {
        let sig = sign(
            b"shared-secret",
            "1700000000",
            "GET",
            "/orders?status=all&limit=100",
            "",
        );
        assert_eq!(sig, "X85vw5q0utOBtP+KhdCnYp+BTbnJkgA+3EpwPXiMm9w=");
    }

    #[test]
    fn test_sign_known_vector_post() {
        let sig = sign(
            b"shared-secret",
            "1700000000",
            "POST",
            "/orders",
            r#"{"product_id":"BTC-USD","size":"10"}"#,
        );
        assert_eq!(sig, "U3Y57y78qWttKCqD/0YlQRcjtC0jbHlxlaHPRT5NQPQ=");
    }

    #[test]
    fn test_sign_is_deterministic() {
        let a = sign(b"k", "1", "DELETE", "/orders/abc", "");
        let b = sign(b"k", "1", "DELETE", "/orders/abc", "");
        assert_eq!(a, b);
        assert_ne!(a, sign(b"k", "2", "DELETE", "/orders/abc", ""));
    }

    #[test]
    fn test_envelope_headers() {
        let envelope = fixed_signer().envelope(&Method::GET, "/orders?status=all&limit=100", "");
        let headers = envelope.headers();

        assert_eq!(headers[0], ("Content-Type", "application/json"));
        assert_eq!(headers[1], ("CB-ACCESS-TIMESTAMP", "1700000000"));
        assert_eq!(headers[2], ("CB-ACCESS-PASSPHRASE", "pass"));
        assert_eq!(headers[3], ("CB-ACCESS-KEY", "key"));
        assert_eq!(
            headers[4],
            ("CB-ACCESS-SIGN", "X85vw5q0utOBtP+KhdCnYp+BTbnJkgA+3EpwPXiMm9w=")
        );
    }

    #[test]
    fn test_envelope_is_recomputed_per_call() {
        let creds = Credentials::new("key", "c2hhcmVkLXNlY3JldA==", "pass").unwrap();
        let ticks = std::sync::atomic::AtomicI64::new(100);
        let signer = RequestSigner::with_clock(creds, move || {
            ticks.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
        });

        let first = signer.envelope(&Method::GET, "/time", "");
        let second = signer.envelope(&Method::GET, "/time", "");
        assert_eq!(first.timestamp, "100");
        assert_eq!(second.timestamp, "101");
        assert_ne!(first.signature, second.signature);
    }
}
