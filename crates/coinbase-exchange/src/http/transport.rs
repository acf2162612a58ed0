/*
[INPUT]:  Method, signed path, body and the request signer
[OUTPUT]: Normalized responses or classified errors
[POS]:    HTTP layer - the two interchangeable transport strategies
[UPDATE]: When changing how requests are sent or how statuses are classified
*/

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::auth::{RequestSigner, SignedEnvelope};
use crate::http::client::ClientConfig;
use crate::http::{ExchangeError, Result};
use crate::types::NormalizedResponse;

/// Non-blocking transport, driven by the caller's tokio runtime
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    /// Perform one round trip. `path` includes the query string.
    async fn send(&self, method: Method, path: &str, body: &str) -> Result<NormalizedResponse>;
}

/// Blocking transport, one round trip on the calling thread
pub trait BlockingTransport: Send + Sync {
    /// Perform one round trip. `path` includes the query string.
    fn send(&self, method: Method, path: &str, body: &str) -> Result<NormalizedResponse>;
}

/// Async strategy backed by `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: String,
    signer: RequestSigner,
}

impl HttpTransport {
    pub fn new(signer: RequestSigner, config: &ClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|err| ExchangeError::Config(format!("build http client: {err}")))?;

        Ok(Self {
            http_client,
            base_url: base_url(&config.base_url)?,
            signer,
        })
    }
}

#[async_trait]
impl AsyncTransport for HttpTransport {
    async fn send(&self, method: Method, path: &str, body: &str) -> Result<NormalizedResponse> {
        let url = format!("{}{}", self.base_url, path);
        let envelope = self.signer.envelope(&method, path, body);

        let mut builder = self
            .http_client
            .request(method.clone(), &url)
            .headers(envelope_headers(&envelope)?);
        if has_body(&method) {
            builder = builder.body(body.to_string());
        }

        let transport_err = |source: reqwest::Error| ExchangeError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        };
        let response = builder.send().await.map_err(transport_err)?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await.map_err(transport_err)?;

        debug!(method = %method, path, status = status.as_u16(), "request completed");
        classify(status, &headers, text)
    }
}

/// Blocking strategy backed by `reqwest::blocking::Client`
///
/// Must not be constructed or dropped inside an async context.
#[derive(Debug, Clone)]
pub struct BlockingHttpTransport {
    http_client: reqwest::blocking::Client,
    base_url: String,
    signer: RequestSigner,
}

impl BlockingHttpTransport {
    pub fn new(signer: RequestSigner, config: &ClientConfig) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|err| ExchangeError::Config(format!("build http client: {err}")))?;

        Ok(Self {
            http_client,
            base_url: base_url(&config.base_url)?,
            signer,
        })
    }
}

impl BlockingTransport for BlockingHttpTransport {
    fn send(&self, method: Method, path: &str, body: &str) -> Result<NormalizedResponse> {
        let url = format!("{}{}", self.base_url, path);
        let envelope = self.signer.envelope(&method, path, body);

        let mut builder = self
            .http_client
            .request(method.clone(), &url)
            .headers(envelope_headers(&envelope)?);
        if has_body(&method) {
            builder = builder.body(body.to_string());
        }

        let transport_err = |source: reqwest::Error| ExchangeError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        };
        let response = builder.send().map_err(transport_err)?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().map_err(transport_err)?;

        debug!(method = %method, path, status = status.as_u16(), "request completed");
        classify(status, &headers, text)
    }
}

fn base_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw)?;
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn has_body(method: &Method) -> bool {
    *method == Method::POST
}

/// Build the CB-ACCESS-* header map from a signed envelope
pub(crate) fn envelope_headers(envelope: &SignedEnvelope) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(5);
    for (name, value) in envelope.headers() {
        let value = HeaderValue::from_str(value)
            .map_err(|err| ExchangeError::Config(format!("invalid {name} header value: {err}")))?;
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| ExchangeError::Config(format!("invalid header name {name}: {err}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Turn a raw response into a normalized one, or a classified error
pub(crate) fn classify(
    status: StatusCode,
    headers: &HeaderMap,
    body: String,
) -> Result<NormalizedResponse> {
    if !status.is_success() {
        return Err(ExchangeError::from_status(status, body));
    }

    let pairs = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)));
    Ok(NormalizedResponse::new(status.as_u16(), pairs, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;

    fn signer() -> RequestSigner {
        let creds = Credentials::new("key", "c2hhcmVkLXNlY3JldA==", "pass").unwrap();
        RequestSigner::with_clock(creds, || 1_700_000_000)
    }

    #[test]
    fn test_envelope_headers_map() {
        let envelope = signer().envelope(&Method::GET, "/time", "");
        let headers = envelope_headers(&envelope).unwrap();

        assert_eq!(headers.len(), 5);
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["cb-access-timestamp"], "1700000000");
        assert_eq!(headers["cb-access-passphrase"], "pass");
        assert_eq!(headers["cb-access-key"], "key");
        assert_eq!(headers["cb-access-sign"], envelope.signature.as_str());
    }

    #[test]
    fn test_classify_success_normalizes_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("cb-after", HeaderValue::from_static("42"));
        let response = classify(StatusCode::OK, &headers, "[]".to_string()).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.header("CB-AFTER"), Some("42"));
        assert_eq!(response.body, "[]");
    }

    #[test]
    fn test_classify_maps_errors_with_body() {
        let err = classify(StatusCode::TOO_MANY_REQUESTS, &HeaderMap::new(), "slow down".into())
            .unwrap_err();
        assert!(matches!(err, ExchangeError::RateLimit { ref body } if body == "slow down"));

        let err = classify(StatusCode::BAD_GATEWAY, &HeaderMap::new(), "gw".into()).unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        assert_eq!(base_url("https://api.exchange.coinbase.com/").unwrap(), "https://api.exchange.coinbase.com");
        assert!(base_url("not a url").is_err());
    }
}
