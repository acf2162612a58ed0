/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for coinbase-exchange tests

#![allow(dead_code)]

use coinbase_exchange::http::{BlockingHttpTransport, HttpTransport};
use coinbase_exchange::{BlockingRestClient, ClientConfig, Credentials, RequestSigner, RestClient};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::MockServer;

/// Timestamp every test signer reports
pub const FIXED_TIMESTAMP: i64 = 1_700_000_000;

/// Base64 of `shared-secret`
pub const TEST_SECRET: &str = "c2hhcmVkLXNlY3JldA==";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn test_credentials() -> Credentials {
    Credentials::new("test-key", TEST_SECRET, "test-passphrase").unwrap()
}

/// Signer with a frozen clock so signatures are reproducible
pub fn fixed_signer() -> RequestSigner {
    RequestSigner::with_clock(test_credentials(), || FIXED_TIMESTAMP)
}

pub fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig::default().with_base_url(base_url)
}

/// Async client pointed at the mock server
pub fn async_client(base_url: &str) -> RestClient {
    let config = test_config(base_url);
    let transport = HttpTransport::new(fixed_signer(), &config).unwrap();
    RestClient::with_transport(Arc::new(transport), config.default_product)
}

/// Blocking client pointed at the mock server
///
/// Build, use and drop it inside `spawn_blocking`.
pub fn blocking_client(base_url: &str) -> BlockingRestClient {
    let config = test_config(base_url);
    let transport = BlockingHttpTransport::new(fixed_signer(), &config).unwrap();
    BlockingRestClient::with_transport(Arc::new(transport), config.default_product)
}

/// JSON array of `len` records with distinct ids starting at `first`
pub fn page(first: usize, len: usize) -> Value {
    Value::Array(
        (first..first + len)
            .map(|i| json!({ "trade_id": i, "price": format!("{i}.50") }))
            .collect(),
    )
}
