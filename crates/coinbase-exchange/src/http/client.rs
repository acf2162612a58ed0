/*
[INPUT]:  Credentials, client configuration, or a custom async transport
[OUTPUT]: Decoded API responses with their metadata
[POS]:    HTTP layer - async request pipeline (get/post/delete/pagination)
[UPDATE]: When adding connection options or changing pipeline behavior
*/

use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Credentials, RequestSigner};
use crate::http::Result;
use crate::http::pagination::{CURSOR_PARAM, PageStep, Pager};
use crate::http::request::RequestDescriptor;
use crate::http::transport::{AsyncTransport, HttpTransport};
use crate::types::{ApiResponse, NormalizedResponse, Params, Payload, Record};

/// Production REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.exchange.coinbase.com";
/// Public sandbox REST endpoint
pub const SANDBOX_API_URL: &str = "https://api-public.sandbox.exchange.coinbase.com";
/// Product used when a call does not name one
pub const DEFAULT_PRODUCT: &str = "BTC-USD";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub default_product: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            default_product: DEFAULT_PRODUCT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at the public sandbox
    pub fn sandbox() -> Self {
        Self {
            base_url: SANDBOX_API_URL.to_string(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_product(mut self, product: impl Into<String>) -> Self {
        self.default_product = product.into();
        self
    }
}

/// Async REST client
///
/// Futures run on the caller's tokio runtime; the client never starts one.
#[derive(Clone)]
pub struct RestClient {
    transport: Arc<dyn AsyncTransport>,
    default_product: String,
}

impl RestClient {
    /// Create a client against the production endpoint
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(RequestSigner::new(credentials), &config)?;
        Ok(Self::with_transport(Arc::new(transport), config.default_product))
    }

    /// Create a client over any transport strategy
    pub fn with_transport(
        transport: Arc<dyn AsyncTransport>,
        default_product: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            default_product: default_product.into(),
        }
    }

    pub fn default_product(&self) -> &str {
        &self.default_product
    }

    /// GET with parameters in the query string
    pub async fn get(&self, path: &str, params: Params) -> Result<ApiResponse<Payload>> {
        self.execute(&RequestDescriptor::get(path, params)).await
    }

    /// GET following `CB-AFTER` cursors until a short page
    pub async fn get_paginated(&self, path: &str, params: Params) -> Result<ApiResponse<Payload>> {
        self.execute(&RequestDescriptor::get_paginated(path, params)).await
    }

    /// POST with parameters as a JSON body
    pub async fn post(&self, path: &str, params: Params) -> Result<ApiResponse<Payload>> {
        self.execute(&RequestDescriptor::post(path, params)).await
    }

    /// DELETE with parameters, if any, in the query string
    pub async fn delete(&self, path: &str, params: Params) -> Result<ApiResponse<Payload>> {
        self.execute(&RequestDescriptor::delete(path, params)).await
    }

    pub async fn execute(&self, request: &RequestDescriptor) -> Result<ApiResponse<Payload>> {
        if request.paginate && request.method == Method::GET {
            return self.paginate(request).await;
        }

        let body = request.body()?;
        let response = self
            .transport
            .send(request.method.clone(), &request.target(), &body)
            .await?;
        Ok(decode(response))
    }

    async fn paginate(&self, request: &RequestDescriptor) -> Result<ApiResponse<Payload>> {
        let mut params = request.params.clone();
        let mut pager = Pager::start(&mut params);

        loop {
            let target = params.to_path_and_query(&request.path);
            let response = self.transport.send(Method::GET, &target, "").await?;
            let payload = Payload::decode(&response.body);
            match pager.absorb(payload, &response) {
                PageStep::Next(cursor) => params.set(CURSOR_PARAM, cursor),
                PageStep::Done => return Ok(pager.finish(response)),
            }
        }
    }

    pub(crate) async fn fetch_record(&self, request: RequestDescriptor) -> Result<ApiResponse<Record>> {
        Ok(self.execute(&request).await?.into_record())
    }

    pub(crate) async fn fetch_records(
        &self,
        request: RequestDescriptor,
    ) -> Result<ApiResponse<Vec<Record>>> {
        Ok(self.execute(&request).await?.into_records())
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("default_product", &self.default_product)
            .finish_non_exhaustive()
    }
}

pub(crate) fn decode(response: NormalizedResponse) -> ApiResponse<Payload> {
    let payload = Payload::decode(&response.body);
    ApiResponse::new(payload, response)
}
