/*
[INPUT]:  Credentials, client configuration, or a custom blocking transport
[OUTPUT]: Decoded API responses with their metadata
[POS]:    HTTP layer - blocking request pipeline, mirror of RestClient
[UPDATE]: When RestClient pipeline behavior changes
*/

use reqwest::Method;
use std::sync::Arc;

use crate::auth::{Credentials, RequestSigner};
use crate::http::Result;
use crate::http::client::{ClientConfig, decode};
use crate::http::pagination::{CURSOR_PARAM, PageStep, Pager};
use crate::http::request::RequestDescriptor;
use crate::http::transport::{BlockingHttpTransport, BlockingTransport};
use crate::types::{ApiResponse, Params, Payload, Record};

/// Blocking REST client
///
/// Every call is one or more round trips on the calling thread. Must not be
/// built or dropped from inside an async context.
#[derive(Clone)]
pub struct BlockingRestClient {
    transport: Arc<dyn BlockingTransport>,
    default_product: String,
}

impl BlockingRestClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let transport = BlockingHttpTransport::new(RequestSigner::new(credentials), &config)?;
        Ok(Self::with_transport(Arc::new(transport), config.default_product))
    }

    pub fn with_transport(
        transport: Arc<dyn BlockingTransport>,
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

    pub fn get(&self, path: &str, params: Params) -> Result<ApiResponse<Payload>> {
        self.execute(&RequestDescriptor::get(path, params))
    }

    pub fn get_paginated(&self, path: &str, params: Params) -> Result<ApiResponse<Payload>> {
        self.execute(&RequestDescriptor::get_paginated(path, params))
    }

    pub fn post(&self, path: &str, params: Params) -> Result<ApiResponse<Payload>> {
        self.execute(&RequestDescriptor::post(path, params))
    }

    pub fn delete(&self, path: &str, params: Params) -> Result<ApiResponse<Payload>> {
        self.execute(&RequestDescriptor::delete(path, params))
    }

    pub fn execute(&self, request: &RequestDescriptor) -> Result<ApiResponse<Payload>> {
        if request.paginate && request.method == Method::GET {
            return self.paginate(request);
        }

        let body = request.body()?;
        let response = self
            .transport
            .send(request.method.clone(), &request.target(), &body)?;
        Ok(decode(response))
    }

    fn paginate(&self, request: &RequestDescriptor) -> Result<ApiResponse<Payload>> {
        let mut params = request.params.clone();
        let mut pager = Pager::start(&mut params);

        loop {
            let target = params.to_path_and_query(&request.path);
            let response = self.transport.send(Method::GET, &target, "")?;
            let payload = Payload::decode(&response.body);
            match pager.absorb(payload, &response) {
                PageStep::Next(cursor) => params.set(CURSOR_PARAM, cursor),
                PageStep::Done => return Ok(pager.finish(response)),
            }
        }
    }

    pub(crate) fn fetch_record(&self, request: RequestDescriptor) -> Result<ApiResponse<Record>> {
        Ok(self.execute(&request)?.into_record())
    }

    pub(crate) fn fetch_records(&self, request: RequestDescriptor) -> Result<ApiResponse<Vec<Record>>> {
        Ok(self.execute(&request)?.into_records())
    }
}

impl std::fmt::Debug for BlockingRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingRestClient")
            .field("default_product", &self.default_product)
            .finish_non_exhaustive()
    }
}
