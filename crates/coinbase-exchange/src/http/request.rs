/*
[INPUT]:  Method, path and parameters for one API call
[OUTPUT]: Signed-path targets and serialized bodies
[POS]:    HTTP layer - request descriptors shared by both clients
[UPDATE]: When verb serialization rules change
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::Result;
use crate::types::Params;

/// One API call before signing
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub params: Params,
    /// Aggregate `CB-AFTER` pages into one collection (GET only)
    pub paginate: bool,
}

impl RequestDescriptor {
    pub fn get(path: impl Into<String>, params: Params) -> Self {
        Self::new(Method::GET, path, params, false)
    }

    pub fn get_paginated(path: impl Into<String>, params: Params) -> Self {
        Self::new(Method::GET, path, params, true)
    }

    pub fn post(path: impl Into<String>, params: Params) -> Self {
        Self::new(Method::POST, path, params, false)
    }

    pub fn delete(path: impl Into<String>, params: Params) -> Self {
        Self::new(Method::DELETE, path, params, false)
    }

    fn new(method: Method, path: impl Into<String>, params: Params, paginate: bool) -> Self {
        Self {
            method,
            path: path.into(),
            params,
            paginate,
        }
    }

    /// Path as sent and signed: query string for GET/DELETE, bare path for POST
    pub fn target(&self) -> String {
        if self.method == Method::POST {
            self.path.clone()
        } else {
            self.params.to_path_and_query(&self.path)
        }
    }

    /// JSON body for POST, empty otherwise
    pub fn body(&self) -> Result<String> {
        if self.method == Method::POST {
            Ok(self.params.to_json()?)
        } else {
            Ok(String::new())
        }
    }
}

/// Pull `product_id` out of `params` for path-templated endpoints
///
/// The value is removed so it is not also sent in the query string.
pub(crate) fn take_product(params: &mut Params, default_product: &str) -> String {
    match params.remove("product_id") {
        Some(Value::String(product)) => product,
        Some(Value::Null) | None => default_product.to_string(),
        Some(other) => other.to_string(),
    }
}
