/*
[INPUT]:  Order sizes, prices, identifiers and optional parameters
[OUTPUT]: Order and fill records
[POS]:    HTTP layer - authenticated order endpoints
[UPDATE]: When adding order types or order endpoints
*/

use rust_decimal::Decimal;

use crate::http::blocking::BlockingRestClient;
use crate::http::request::RequestDescriptor;
use crate::http::{Result, RestClient};
use crate::types::{ApiResponse, Params, Record, Side};

/// POST /orders body: caller params first, then product, size, price, side
pub(crate) fn place_order(
    default_product: &str,
    side: Side,
    size: Decimal,
    price: Decimal,
    mut params: Params,
) -> RequestDescriptor {
    params.set_default("product_id", default_product);
    params.set("size", size.to_string());
    params.set("price", price.to_string());
    params.set("side", side.as_str());
    RequestDescriptor::post("/orders", params)
}

pub(crate) fn cancel(id: &str) -> RequestDescriptor {
    RequestDescriptor::delete(format!("/orders/{id}"), Params::new())
}

pub(crate) fn orders(mut params: Params) -> RequestDescriptor {
    params.set_default("status", "all");
    RequestDescriptor::get_paginated("/orders", params)
}

pub(crate) fn order(id: &str, params: Params) -> RequestDescriptor {
    RequestDescriptor::get(format!("/orders/{id}"), params)
}

pub(crate) fn fills(params: Params) -> RequestDescriptor {
    RequestDescriptor::get_paginated("/fills", params)
}

impl RestClient {
    /// POST /orders with `side=buy`
    pub async fn bid(&self, size: Decimal, price: Decimal, params: Params) -> Result<ApiResponse<Record>> {
        self.fetch_record(place_order(self.default_product(), Side::Buy, size, price, params))
            .await
    }

    /// Alias of [`RestClient::bid`]
    pub async fn buy(&self, size: Decimal, price: Decimal, params: Params) -> Result<ApiResponse<Record>> {
        self.bid(size, price, params).await
    }

    /// POST /orders with `side=sell`
    pub async fn ask(&self, size: Decimal, price: Decimal, params: Params) -> Result<ApiResponse<Record>> {
        self.fetch_record(place_order(self.default_product(), Side::Sell, size, price, params))
            .await
    }

    /// Alias of [`RestClient::ask`]
    pub async fn sell(&self, size: Decimal, price: Decimal, params: Params) -> Result<ApiResponse<Record>> {
        self.ask(size, price, params).await
    }

    /// DELETE /orders/{id}
    pub async fn cancel(&self, id: &str) -> Result<ApiResponse<Record>> {
        self.fetch_record(cancel(id)).await
    }

    /// GET /orders, all pages; `status=all` unless given
    pub async fn orders(&self, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(orders(params)).await
    }

    /// GET /orders/{id}
    pub async fn order(&self, id: &str) -> Result<ApiResponse<Record>> {
        self.fetch_record(order(id, Params::new())).await
    }

    /// GET /fills, all pages
    pub async fn fills(&self, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(fills(params)).await
    }
}

impl BlockingRestClient {
    /// POST /orders with `side=buy`
    pub fn bid(&self, size: Decimal, price: Decimal, params: Params) -> Result<ApiResponse<Record>> {
        self.fetch_record(place_order(self.default_product(), Side::Buy, size, price, params))
    }

    /// Alias of [`BlockingRestClient::bid`]
    pub fn buy(&self, size: Decimal, price: Decimal, params: Params) -> Result<ApiResponse<Record>> {
        self.bid(size, price, params)
    }

    /// POST /orders with `side=sell`
    pub fn ask(&self, size: Decimal, price: Decimal, params: Params) -> Result<ApiResponse<Record>> {
        self.fetch_record(place_order(self.default_product(), Side::Sell, size, price, params))
    }

    /// Alias of [`BlockingRestClient::ask`]
    pub fn sell(&self, size: Decimal, price: Decimal, params: Params) -> Result<ApiResponse<Record>> {
        self.ask(size, price, params)
    }

    /// DELETE /orders/{id}
    pub fn cancel(&self, id: &str) -> Result<ApiResponse<Record>> {
        self.fetch_record(cancel(id))
    }

    /// GET /orders, all pages; `status=all` unless given
    pub fn orders(&self, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(orders(params))
    }

    /// GET /orders/{id}
    pub fn order(&self, id: &str) -> Result<ApiResponse<Record>> {
        self.fetch_record(order(id, Params::new()))
    }

    /// GET /fills, all pages
    pub fn fills(&self, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(fills(params))
    }
}
