/*
[INPUT]:  Product identifiers and optional query parameters
[OUTPUT]: Market data records (time, currencies, products, book, ticker, trades, candles, stats)
[POS]:    HTTP layer - public market data endpoints
[UPDATE]: When adding market endpoints or changing their record shapes
*/

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::http::blocking::BlockingRestClient;
use crate::http::request::{RequestDescriptor, take_product};
use crate::http::{Result, RestClient};
use crate::types::{ApiResponse, Params, Payload, Record};

const CANDLE_FIELDS: [&str; 5] = ["low", "high", "open", "close", "volume"];

pub(crate) fn server_time(params: Params) -> RequestDescriptor {
    RequestDescriptor::get("/time", params)
}

pub(crate) fn currencies(params: Params) -> RequestDescriptor {
    RequestDescriptor::get("/currencies", params)
}

pub(crate) fn products(params: Params) -> RequestDescriptor {
    RequestDescriptor::get("/products", params)
}

pub(crate) fn orderbook(default_product: &str, mut params: Params) -> RequestDescriptor {
    let product = take_product(&mut params, default_product);
    RequestDescriptor::get(format!("/products/{product}/book"), params)
}

pub(crate) fn last_trade(default_product: &str, mut params: Params) -> RequestDescriptor {
    let product = take_product(&mut params, default_product);
    RequestDescriptor::get(format!("/products/{product}/ticker"), params)
}

pub(crate) fn trade_history(default_product: &str, mut params: Params) -> RequestDescriptor {
    let product = take_product(&mut params, default_product);
    RequestDescriptor::get_paginated(format!("/products/{product}/trades"), params)
}

pub(crate) fn price_history(default_product: &str, mut params: Params) -> RequestDescriptor {
    let product = take_product(&mut params, default_product);
    RequestDescriptor::get(format!("/products/{product}/candles"), params)
}

pub(crate) fn daily_stats(default_product: &str, mut params: Params) -> RequestDescriptor {
    let product = take_product(&mut params, default_product);
    RequestDescriptor::get(format!("/products/{product}/stats"), params)
}

/// Turn `[time, low, high, open, close, volume]` rows into named records
///
/// Rows that are not arrays are skipped.
pub(crate) fn candles_to_records(payload: Payload) -> Vec<Record> {
    let Payload::Json(Value::Array(rows)) = payload else {
        return Vec::new();
    };

    rows.into_iter()
        .filter_map(|row| match row {
            Value::Array(row) => Some(candle_record(row)),
            _ => None,
        })
        .collect()
}

fn candle_record(row: Vec<Value>) -> Record {
    let mut values = row.into_iter();
    let mut record = Record::new();

    let start = values
        .next()
        .and_then(|time| time.as_i64())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|start| Value::String(start.to_rfc3339()))
        .unwrap_or(Value::Null);
    record.insert("start", start);

    for name in CANDLE_FIELDS {
        record.insert(name, values.next().unwrap_or(Value::Null));
    }
    record
}

/// Add the start of the trailing 24 hour window the stats cover
pub(crate) fn with_window_start(mut record: Record, now: DateTime<Utc>) -> Record {
    let start = now - Duration::hours(24);
    record.insert("start", start.to_rfc3339());
    record
}

impl RestClient {
    /// GET /time
    pub async fn server_time(&self) -> Result<ApiResponse<Record>> {
        self.fetch_record(server_time(Params::new())).await
    }

    /// GET /currencies
    pub async fn currencies(&self) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(currencies(Params::new())).await
    }

    /// GET /products
    pub async fn products(&self) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(products(Params::new())).await
    }

    /// GET /products/{product}/book
    pub async fn orderbook(&self, params: Params) -> Result<ApiResponse<Record>> {
        self.fetch_record(orderbook(self.default_product(), params)).await
    }

    /// GET /products/{product}/ticker
    pub async fn last_trade(&self, params: Params) -> Result<ApiResponse<Record>> {
        self.fetch_record(last_trade(self.default_product(), params)).await
    }

    /// GET /products/{product}/trades, all pages
    pub async fn trade_history(&self, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(trade_history(self.default_product(), params)).await
    }

    /// GET /products/{product}/candles
    pub async fn price_history(&self, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        let request = price_history(self.default_product(), params);
        Ok(self.execute(&request).await?.map(candles_to_records))
    }

    /// GET /products/{product}/stats
    pub async fn daily_stats(&self, params: Params) -> Result<ApiResponse<Record>> {
        let response = self.fetch_record(daily_stats(self.default_product(), params)).await?;
        Ok(response.map(|record| with_window_start(record, Utc::now())))
    }
}

impl BlockingRestClient {
    /// GET /time
    pub fn server_time(&self) -> Result<ApiResponse<Record>> {
        self.fetch_record(server_time(Params::new()))
    }

    /// GET /currencies
    pub fn currencies(&self) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(currencies(Params::new()))
    }

    /// GET /products
    pub fn products(&self) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(products(Params::new()))
    }

    /// GET /products/{product}/book
    pub fn orderbook(&self, params: Params) -> Result<ApiResponse<Record>> {
        self.fetch_record(orderbook(self.default_product(), params))
    }

    /// GET /products/{product}/ticker
    pub fn last_trade(&self, params: Params) -> Result<ApiResponse<Record>> {
        self.fetch_record(last_trade(self.default_product(), params))
    }

    /// GET /products/{product}/trades, all pages
    pub fn trade_history(&self, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(trade_history(self.default_product(), params))
    }

    /// GET /products/{product}/candles
    pub fn price_history(&self, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        let request = price_history(self.default_product(), params);
        Ok(self.execute(&request)?.map(candles_to_records))
    }

    /// GET /products/{product}/stats
    pub fn daily_stats(&self, params: Params) -> Result<ApiResponse<Record>> {
        let response = self.fetch_record(daily_stats(self.default_product(), params))?;
        Ok(response.map(|record| with_window_start(record, Utc::now())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_override_is_not_forwarded() {
        let request = orderbook("BTC-USD", Params::new().with("product_id", "ETH-EUR").with("level", 2));
        assert_eq!(request.target(), "/products/ETH-EUR/book?level=2");

        let request = last_trade("BTC-USD", Params::new());
        assert_eq!(request.target(), "/products/BTC-USD/ticker");
    }

    #[test]
    fn test_trade_history_is_paginated() {
        assert!(trade_history("BTC-USD", Params::new()).paginate);
        assert!(!price_history("BTC-USD", Params::new()).paginate);
    }

    #[test]
    fn test_candle_rows_become_records() {
        let payload = Payload::Json(json!([
            [1_415_398_768, 0.32, 4.2, 0.35, 4.2, 12.3],
            "garbage"
        ]));
        let records = candles_to_records(payload);

        assert_eq!(records.len(), 1);
        let candle = &records[0];
        assert_eq!(candle.str("start"), Some("2014-11-07T22:19:28+00:00"));
        assert_eq!(candle.get("low"), Some(&json!(0.32)));
        assert_eq!(candle.get("volume"), Some(&json!(12.3)));
        assert!(candles_to_records(Payload::Raw("nope".into())).is_empty());
    }

    #[test]
    fn test_stats_gain_window_start() {
        let now = DateTime::from_timestamp(1_700_086_400, 0).unwrap();
        let record = with_window_start(Record::from_value(json!({"open": "34.19"})), now);
        assert_eq!(record.str("start"), Some("2023-11-14T22:13:20+00:00"));
        assert_eq!(record.str("open"), Some("34.19"));
    }
}
