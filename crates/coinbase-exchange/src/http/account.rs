/*
[INPUT]:  Account identifiers and optional query parameters
[OUTPUT]: Account records, ledger entries and holds
[POS]:    HTTP layer - authenticated account endpoints
[UPDATE]: When adding account endpoints
*/

use crate::http::blocking::BlockingRestClient;
use crate::http::request::RequestDescriptor;
use crate::http::{Result, RestClient};
use crate::types::{ApiResponse, Params, Record};

pub(crate) fn accounts(params: Params) -> RequestDescriptor {
    RequestDescriptor::get("/accounts", params)
}

pub(crate) fn account(id: &str, params: Params) -> RequestDescriptor {
    RequestDescriptor::get(format!("/accounts/{id}"), params)
}

pub(crate) fn account_history(id: &str, params: Params) -> RequestDescriptor {
    RequestDescriptor::get_paginated(format!("/accounts/{id}/ledger"), params)
}

pub(crate) fn account_holds(id: &str, params: Params) -> RequestDescriptor {
    RequestDescriptor::get_paginated(format!("/accounts/{id}/holds"), params)
}

impl RestClient {
    /// GET /accounts
    pub async fn accounts(&self) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(accounts(Params::new())).await
    }

    /// GET /accounts/{id}
    pub async fn account(&self, id: &str) -> Result<ApiResponse<Record>> {
        self.fetch_record(account(id, Params::new())).await
    }

    /// GET /accounts/{id}/ledger, all pages
    pub async fn account_history(&self, id: &str, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(account_history(id, params)).await
    }

    /// GET /accounts/{id}/holds, all pages
    pub async fn account_holds(&self, id: &str, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(account_holds(id, params)).await
    }
}

impl BlockingRestClient {
    /// GET /accounts
    pub fn accounts(&self) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(accounts(Params::new()))
    }

    /// GET /accounts/{id}
    pub fn account(&self, id: &str) -> Result<ApiResponse<Record>> {
        self.fetch_record(account(id, Params::new()))
    }

    /// GET /accounts/{id}/ledger, all pages
    pub fn account_history(&self, id: &str, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(account_history(id, params))
    }

    /// GET /accounts/{id}/holds, all pages
    pub fn account_holds(&self, id: &str, params: Params) -> Result<ApiResponse<Vec<Record>>> {
        self.fetch_records(account_holds(id, params))
    }
}
