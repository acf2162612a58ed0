/*
[INPUT]:  Account identifiers, amounts, currencies and destinations
[OUTPUT]: Transfer and withdrawal records
[POS]:    HTTP layer - authenticated funds movement endpoints
[UPDATE]: When adding transfer or withdrawal methods
*/

use rust_decimal::Decimal;

use crate::http::blocking::BlockingRestClient;
use crate::http::request::RequestDescriptor;
use crate::http::{Result, RestClient};
use crate::types::{ApiResponse, Params, Record, TransferType};

pub(crate) fn transfer(kind: TransferType, account_id: &str, amount: Decimal, mut params: Params) -> RequestDescriptor {
    params.set("type", kind.as_str());
    params.set("coinbase_account_id", account_id);
    params.set("amount", amount.to_string());
    RequestDescriptor::post("/transfers", params)
}

/// POST /withdrawals/{kind} with the destination under `target_key`
fn withdrawal(kind: &str, amount: Decimal, currency: &str, target_key: &str, target: &str) -> RequestDescriptor {
    let params = Params::new()
        .with("amount", amount.to_string())
        .with("currency", currency)
        .with(target_key, target);
    RequestDescriptor::post(format!("/withdrawals/{kind}"), params)
}

pub(crate) fn payment_method_withdrawal(amount: Decimal, currency: &str, payment_method_id: &str) -> RequestDescriptor {
    withdrawal("payment-method", amount, currency, "payment_method_id", payment_method_id)
}

pub(crate) fn coinbase_withdrawal(amount: Decimal, currency: &str, coinbase_account_id: &str) -> RequestDescriptor {
    withdrawal("coinbase-account", amount, currency, "coinbase_account_id", coinbase_account_id)
}

pub(crate) fn crypto_withdrawal(amount: Decimal, currency: &str, crypto_address: &str) -> RequestDescriptor {
    withdrawal("crypto", amount, currency, "crypto_address", crypto_address)
}

impl RestClient {
    /// POST /transfers with `type=deposit`
    pub async fn deposit(&self, account_id: &str, amount: Decimal) -> Result<ApiResponse<Record>> {
        self.fetch_record(transfer(TransferType::Deposit, account_id, amount, Params::new()))
            .await
    }

    /// POST /transfers with `type=withdraw`
    pub async fn withdraw(&self, account_id: &str, amount: Decimal) -> Result<ApiResponse<Record>> {
        self.fetch_record(transfer(TransferType::Withdraw, account_id, amount, Params::new()))
            .await
    }

    /// POST /withdrawals/payment-method
    pub async fn payment_method_withdrawal(
        &self,
        amount: Decimal,
        currency: &str,
        payment_method_id: &str,
    ) -> Result<ApiResponse<Record>> {
        self.fetch_record(payment_method_withdrawal(amount, currency, payment_method_id))
            .await
    }

    /// POST /withdrawals/coinbase-account
    pub async fn coinbase_withdrawal(
        &self,
        amount: Decimal,
        currency: &str,
        coinbase_account_id: &str,
    ) -> Result<ApiResponse<Record>> {
        self.fetch_record(coinbase_withdrawal(amount, currency, coinbase_account_id))
            .await
    }

    /// POST /withdrawals/crypto
    pub async fn crypto_withdrawal(
        &self,
        amount: Decimal,
        currency: &str,
        crypto_address: &str,
    ) -> Result<ApiResponse<Record>> {
        self.fetch_record(crypto_withdrawal(amount, currency, crypto_address))
            .await
    }
}

impl BlockingRestClient {
    /// POST /transfers with `type=deposit`
    pub fn deposit(&self, account_id: &str, amount: Decimal) -> Result<ApiResponse<Record>> {
        self.fetch_record(transfer(TransferType::Deposit, account_id, amount, Params::new()))
    }

    /// POST /transfers with `type=withdraw`
    pub fn withdraw(&self, account_id: &str, amount: Decimal) -> Result<ApiResponse<Record>> {
        self.fetch_record(transfer(TransferType::Withdraw, account_id, amount, Params::new()))
    }

    /// POST /withdrawals/payment-method
    pub fn payment_method_withdrawal(
        &self,
        amount: Decimal,
        currency: &str,
        payment_method_id: &str,
    ) -> Result<ApiResponse<Record>> {
        self.fetch_record(payment_method_withdrawal(amount, currency, payment_method_id))
    }

    /// POST /withdrawals/coinbase-account
    pub fn coinbase_withdrawal(
        &self,
        amount: Decimal,
        currency: &str,
        coinbase_account_id: &str,
    ) -> Result<ApiResponse<Record>> {
        self.fetch_record(coinbase_withdrawal(amount, currency, coinbase_account_id))
    }

    /// POST /withdrawals/crypto
    pub fn crypto_withdrawal(
        &self,
        amount: Decimal,
        currency: &str,
        crypto_address: &str,
    ) -> Result<ApiResponse<Record>> {
        self.fetch_record(crypto_withdrawal(amount, currency, crypto_address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transfer_body() {
        let amount = Decimal::from_str("10.50").unwrap();
        let request = transfer(TransferType::Deposit, "acc-1", amount, Params::new());
        assert_eq!(request.target(), "/transfers");
        assert_eq!(
            request.body().unwrap(),
            r#"{"type":"deposit","coinbase_account_id":"acc-1","amount":"10.50"}"#
        );
    }

    #[test]
    fn test_withdrawal_routes() {
        let amount = Decimal::from(5);
        let request = crypto_withdrawal(amount, "BTC", "1BoatSLRHtKNngkdXEeobR76b53LETtpyT");
        assert_eq!(request.target(), "/withdrawals/crypto");
        assert_eq!(
            request.body().unwrap(),
            r#"{"amount":"5","currency":"BTC","crypto_address":"1BoatSLRHtKNngkdXEeobR76b53LETtpyT"}"#
        );
        assert_eq!(
            payment_method_withdrawal(amount, "USD", "pm-1").path,
            "/withdrawals/payment-method"
        );
        assert_eq!(
            coinbase_withdrawal(amount, "USD", "cb-1").path,
            "/withdrawals/coinbase-account"
        );
    }
}
