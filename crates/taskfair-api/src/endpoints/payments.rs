// Bank account and withdrawal endpoints (provider payouts).

use serde::{Deserialize, Serialize};

use crate::client::{Ack, ApiClient, ApiRequest};
use crate::error::Error;

/// A registered payout bank account.
#[derive(Debug, Clone, Deserialize)]
pub struct BankAccountRecord {
    pub id: String,
    pub bank_name: String,
    pub account_name: String,
    /// Last four digits only; the server never echoes the full number.
    #[serde(default)]
    pub last_four: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
}

/// Payload for `POST /provider/bank-accounts/add`.
#[derive(Debug, Clone, Serialize)]
pub struct AddBankAccount {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub routing_number: String,
}

#[derive(Debug, Clone, Serialize)]
struct DeleteBankAccountPayload<'a> {
    account_id: &'a str,
}

/// A withdrawal request as the API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalRecord {
    pub id: String,
    /// Decimal string, e.g. `"250.00"`.
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub requested_at: Option<String>,
}

/// Payload for `POST /provider/withdrawals/request`.
#[derive(Debug, Clone, Serialize)]
pub struct RequestWithdrawal {
    /// Decimal string, matching how the API represents money.
    pub amount: String,
    pub bank_account_id: String,
}

/// `GET /provider/bank-accounts`
pub fn list_bank_accounts_request() -> ApiRequest {
    ApiRequest::get("provider/bank-accounts")
}

/// `GET /provider/withdrawals`
pub fn list_withdrawals_request() -> ApiRequest {
    ApiRequest::get("provider/withdrawals")
}

impl ApiClient {
    /// List the provider's payout bank accounts.
    pub async fn list_bank_accounts(&self) -> Result<Vec<BankAccountRecord>, Error> {
        self.execute(&list_bank_accounts_request()).await
    }

    /// Register a new payout bank account.
    pub async fn add_bank_account(
        &self,
        account: &AddBankAccount,
    ) -> Result<BankAccountRecord, Error> {
        self.execute(&ApiRequest::post("provider/bank-accounts/add", account)?)
            .await
    }

    /// Remove a payout bank account.
    pub async fn delete_bank_account(&self, account_id: &str) -> Result<Ack, Error> {
        self.execute_ack(&ApiRequest::post(
            "provider/bank-accounts/delete",
            &DeleteBankAccountPayload { account_id },
        )?)
        .await
    }

    /// List the provider's withdrawal history.
    pub async fn list_withdrawals(&self) -> Result<Vec<WithdrawalRecord>, Error> {
        self.execute(&list_withdrawals_request()).await
    }

    /// Request a payout to a registered bank account.
    pub async fn request_withdrawal(
        &self,
        withdrawal: &RequestWithdrawal,
    ) -> Result<WithdrawalRecord, Error> {
        self.execute(&ApiRequest::post(
            "provider/withdrawals/request",
            withdrawal,
        )?)
        .await
    }
}
