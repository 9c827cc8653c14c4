use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

use super::Money;

/// A registered payout bank account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccount {
    pub id: String,
    pub bank_name: String,
    pub account_name: String,
    /// Last four digits; the full number never reaches the client.
    pub last_four: Option<String>,
    pub is_default: bool,
}

impl BankAccount {
    /// Masked display form, e.g. `"First Bank ····1234"`.
    pub fn masked_label(&self) -> String {
        match &self.last_four {
            Some(digits) => format!("{} \u{00b7}\u{00b7}\u{00b7}\u{00b7}{digits}", self.bank_name),
            None => self.bank_name.clone(),
        }
    }
}

/// Lifecycle status of a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "title_case", ascii_case_insensitive)]
pub enum WithdrawalStatus {
    #[default]
    Pending,
    Processing,
    Paid,
    Rejected,
}

/// A payout request against the provider's balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Withdrawal {
    pub id: String,
    pub amount: Money,
    pub status: WithdrawalStatus,
    pub requested_at: Option<DateTime<Utc>>,
}
