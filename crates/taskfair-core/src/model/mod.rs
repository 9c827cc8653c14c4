//! Canonical domain types for the marketplace client.
//!
//! Wire records from `taskfair-api` are loose (optional everything,
//! string-encoded money and timestamps); these types are what screens
//! actually render. `convert` does the tolerant mapping.

mod booking;
mod dashboard;
mod money;
mod payment;
mod provider;
mod quote;

pub use booking::{Booking, BookingStatus};
pub use dashboard::{DashboardStats, Review};
pub use money::Money;
pub use payment::{BankAccount, Withdrawal, WithdrawalStatus};
pub use provider::{Category, Provider};
pub use quote::{Quote, QuoteRequest, QuoteStatus};
