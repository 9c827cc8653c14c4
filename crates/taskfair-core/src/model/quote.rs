use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

use super::Money;

/// A customer's request for a quote, awaiting this provider's response.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub id: String,
    pub customer_name: String,
    pub service_name: String,
    pub details: Option<String>,
    pub budget: Option<Money>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Status of a submitted quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "title_case", ascii_case_insensitive)]
pub enum QuoteStatus {
    #[default]
    Submitted,
    Accepted,
    Declined,
}

/// A quote the provider has submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub id: String,
    pub request_id: String,
    pub price: Option<Money>,
    pub message: Option<String>,
    pub status: QuoteStatus,
}
