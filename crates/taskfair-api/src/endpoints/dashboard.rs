// Provider dashboard endpoints: summary stats and recent reviews.

use serde::Deserialize;

use crate::client::{ApiClient, ApiRequest};
use crate::error::Error;

/// Dashboard summary as the API returns it. Money fields are decimal
/// strings; counters may be absent for new providers.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardRecord {
    #[serde(default)]
    pub total_earnings: Option<String>,
    #[serde(default)]
    pub pending_payout: Option<String>,
    #[serde(default)]
    pub completed_bookings: Option<u32>,
    #[serde(default)]
    pub upcoming_bookings: Option<u32>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
}

/// A customer review of this provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRecord {
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `GET /provider/dashboard`
pub fn dashboard_request() -> ApiRequest {
    ApiRequest::get("provider/dashboard")
}

/// `GET /provider/reviews`
pub fn reviews_request() -> ApiRequest {
    ApiRequest::get("provider/reviews")
}

impl ApiClient {
    /// Fetch the provider dashboard summary.
    pub async fn get_dashboard(&self) -> Result<DashboardRecord, Error> {
        self.execute(&dashboard_request()).await
    }

    /// Fetch the provider's recent reviews.
    pub async fn list_reviews(&self) -> Result<Vec<ReviewRecord>, Error> {
        self.execute(&reviews_request()).await
    }
}
