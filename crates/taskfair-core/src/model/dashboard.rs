use chrono::{DateTime, Utc};

use super::Money;

/// Provider dashboard summary figures.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardStats {
    pub total_earnings: Money,
    pub pending_payout: Money,
    pub completed_bookings: u32,
    pub upcoming_bookings: u32,
    pub average_rating: f64,
    pub review_count: u32,
}

/// A customer review of this provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: String,
    pub customer_name: String,
    /// Star rating clamped to 0-5.
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
