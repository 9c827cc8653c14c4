use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

use super::Money;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "title_case", ascii_case_insensitive)]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// A service booking, seen from either side of the marketplace.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub service_name: String,
    pub provider_name: Option<String>,
    pub customer_name: Option<String>,
    pub status: BookingStatus,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub price: Option<Money>,
    pub address: Option<String>,
}

impl Booking {
    /// Whether the customer may still cancel.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self.status,
            BookingStatus::Pending | BookingStatus::Confirmed
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_wire_strings() {
        assert_eq!(
            "confirmed".parse::<BookingStatus>().unwrap(),
            BookingStatus::Confirmed
        );
        assert_eq!(
            "Cancelled".parse::<BookingStatus>().unwrap(),
            BookingStatus::Cancelled
        );
    }

    #[test]
    fn status_displays_title_case() {
        assert_eq!(BookingStatus::Pending.to_string(), "Pending");
    }
}
