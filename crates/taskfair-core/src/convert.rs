// ── Wire → domain conversion ──
//
// The remote API is loose: money as decimal strings, timestamps as
// RFC 3339 strings, almost everything optional. Conversions are
// tolerant -- a malformed field degrades to its neutral value rather
// than failing the whole payload.

use chrono::{DateTime, Utc};

use taskfair_api::endpoints::{bookings, categories, dashboard, payments, providers, quotes};

use crate::model::{
    BankAccount, Booking, BookingStatus, Category, DashboardStats, Money, Provider, Quote,
    QuoteRequest, QuoteStatus, Review, Withdrawal, WithdrawalStatus,
};

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_money(raw: Option<&str>) -> Option<Money> {
    raw.and_then(Money::parse)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_stars(raw: Option<f64>) -> u8 {
    raw.unwrap_or(0.0).clamp(0.0, 5.0).round() as u8
}

/// Map a list of wire records into domain values.
pub fn into_domain<W, T: From<W>>(records: Vec<W>) -> Vec<T> {
    records.into_iter().map(T::from).collect()
}

impl From<categories::CategoryRecord> for Category {
    fn from(w: categories::CategoryRecord) -> Self {
        Self {
            id: w.id,
            name: w.name,
            provider_count: w.provider_count.unwrap_or(0),
        }
    }
}

impl From<providers::ProviderRecord> for Provider {
    fn from(w: providers::ProviderRecord) -> Self {
        Self {
            id: w.id,
            name: w.name,
            category: w.category,
            bio: w.bio,
            city: w.city,
            rating: w.rating.unwrap_or(0.0),
            review_count: w.review_count.unwrap_or(0),
            hourly_rate: parse_money(w.hourly_rate.as_deref()),
            verified: w.is_verified.unwrap_or(false),
        }
    }
}

impl From<bookings::BookingRecord> for Booking {
    fn from(w: bookings::BookingRecord) -> Self {
        Self {
            id: w.id,
            service_name: w.service_name,
            provider_name: w.provider_name,
            customer_name: w.customer_name,
            status: w
                .status
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            scheduled_for: parse_timestamp(w.scheduled_for.as_deref()),
            price: parse_money(w.price.as_deref()),
            address: w.address,
        }
    }
}

impl From<payments::BankAccountRecord> for BankAccount {
    fn from(w: payments::BankAccountRecord) -> Self {
        Self {
            id: w.id,
            bank_name: w.bank_name,
            account_name: w.account_name,
            last_four: w.last_four,
            is_default: w.is_default.unwrap_or(false),
        }
    }
}

impl From<payments::WithdrawalRecord> for Withdrawal {
    fn from(w: payments::WithdrawalRecord) -> Self {
        Self {
            id: w.id,
            amount: parse_money(w.amount.as_deref()).unwrap_or(Money::ZERO),
            status: w
                .status
                .as_deref()
                .and_then(|s| s.parse::<WithdrawalStatus>().ok())
                .unwrap_or_default(),
            requested_at: parse_timestamp(w.requested_at.as_deref()),
        }
    }
}

impl From<quotes::QuoteRequestRecord> for QuoteRequest {
    fn from(w: quotes::QuoteRequestRecord) -> Self {
        Self {
            id: w.id,
            customer_name: w.customer_name,
            service_name: w.service_name,
            details: w.details,
            budget: parse_money(w.budget.as_deref()),
            created_at: parse_timestamp(w.created_at.as_deref()),
        }
    }
}

impl From<quotes::QuoteRecord> for Quote {
    fn from(w: quotes::QuoteRecord) -> Self {
        Self {
            id: w.id,
            request_id: w.request_id,
            price: parse_money(w.price.as_deref()),
            message: w.message,
            status: w
                .status
                .as_deref()
                .and_then(|s| s.parse::<QuoteStatus>().ok())
                .unwrap_or_default(),
        }
    }
}

impl From<dashboard::DashboardRecord> for DashboardStats {
    fn from(w: dashboard::DashboardRecord) -> Self {
        Self {
            total_earnings: parse_money(w.total_earnings.as_deref()).unwrap_or(Money::ZERO),
            pending_payout: parse_money(w.pending_payout.as_deref()).unwrap_or(Money::ZERO),
            completed_bookings: w.completed_bookings.unwrap_or(0),
            upcoming_bookings: w.upcoming_bookings.unwrap_or(0),
            average_rating: w.average_rating.unwrap_or(0.0),
            review_count: w.review_count.unwrap_or(0),
        }
    }
}

impl From<dashboard::ReviewRecord> for Review {
    fn from(w: dashboard::ReviewRecord) -> Self {
        Self {
            id: w.id,
            customer_name: w.customer_name,
            rating: clamp_stars(w.rating),
            comment: w.comment,
            created_at: parse_timestamp(w.created_at.as_deref()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn booking_conversion_tolerates_loose_fields() {
        let wire = bookings::BookingRecord {
            id: "bk-1".into(),
            service_name: "Deep clean".into(),
            provider_name: Some("Ada".into()),
            customer_name: None,
            status: Some("confirmed".into()),
            scheduled_for: Some("2025-11-08T14:00:00Z".into()),
            price: Some("120.00".into()),
            address: None,
        };
        let booking = Booking::from(wire);

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.price.unwrap().cents(), 12_000);
        assert!(booking.scheduled_for.is_some());
        assert!(booking.is_cancellable());
    }

    #[test]
    fn unknown_status_degrades_to_default() {
        let wire = bookings::BookingRecord {
            id: "bk-2".into(),
            service_name: "Repair".into(),
            provider_name: None,
            customer_name: None,
            status: Some("definitely-not-a-status".into()),
            scheduled_for: Some("not a timestamp".into()),
            price: Some("n/a".into()),
            address: None,
        };
        let booking = Booking::from(wire);

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.scheduled_for, None);
        assert_eq!(booking.price, None);
    }

    #[test]
    fn review_rating_is_clamped() {
        let wire = dashboard::ReviewRecord {
            id: "rv-1".into(),
            customer_name: "Sam".into(),
            rating: Some(11.0),
            comment: None,
            created_at: None,
        };
        assert_eq!(Review::from(wire).rating, 5);
    }
}
