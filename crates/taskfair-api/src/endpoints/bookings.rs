// Booking endpoints: list by scope, create, cancel.

use serde::{Deserialize, Serialize};

use crate::client::{Ack, ApiClient, ApiRequest};
use crate::error::Error;

/// Which slice of the booking history to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingScope {
    Upcoming,
    Past,
}

impl BookingScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Past => "past",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct BookingListPayload {
    scope: BookingScope,
}

/// A booking as the API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRecord {
    pub id: String,
    pub service_name: String,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub scheduled_for: Option<String>,
    /// Decimal string, e.g. `"120.00"`.
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Payload for `POST /booking/create`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateBooking {
    pub service_id: String,
    /// RFC 3339 timestamp for the requested slot.
    pub scheduled_for: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct CancelBookingPayload<'a> {
    booking_id: &'a str,
}

/// `POST /booking/list` with `{"scope": ...}`
pub fn list_bookings_request(scope: BookingScope) -> Result<ApiRequest, Error> {
    ApiRequest::post("booking/list", &BookingListPayload { scope })
}

impl ApiClient {
    /// List bookings for the given scope.
    pub async fn list_bookings(&self, scope: BookingScope) -> Result<Vec<BookingRecord>, Error> {
        self.execute(&list_bookings_request(scope)?).await
    }

    /// Create a booking.
    ///
    /// `POST /booking/create`
    pub async fn create_booking(&self, booking: &CreateBooking) -> Result<BookingRecord, Error> {
        self.execute(&ApiRequest::post("booking/create", booking)?)
            .await
    }

    /// Cancel a booking.
    ///
    /// `POST /booking/cancel` with `{"booking_id": "..."}`
    pub async fn cancel_booking(&self, booking_id: &str) -> Result<Ack, Error> {
        self.execute_ack(&ApiRequest::post(
            "booking/cancel",
            &CancelBookingPayload { booking_id },
        )?)
        .await
    }
}
