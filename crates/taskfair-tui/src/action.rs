//! All possible UI actions. Actions are the sole mechanism for state mutation.

use taskfair_api::endpoints::bookings::BookingScope;
use taskfair_core::query::QuerySnapshot;
use taskfair_core::{
    BankAccount, Booking, Category, DashboardStats, Provider, QuoteRequest, Review, Withdrawal,
};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification shown in the status line.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),

    // ── Data events (from query bindings) ─────────────────────────
    CategoriesUpdated(QuerySnapshot<Vec<Category>>),
    ProvidersUpdated(QuerySnapshot<Vec<Provider>>),
    BookingsUpdated(BookingScope, QuerySnapshot<Vec<Booking>>),
    QuoteRequestsUpdated(QuerySnapshot<Vec<QuoteRequest>>),
    BankAccountsUpdated(QuerySnapshot<Vec<BankAccount>>),
    WithdrawalsUpdated(QuerySnapshot<Vec<Withdrawal>>),
    DashboardUpdated(QuerySnapshot<DashboardStats>),
    ReviewsUpdated(QuerySnapshot<Vec<Review>>),

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
