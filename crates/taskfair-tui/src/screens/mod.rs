//! Screen components, one per primary view.

mod accounts;
mod bookings;
mod browse;
mod dashboard;
mod quotes;

pub use accounts::AccountsScreen;
pub use bookings::BookingsScreen;
pub use browse::BrowseScreen;
pub use dashboard::DashboardScreen;
pub use quotes::QuotesScreen;

use crate::component::Component;
use crate::screen::ScreenId;

/// Instantiate every screen in tab-bar order.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Browse, Box::new(BrowseScreen::new()) as Box<dyn Component>),
        (ScreenId::Bookings, Box::new(BookingsScreen::new())),
        (ScreenId::Quotes, Box::new(QuotesScreen::new())),
        (ScreenId::Accounts, Box::new(AccountsScreen::new())),
        (ScreenId::Dashboard, Box::new(DashboardScreen::new())),
    ]
}
