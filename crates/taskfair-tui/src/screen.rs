//! Screen identifier enum.

use std::fmt;

/// Identifies each primary TUI screen, navigable by number keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Browse, // 1
    Bookings,  // 2
    Quotes,    // 3
    Accounts,  // 4
    Dashboard, // 5
}

impl ScreenId {
    /// All screens in tab-bar order.
    pub const ALL: [ScreenId; 5] = [
        Self::Browse,
        Self::Bookings,
        Self::Quotes,
        Self::Accounts,
        Self::Dashboard,
    ];

    /// Numeric key (1-5) for this screen.
    pub fn number(self) -> u8 {
        match self {
            Self::Browse => 1,
            Self::Bookings => 2,
            Self::Quotes => 3,
            Self::Accounts => 4,
            Self::Dashboard => 5,
        }
    }

    /// Screen from a numeric key (1-5). Returns None for out-of-range.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Browse),
            2 => Some(Self::Bookings),
            3 => Some(Self::Quotes),
            4 => Some(Self::Accounts),
            5 => Some(Self::Dashboard),
            _ => None,
        }
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Short label for the tab bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Browse => "Browse",
            Self::Bookings => "Bookings",
            Self::Quotes => "Quotes",
            Self::Accounts => "Payouts",
            Self::Dashboard => "Dashboard",
        }
    }

    /// Compact label for narrow terminals (< 100 cols).
    pub fn label_short(self) -> &'static str {
        match self {
            Self::Browse => "Brws",
            Self::Bookings => "Book",
            Self::Quotes => "Quot",
            Self::Accounts => "Pay",
            Self::Dashboard => "Dash",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_order_wraps() {
        assert_eq!(ScreenId::Dashboard.next(), ScreenId::Browse);
        assert_eq!(ScreenId::Browse.prev(), ScreenId::Dashboard);
    }

    #[test]
    fn number_round_trip() {
        for screen in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(screen.number()), Some(screen));
        }
        assert_eq!(ScreenId::from_number(9), None);
    }
}
