use std::fmt;

use serde::{Deserialize, Serialize};

/// An amount of money in minor units (cents).
///
/// The wire format is a decimal string like `"45.00"`; fractions beyond
/// two digits are truncated. Currency is implicit (the marketplace
/// settles in one currency), so this is deliberately just a number with
/// display formatting.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money {
    cents: i64,
}

impl Money {
    pub const ZERO: Money = Money { cents: 0 };

    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub fn cents(self) -> i64 {
        self.cents
    }

    pub fn is_zero(self) -> bool {
        self.cents == 0
    }

    /// Parse a decimal string like `"45.00"`, `"1250.5"`, or `"$30"`.
    /// Returns `None` for anything that is not a plain decimal amount.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim().trim_start_matches('$');
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole_str, frac_str) = s.split_once('.').unwrap_or((s, ""));
        if whole_str.is_empty() && frac_str.is_empty() {
            return None;
        }
        if !whole_str.chars().all(|c| c.is_ascii_digit())
            || !frac_str.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let whole: i64 = if whole_str.is_empty() {
            0
        } else {
            whole_str.parse().ok()?
        };
        let frac_digits: String = frac_str.chars().take(2).collect();
        let frac: i64 = match frac_digits.len() {
            0 => 0,
            1 => frac_digits.parse::<i64>().ok()? * 10,
            _ => frac_digits.parse().ok()?,
        };

        let cents = whole.checked_mul(100)?.checked_add(frac)?;
        Some(Self {
            cents: if negative { -cents } else { cents },
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_decimal_places() {
        assert_eq!(Money::parse("45.00").unwrap().cents(), 4500);
        assert_eq!(Money::parse("0.99").unwrap().cents(), 99);
    }

    #[test]
    fn parses_short_and_missing_fractions() {
        assert_eq!(Money::parse("1250.5").unwrap().cents(), 125_050);
        assert_eq!(Money::parse("30").unwrap().cents(), 3000);
        assert_eq!(Money::parse("$30").unwrap().cents(), 3000);
        assert_eq!(Money::parse(".50").unwrap().cents(), 50);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Money::parse(""), None);
        assert_eq!(Money::parse("abc"), None);
        assert_eq!(Money::parse("12,50"), None);
        assert_eq!(Money::parse("."), None);
    }

    #[test]
    fn negative_amounts() {
        assert_eq!(Money::parse("-5.25").unwrap().cents(), -525);
        assert_eq!(Money::from_cents(-525).to_string(), "-$5.25");
    }

    #[test]
    fn display_pads_cents() {
        assert_eq!(Money::from_cents(4500).to_string(), "$45.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
    }
}
