// ── Query keys ──

use std::fmt;

/// Ordered sequence of strings identifying a logical query slot.
///
/// The key is the whole identity: request path or payload changes do
/// NOT move an entry to a new slot. Callers that vary a payload encode
/// the variation into the key (e.g. `["providers", "cat-2", "top_rated"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl<const N: usize> From<[&str; N]> for QueryKey {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl From<&[&str]> for QueryKey {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_ordered() {
        assert_ne!(
            QueryKey::from(["bookings", "upcoming"]),
            QueryKey::from(["upcoming", "bookings"])
        );
    }

    #[test]
    fn display_joins_segments() {
        let key = QueryKey::from(["providers", "cat-2"]);
        assert_eq!(key.to_string(), "providers/cat-2");
    }
}
