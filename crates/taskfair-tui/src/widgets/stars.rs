//! Star-rating rendering.

/// A five-slot star string, e.g. `"★★★★☆"` for 4.
pub fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    let mut out = String::with_capacity(5 * '★'.len_utf8());
    for _ in 0..filled {
        out.push('★');
    }
    for _ in filled..5 {
        out.push('☆');
    }
    out
}

/// Star string plus numeric detail, e.g. `"★★★★☆ 4.6 (120)"`.
pub fn stars_detail(rating: f64, review_count: u32) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = rating.clamp(0.0, 5.0).round() as u8;
    if review_count == 0 {
        return format!("{} unrated", stars(0));
    }
    format!("{} {rating:.1} ({review_count})", stars(rounded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_fill_and_pad() {
        assert_eq!(stars(0), "☆☆☆☆☆");
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(5), "★★★★★");
        assert_eq!(stars(9), "★★★★★");
    }

    #[test]
    fn detail_handles_unrated() {
        assert_eq!(stars_detail(0.0, 0), "☆☆☆☆☆ unrated");
        assert_eq!(stars_detail(4.6, 120), "★★★★★ 4.6 (120)");
    }
}
