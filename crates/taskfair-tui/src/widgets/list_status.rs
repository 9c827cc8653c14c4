//! The universal list rendering contract: loading / error / empty / rows.
//!
//! Every list screen resolves its query snapshot through
//! [`list_status`] and, unless the answer is [`ListStatus::Ready`],
//! renders the shared placeholder instead of rows.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use throbber_widgets_tui::{Throbber, ThrobberState};

use taskfair_core::query::QuerySnapshot;

use crate::theme;

/// How a list screen should render its body right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    /// In flight with nothing to show yet.
    Loading,
    /// Failed with nothing to show; message is user-facing.
    Error(String),
    /// Settled successfully with an empty collection.
    Empty,
    /// Rows available (possibly stale while a refetch runs).
    Ready,
}

/// Resolve the tri-state contract for a collection snapshot.
pub fn list_status<T>(snapshot: &QuerySnapshot<Vec<T>>) -> ListStatus {
    match &snapshot.data {
        Some(items) if !items.is_empty() => ListStatus::Ready,
        Some(_) if snapshot.is_fetching => ListStatus::Loading,
        Some(_) => ListStatus::Empty,
        None => match &snapshot.error {
            Some(message) => ListStatus::Error(message.clone()),
            None => ListStatus::Loading,
        },
    }
}

/// Render the placeholder for a non-Ready status, centered in `area`.
pub fn render_placeholder(
    frame: &mut Frame,
    area: Rect,
    status: &ListStatus,
    throbber: &ThrobberState,
    empty_hint: &str,
) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(area);

    match status {
        ListStatus::Loading => {
            let spinner = Throbber::default()
                .label("Loading\u{2026}")
                .style(theme::muted())
                .throbber_style(theme::title_style());
            // Clone so the shared animation state keeps advancing on ticks.
            let mut state = throbber.clone();
            frame.render_stateful_widget(spinner, middle, &mut state);
        }
        ListStatus::Error(message) => {
            let lines = vec![
                Line::styled(message.clone(), theme::error_style()),
                Line::styled("press r to retry", theme::muted()),
            ];
            frame.render_widget(Paragraph::new(lines).centered(), middle);
        }
        ListStatus::Empty => {
            let lines = vec![
                Line::styled("Nothing here yet", theme::muted()),
                Line::styled(empty_hint.to_owned(), theme::muted()),
            ];
            frame.render_widget(Paragraph::new(lines).centered(), middle);
        }
        ListStatus::Ready => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn snapshot(
        data: Option<Vec<u8>>,
        error: Option<&str>,
        is_fetching: bool,
    ) -> QuerySnapshot<Vec<u8>> {
        let data = data.map(Arc::new);
        QuerySnapshot {
            is_loading: is_fetching && data.is_none(),
            is_fetching,
            is_error: error.is_some(),
            error: error.map(String::from),
            last_fetched_at: None,
            data,
        }
    }

    #[test]
    fn loading_before_first_settle() {
        assert_eq!(list_status(&snapshot(None, None, true)), ListStatus::Loading);
    }

    #[test]
    fn error_with_no_data() {
        assert_eq!(
            list_status(&snapshot(None, Some("boom"), false)),
            ListStatus::Error("boom".into())
        );
    }

    #[test]
    fn empty_success() {
        assert_eq!(
            list_status(&snapshot(Some(vec![]), None, false)),
            ListStatus::Empty
        );
    }

    #[test]
    fn rows_win_even_during_revalidation() {
        assert_eq!(
            list_status(&snapshot(Some(vec![1]), None, true)),
            ListStatus::Ready
        );
    }

    #[test]
    fn stale_rows_survive_an_error() {
        assert_eq!(
            list_status(&snapshot(Some(vec![1]), Some("boom"), false)),
            ListStatus::Ready
        );
    }
}
