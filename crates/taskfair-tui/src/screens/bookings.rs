//! Bookings screen — upcoming/past sub-tabs with cancellation.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::ThrobberState;

use taskfair_api::endpoints::bookings::{BookingRecord, BookingScope, list_bookings_request};
use taskfair_core::convert::into_domain;
use taskfair_core::query::QuerySnapshot;
use taskfair_core::{Booking, BookingStatus, FetchTask, QueryKey};

use crate::action::{Action, Notification};
use crate::component::{AppContext, Component};
use crate::data_bridge::{QueryBinding, bind_query};
use crate::theme;
use crate::widgets::list_status::{ListStatus, list_status, render_placeholder};
use crate::widgets::sub_tabs;

fn bookings_key(scope: BookingScope) -> QueryKey {
    QueryKey::from(["bookings", scope.as_str()])
}

pub struct BookingsScreen {
    ctx: Option<AppContext>,
    focused: bool,
    scope: BookingScope,
    bookings: QuerySnapshot<Vec<Booking>>,
    table_state: TableState,
    binding: Option<QueryBinding>,
    /// Booking id awaiting y/n confirmation.
    pending_cancel: Option<String>,
    /// In-flight cancellation, polled on Tick.
    cancelling: Option<FetchTask<String>>,
    throbber: ThrobberState,
}

impl BookingsScreen {
    pub fn new() -> Self {
        Self {
            ctx: None,
            focused: false,
            scope: BookingScope::Upcoming,
            bookings: QuerySnapshot::idle(),
            table_state: TableState::default(),
            binding: None,
            pending_cancel: None,
            cancelling: None,
            throbber: ThrobberState::default(),
        }
    }

    fn subscribe(&mut self) {
        let Some(ctx) = self.ctx.clone() else { return };
        let request = match list_bookings_request(self.scope) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "failed to build bookings request");
                return;
            }
        };
        let scope = self.scope;
        self.binding = Some(bind_query(
            &ctx,
            bookings_key(scope),
            request,
            |records: Vec<BookingRecord>| into_domain::<_, Booking>(records),
            move |snapshot| Action::BookingsUpdated(scope, snapshot),
        ));
        self.table_state.select(Some(0));
    }

    fn set_scope(&mut self, scope: BookingScope) {
        if self.scope != scope {
            self.scope = scope;
            self.bookings = QuerySnapshot::idle();
            self.subscribe();
        }
    }

    fn selected_booking(&self) -> Option<&Booking> {
        let bookings = self.bookings.data.as_deref()?;
        bookings.get(self.table_state.selected().unwrap_or(0))
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.bookings.data.as_deref().map_or(0, Vec::len);
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = current
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
        self.table_state.select(Some(next));
    }

    fn request_cancel(&mut self) {
        if self.cancelling.is_some() {
            return;
        }
        if let Some(booking) = self.selected_booking() {
            if booking.is_cancellable() {
                self.pending_cancel = Some(booking.id.clone());
            }
        }
    }

    fn confirm_cancel(&mut self) {
        let Some(booking_id) = self.pending_cancel.take() else {
            return;
        };
        let Some(ctx) = &self.ctx else { return };
        let client = ctx.client.clone();
        self.cancelling = Some(FetchTask::spawn_with(async move {
            let ack = client.cancel_booking(&booking_id).await?;
            Ok(ack
                .message
                .unwrap_or_else(|| "Booking cancelled".to_owned()))
        }));
    }

    /// Poll the in-flight cancellation; on settle, notify and refetch.
    fn poll_cancel(&mut self) -> Option<Action> {
        let task = self.cancelling.as_ref()?;
        let state = task.state();
        if !state.is_settled() {
            return None;
        }
        self.cancelling = None;

        if let Some(ctx) = &self.ctx {
            ctx.cache.invalidate(&bookings_key(self.scope));
        }
        match (state.data, state.error) {
            (Some(message), _) => Some(Action::Notify(Notification::success((*message).clone()))),
            (None, Some(error)) => Some(Action::Notify(Notification::error(error))),
            (None, None) => None,
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let Some(bookings) = self.bookings.data.as_deref() else {
            return;
        };

        let header = Row::new(vec!["Service", "With", "When", "Price", "Status"])
            .style(theme::table_header());

        let rows: Vec<Row> = bookings
            .iter()
            .map(|b| {
                let counterpart = b
                    .provider_name
                    .clone()
                    .or_else(|| b.customer_name.clone())
                    .unwrap_or_else(|| "\u{2014}".into());
                let when = b
                    .scheduled_for
                    .map_or_else(|| "\u{2014}".into(), |t| t.format("%b %d, %H:%M").to_string());
                let status_style = match b.status {
                    BookingStatus::Confirmed => theme::money_style(),
                    BookingStatus::Cancelled => theme::error_style(),
                    BookingStatus::Pending | BookingStatus::Completed => theme::table_row(),
                };
                Row::new(vec![
                    Cell::from(b.service_name.clone()),
                    Cell::from(counterpart),
                    Cell::from(when),
                    Cell::from(
                        b.price
                            .map_or_else(|| "\u{2014}".into(), |m| m.to_string()),
                    ),
                    Cell::from(Span::styled(b.status.to_string(), status_style)),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Fill(2),
                Constraint::Fill(1),
                Constraint::Length(14),
                Constraint::Length(10),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .row_highlight_style(theme::table_selected());

        let mut table_state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut table_state);
    }
}

impl Component for BookingsScreen {
    fn init(&mut self, ctx: AppContext) -> Result<()> {
        self.ctx = Some(ctx);
        Ok(())
    }

    fn on_focus(&mut self) {
        self.focused = true;
        self.subscribe();
    }

    fn on_blur(&mut self) {
        self.focused = false;
        self.binding = None;
        self.pending_cancel = None;
    }

    fn captures_input(&self) -> bool {
        self.pending_cancel.is_some()
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.pending_cancel.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.confirm_cancel(),
                KeyCode::Char('n') | KeyCode::Esc => self.pending_cancel = None,
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('u') | KeyCode::Left => self.set_scope(BookingScope::Upcoming),
            KeyCode::Char('p') | KeyCode::Right => self.set_scope(BookingScope::Past),
            KeyCode::Char('c') => self.request_cancel(),
            KeyCode::Char('r') => {
                if let Some(ctx) = &self.ctx {
                    ctx.cache.invalidate(&bookings_key(self.scope));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => {
                self.throbber.calc_next();
                return Ok(self.poll_cancel());
            }
            Action::BookingsUpdated(scope, snapshot) if *scope == self.scope => {
                self.bookings = snapshot.clone();
                let len = self.bookings.data.as_deref().map_or(0, Vec::len);
                if self.table_state.selected().unwrap_or(0) >= len {
                    self.table_state.select(Some(len.saturating_sub(1)));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Bookings ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [tabs, body, prompt] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let active = match self.scope {
            BookingScope::Upcoming => 0,
            BookingScope::Past => 1,
        };
        frame.render_widget(
            Paragraph::new(sub_tabs::render_sub_tabs(&["Upcoming", "Past"], active)),
            tabs,
        );

        let status = list_status(&self.bookings);
        if status == ListStatus::Ready {
            self.render_table(frame, body);
        } else {
            render_placeholder(frame, body, &status, &self.throbber, "no bookings in this view");
        }

        if self.pending_cancel.is_some() {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("Cancel this booking? ", theme::error_style()),
                    Span::styled("y", theme::key_hint_key()),
                    Span::styled(" yes  ", theme::key_hint()),
                    Span::styled("n", theme::key_hint_key()),
                    Span::styled(" no", theme::key_hint()),
                ])),
                prompt,
            );
        } else if self.cancelling.is_some() {
            frame.render_widget(
                Paragraph::new(Line::styled("Cancelling\u{2026}", theme::muted())),
                prompt,
            );
        }
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("u/p", "upcoming/past"),
            ("c", "cancel booking"),
            ("r", "refresh"),
        ]
    }

    fn id(&self) -> &str {
        "bookings"
    }
}
