//! Quotes screen — incoming quote requests and the respond form.
//!
//! Submitting with an attachment path reads the file and uploads it as
//! multipart; without one it is a plain JSON submission.

use std::path::Path;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::ThrobberState;
use tui_input::Input;

use taskfair_api::endpoints::quotes::{
    QuoteRequestRecord, SubmitQuote, list_quote_requests_request,
};
use taskfair_core::convert::into_domain;
use taskfair_core::query::QuerySnapshot;
use taskfair_core::{FetchTask, Money, QueryKey, QuoteRequest};

use crate::action::{Action, Notification};
use crate::component::{AppContext, Component};
use crate::data_bridge::{QueryBinding, bind_query};
use crate::theme;
use crate::widgets::list_status::{ListStatus, list_status, render_placeholder};
use crate::widgets::text_entry;

const QUOTES_KEY: [&str; 1] = ["quote_requests"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Price,
    Message,
    Attachment,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            Self::Price => Self::Message,
            Self::Message => Self::Attachment,
            Self::Attachment => Self::Price,
        }
    }
}

/// The respond form, shown over the list for one request.
struct QuoteForm {
    request_id: String,
    service_name: String,
    price: Input,
    message: Input,
    attachment: Input,
    field: FormField,
}

impl QuoteForm {
    fn new(request: &QuoteRequest) -> Self {
        Self {
            request_id: request.id.clone(),
            service_name: request.service_name.clone(),
            price: Input::default(),
            message: Input::default(),
            attachment: Input::default(),
            field: FormField::Price,
        }
    }

    fn active_input(&mut self) -> &mut Input {
        match self.field {
            FormField::Price => &mut self.price,
            FormField::Message => &mut self.message,
            FormField::Attachment => &mut self.attachment,
        }
    }

    /// Validate the form into a payload and optional attachment path.
    fn build(&self) -> Result<(SubmitQuote, Option<String>), String> {
        let price = self.price.value().trim();
        if Money::parse(price).is_none() {
            return Err(format!("'{price}' is not a valid amount"));
        }
        let message = self.message.value().trim();
        if message.is_empty() {
            return Err("a message is required".into());
        }
        let attachment = self.attachment.value().trim();
        Ok((
            SubmitQuote {
                request_id: self.request_id.clone(),
                price: price.to_owned(),
                message: message.to_owned(),
            },
            (!attachment.is_empty()).then(|| attachment.to_owned()),
        ))
    }
}

pub struct QuotesScreen {
    ctx: Option<AppContext>,
    focused: bool,
    requests: QuerySnapshot<Vec<QuoteRequest>>,
    table_state: TableState,
    binding: Option<QueryBinding>,
    form: Option<QuoteForm>,
    submitting: Option<FetchTask<String>>,
    throbber: ThrobberState,
}

impl QuotesScreen {
    pub fn new() -> Self {
        Self {
            ctx: None,
            focused: false,
            requests: QuerySnapshot::idle(),
            table_state: TableState::default(),
            binding: None,
            form: None,
            submitting: None,
            throbber: ThrobberState::default(),
        }
    }

    fn subscribe(&mut self) {
        let Some(ctx) = self.ctx.clone() else { return };
        self.binding = Some(bind_query(
            &ctx,
            QueryKey::from(QUOTES_KEY),
            list_quote_requests_request(),
            |records: Vec<QuoteRequestRecord>| into_domain::<_, QuoteRequest>(records),
            Action::QuoteRequestsUpdated,
        ));
        self.table_state.select(Some(0));
    }

    fn selected_request(&self) -> Option<&QuoteRequest> {
        let requests = self.requests.data.as_deref()?;
        requests.get(self.table_state.selected().unwrap_or(0))
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.requests.data.as_deref().map_or(0, Vec::len);
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = current
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
        self.table_state.select(Some(next));
    }

    fn submit(&mut self) -> Option<Action> {
        let form = self.form.as_ref()?;
        let (payload, attachment) = match form.build() {
            Ok(built) => built,
            Err(reason) => return Some(Action::Notify(Notification::warning(reason))),
        };
        let Some(ctx) = &self.ctx else { return None };
        let client = ctx.client.clone();

        self.submitting = Some(FetchTask::spawn_with(async move {
            match attachment {
                Some(path) => {
                    let file_name = Path::new(&path)
                        .file_name()
                        .map_or_else(|| "attachment".to_owned(), |n| n.to_string_lossy().into_owned());
                    let contents = tokio::fs::read(&path).await.map_err(|e| {
                        taskfair_api::Error::Api {
                            message: format!("cannot read attachment {path}: {e}"),
                            code: None,
                            status: 0,
                        }
                    })?;
                    client
                        .submit_quote_with_attachment(&payload, file_name, contents)
                        .await?;
                }
                None => {
                    client.submit_quote(&payload).await?;
                }
            }
            Ok("Quote submitted".to_owned())
        }));
        self.form = None;
        None
    }

    fn poll_submit(&mut self) -> Option<Action> {
        let task = self.submitting.as_ref()?;
        let state = task.state();
        if !state.is_settled() {
            return None;
        }
        self.submitting = None;

        if let Some(ctx) = &self.ctx {
            ctx.cache.invalidate(&QueryKey::from(QUOTES_KEY));
        }
        match (state.data, state.error) {
            (Some(message), _) => Some(Action::Notify(Notification::success((*message).clone()))),
            (None, Some(error)) => Some(Action::Notify(Notification::error(error))),
            (None, None) => None,
        }
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let Some(requests) = self.requests.data.as_deref() else {
            return;
        };

        let header =
            Row::new(vec!["Customer", "Service", "Budget", "Received"]).style(theme::table_header());

        let rows: Vec<Row> = requests
            .iter()
            .map(|r| {
                let received = r.created_at.map_or_else(
                    || "\u{2014}".into(),
                    |t| {
                        let age = chrono::Utc::now().signed_duration_since(t);
                        age.to_std().map_or_else(
                            |_| "just now".into(),
                            |d| format!("{} ago", humantime::format_duration(truncate_duration(d))),
                        )
                    },
                );
                Row::new(vec![
                    Cell::from(r.customer_name.clone()),
                    Cell::from(r.service_name.clone()),
                    Cell::from(Span::styled(
                        r.budget
                            .map_or_else(|| "open".to_owned(), |m| m.to_string()),
                        theme::money_style(),
                    )),
                    Cell::from(Span::styled(received, theme::muted())),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Fill(1),
                Constraint::Fill(2),
                Constraint::Length(10),
                Constraint::Length(16),
            ],
        )
        .header(header)
        .row_highlight_style(theme::table_selected());

        let mut table_state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let Some(request) = self.selected_request() else {
            return;
        };
        let mut lines = vec![Line::from(vec![
            Span::styled("Details: ", theme::key_hint()),
            Span::styled(
                request.details.clone().unwrap_or_else(|| "\u{2014}".into()),
                theme::table_row(),
            ),
        ])];
        if let Some(budget) = request.budget {
            lines.push(Line::from(vec![
                Span::styled("Budget: ", theme::key_hint()),
                Span::styled(budget.to_string(), theme::money_style()),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let Some(form) = &self.form else { return };

        let field_line = |label: &'static str, input: &Input, active: bool| {
            let value = if active {
                format!("{}\u{2588}", input.value())
            } else if input.value().is_empty() {
                "\u{2014}".to_owned()
            } else {
                input.value().to_owned()
            };
            Line::from(vec![
                Span::styled(
                    format!("{label:<12}"),
                    if active {
                        theme::title_style()
                    } else {
                        theme::key_hint()
                    },
                ),
                Span::styled(value, theme::table_row()),
            ])
        };

        let lines = vec![
            Line::styled(
                format!("Respond to \"{}\"", form.service_name),
                theme::title_style(),
            ),
            Line::default(),
            field_line("price", &form.price, form.field == FormField::Price),
            field_line("message", &form.message, form.field == FormField::Message),
            field_line(
                "attachment",
                &form.attachment,
                form.field == FormField::Attachment,
            ),
            Line::default(),
            Line::from(vec![
                Span::styled("tab", theme::key_hint_key()),
                Span::styled(" next field  ", theme::key_hint()),
                Span::styled("enter", theme::key_hint_key()),
                Span::styled(" submit  ", theme::key_hint()),
                Span::styled("esc", theme::key_hint_key()),
                Span::styled(" cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }
}

/// Trim sub-minute noise so "2h 3m 12s 450ms" reads as "2h 3m".
fn truncate_duration(d: std::time::Duration) -> std::time::Duration {
    let secs = d.as_secs();
    if secs >= 3600 {
        std::time::Duration::from_secs(secs / 3600 * 3600)
    } else if secs >= 60 {
        std::time::Duration::from_secs(secs / 60 * 60)
    } else {
        std::time::Duration::from_secs(secs)
    }
}

impl Component for QuotesScreen {
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
        self.form = None;
    }

    fn captures_input(&self) -> bool {
        self.form.is_some()
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.form.is_some() {
            match key.code {
                KeyCode::Esc => self.form = None,
                KeyCode::Tab => {
                    if let Some(form) = &mut self.form {
                        form.field = form.field.next();
                    }
                }
                KeyCode::Enter => return Ok(self.submit()),
                _ => {
                    if let Some(form) = &mut self.form {
                        text_entry::apply_key(form.active_input(), key);
                    }
                }
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Enter => {
                if self.submitting.is_none() {
                    self.form = self.selected_request().map(QuoteForm::new);
                }
            }
            KeyCode::Char('r') => {
                if let Some(ctx) = &self.ctx {
                    ctx.cache.invalidate(&QueryKey::from(QUOTES_KEY));
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
                return Ok(self.poll_submit());
            }
            Action::QuoteRequestsUpdated(snapshot) => {
                self.requests = snapshot.clone();
                let len = self.requests.data.as_deref().map_or(0, Vec::len);
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
            .title(" Quote requests ")
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

        if self.form.is_some() {
            self.render_form(frame, inner);
            return;
        }

        let [body, detail] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(inner);

        let status = list_status(&self.requests);
        if status == ListStatus::Ready {
            self.render_list(frame, body);
            self.render_detail(frame, detail);
        } else {
            render_placeholder(frame, body, &status, &self.throbber, "new requests land here");
        }

        if self.submitting.is_some() {
            frame.render_widget(
                Paragraph::new(Line::styled("Submitting quote\u{2026}", theme::muted())),
                detail,
            );
        }
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("enter", "respond"), ("r", "refresh")]
    }

    fn id(&self) -> &str {
        "quotes"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form_for(price: &str, message: &str, attachment: &str) -> QuoteForm {
        QuoteForm {
            request_id: "req-1".into(),
            service_name: "Deep clean".into(),
            price: Input::new(price.into()),
            message: Input::new(message.into()),
            attachment: Input::new(attachment.into()),
            field: FormField::Price,
        }
    }

    #[test]
    fn form_validates_price() {
        let err = form_for("not-money", "hello", "").build().unwrap_err();
        assert!(err.contains("not a valid amount"));
    }

    #[test]
    fn form_requires_message() {
        let err = form_for("120.00", "   ", "").build().unwrap_err();
        assert!(err.contains("message is required"));
    }

    #[test]
    fn form_builds_payload_and_attachment() {
        let (payload, attachment) = form_for("120.00", "Can start Monday", "/tmp/estimate.pdf")
            .build()
            .unwrap();
        assert_eq!(payload.request_id, "req-1");
        assert_eq!(payload.price, "120.00");
        assert_eq!(attachment.as_deref(), Some("/tmp/estimate.pdf"));
    }

    #[test]
    fn duration_truncation() {
        use std::time::Duration;
        assert_eq!(
            truncate_duration(Duration::from_secs(2 * 3600 + 125)),
            Duration::from_secs(2 * 3600)
        );
        assert_eq!(
            truncate_duration(Duration::from_secs(125)),
            Duration::from_secs(120)
        );
        assert_eq!(
            truncate_duration(Duration::from_secs(59)),
            Duration::from_secs(59)
        );
    }
}
