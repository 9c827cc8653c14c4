//! Payouts screen — bank accounts and withdrawal history, with forms
//! for registering an account and requesting a payout.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::ThrobberState;
use tui_input::Input;

use taskfair_api::endpoints::payments::{
    AddBankAccount, BankAccountRecord, RequestWithdrawal, WithdrawalRecord,
    list_bank_accounts_request, list_withdrawals_request,
};
use taskfair_core::convert::into_domain;
use taskfair_core::query::QuerySnapshot;
use taskfair_core::{BankAccount, FetchTask, Money, QueryKey, Withdrawal, WithdrawalStatus};

use crate::action::{Action, Notification};
use crate::component::{AppContext, Component};
use crate::data_bridge::{QueryBinding, bind_query};
use crate::theme;
use crate::widgets::list_status::{ListStatus, list_status, render_placeholder};
use crate::widgets::text_entry;

const ACCOUNTS_KEY: [&str; 1] = ["provider_accounts"];
const WITHDRAWALS_KEY: [&str; 1] = ["withdrawals"];

/// Add-account form fields in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccountField {
    BankName,
    AccountName,
    AccountNumber,
    RoutingNumber,
}

impl AccountField {
    fn next(self) -> Self {
        match self {
            Self::BankName => Self::AccountName,
            Self::AccountName => Self::AccountNumber,
            Self::AccountNumber => Self::RoutingNumber,
            Self::RoutingNumber => Self::BankName,
        }
    }
}

struct AccountForm {
    bank_name: Input,
    account_name: Input,
    account_number: Input,
    routing_number: Input,
    field: AccountField,
}

impl AccountForm {
    fn new() -> Self {
        Self {
            bank_name: Input::default(),
            account_name: Input::default(),
            account_number: Input::default(),
            routing_number: Input::default(),
            field: AccountField::BankName,
        }
    }

    fn active_input(&mut self) -> &mut Input {
        match self.field {
            AccountField::BankName => &mut self.bank_name,
            AccountField::AccountName => &mut self.account_name,
            AccountField::AccountNumber => &mut self.account_number,
            AccountField::RoutingNumber => &mut self.routing_number,
        }
    }

    fn build(&self) -> Result<AddBankAccount, String> {
        let fields = [
            ("bank name", self.bank_name.value().trim()),
            ("account name", self.account_name.value().trim()),
            ("account number", self.account_number.value().trim()),
            ("routing number", self.routing_number.value().trim()),
        ];
        for (label, value) in fields {
            if value.is_empty() {
                return Err(format!("{label} is required"));
            }
        }
        Ok(AddBankAccount {
            bank_name: fields[0].1.to_owned(),
            account_name: fields[1].1.to_owned(),
            account_number: fields[2].1.to_owned(),
            routing_number: fields[3].1.to_owned(),
        })
    }
}

struct WithdrawForm {
    bank_account_id: String,
    account_label: String,
    amount: Input,
}

impl WithdrawForm {
    fn build(&self) -> Result<RequestWithdrawal, String> {
        let amount = self.amount.value().trim();
        match Money::parse(amount) {
            Some(money) if money > Money::ZERO => Ok(RequestWithdrawal {
                amount: amount.to_owned(),
                bank_account_id: self.bank_account_id.clone(),
            }),
            _ => Err(format!("'{amount}' is not a valid amount")),
        }
    }
}

enum Mode {
    List,
    AddAccount(AccountForm),
    Withdraw(WithdrawForm),
    ConfirmDelete(String),
}

pub struct AccountsScreen {
    ctx: Option<AppContext>,
    focused: bool,
    accounts: QuerySnapshot<Vec<BankAccount>>,
    withdrawals: QuerySnapshot<Vec<Withdrawal>>,
    accounts_state: TableState,
    accounts_binding: Option<QueryBinding>,
    withdrawals_binding: Option<QueryBinding>,
    mode: Mode,
    mutating: Option<FetchTask<String>>,
    throbber: ThrobberState,
}

impl AccountsScreen {
    pub fn new() -> Self {
        Self {
            ctx: None,
            focused: false,
            accounts: QuerySnapshot::idle(),
            withdrawals: QuerySnapshot::idle(),
            accounts_state: TableState::default(),
            accounts_binding: None,
            withdrawals_binding: None,
            mode: Mode::List,
            mutating: None,
            throbber: ThrobberState::default(),
        }
    }

    fn subscribe(&mut self) {
        let Some(ctx) = self.ctx.clone() else { return };
        self.accounts_binding = Some(bind_query(
            &ctx,
            QueryKey::from(ACCOUNTS_KEY),
            list_bank_accounts_request(),
            |records: Vec<BankAccountRecord>| into_domain::<_, BankAccount>(records),
            Action::BankAccountsUpdated,
        ));
        self.withdrawals_binding = Some(bind_query(
            &ctx,
            QueryKey::from(WITHDRAWALS_KEY),
            list_withdrawals_request(),
            |records: Vec<WithdrawalRecord>| into_domain::<_, Withdrawal>(records),
            Action::WithdrawalsUpdated,
        ));
        self.accounts_state.select(Some(0));
    }

    fn refresh(&self) {
        if let Some(ctx) = &self.ctx {
            ctx.cache.invalidate(&QueryKey::from(ACCOUNTS_KEY));
            ctx.cache.invalidate(&QueryKey::from(WITHDRAWALS_KEY));
        }
    }

    fn selected_account(&self) -> Option<&BankAccount> {
        let accounts = self.accounts.data.as_deref()?;
        accounts.get(self.accounts_state.selected().unwrap_or(0))
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.accounts.data.as_deref().map_or(0, Vec::len);
        if len == 0 {
            return;
        }
        let current = self.accounts_state.selected().unwrap_or(0);
        let next = current
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
        self.accounts_state.select(Some(next));
    }

    fn start_mutation<F>(&mut self, fut: F)
    where
        F: std::future::Future<Output = Result<String, taskfair_api::Error>> + Send + 'static,
    {
        self.mutating = Some(FetchTask::spawn_with(fut));
        self.mode = Mode::List;
    }

    fn submit_account(&mut self) -> Option<Action> {
        let Mode::AddAccount(form) = &self.mode else {
            return None;
        };
        let payload = match form.build() {
            Ok(payload) => payload,
            Err(reason) => return Some(Action::Notify(Notification::warning(reason))),
        };
        let client = self.ctx.as_ref()?.client.clone();
        self.start_mutation(async move {
            let account = client.add_bank_account(&payload).await?;
            Ok(format!("Added {}", account.bank_name))
        });
        None
    }

    fn submit_withdrawal(&mut self) -> Option<Action> {
        let Mode::Withdraw(form) = &self.mode else {
            return None;
        };
        let payload = match form.build() {
            Ok(payload) => payload,
            Err(reason) => return Some(Action::Notify(Notification::warning(reason))),
        };
        let client = self.ctx.as_ref()?.client.clone();
        self.start_mutation(async move {
            let withdrawal = client.request_withdrawal(&payload).await?;
            let amount = withdrawal
                .amount
                .as_deref()
                .and_then(Money::parse)
                .unwrap_or(Money::ZERO);
            Ok(format!("Withdrawal of {amount} requested"))
        });
        None
    }

    fn confirm_delete(&mut self) {
        let Mode::ConfirmDelete(account_id) = &self.mode else {
            return;
        };
        let account_id = account_id.clone();
        let Some(ctx) = &self.ctx else { return };
        let client = ctx.client.clone();
        self.start_mutation(async move {
            let ack = client.delete_bank_account(&account_id).await?;
            Ok(ack.message.unwrap_or_else(|| "Account removed".to_owned()))
        });
    }

    fn poll_mutation(&mut self) -> Option<Action> {
        let task = self.mutating.as_ref()?;
        let state = task.state();
        if !state.is_settled() {
            return None;
        }
        self.mutating = None;
        self.refresh();

        match (state.data, state.error) {
            (Some(message), _) => Some(Action::Notify(Notification::success((*message).clone()))),
            (None, Some(error)) => Some(Action::Notify(Notification::error(error))),
            (None, None) => None,
        }
    }

    fn render_accounts(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Bank accounts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let status = list_status(&self.accounts);
        if status != ListStatus::Ready {
            render_placeholder(frame, inner, &status, &self.throbber, "press a to add one");
            return;
        }
        let Some(accounts) = self.accounts.data.as_deref() else {
            return;
        };

        let header = Row::new(vec!["Bank", "Account holder", "Number", ""])
            .style(theme::table_header());
        let rows: Vec<Row> = accounts
            .iter()
            .map(|a| {
                Row::new(vec![
                    Cell::from(a.bank_name.clone()),
                    Cell::from(a.account_name.clone()),
                    Cell::from(
                        a.last_four
                            .clone()
                            .map_or_else(|| "\u{2014}".into(), |d| format!("\u{00b7}\u{00b7}\u{00b7}\u{00b7}{d}")),
                    ),
                    Cell::from(if a.is_default { "default" } else { "" }),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Length(10),
                Constraint::Length(8),
            ],
        )
        .header(header)
        .row_highlight_style(theme::table_selected());

        let mut table_state = self.accounts_state.clone();
        frame.render_stateful_widget(table, inner, &mut table_state);
    }

    fn render_withdrawals(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Withdrawals ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let status = list_status(&self.withdrawals);
        if status != ListStatus::Ready {
            render_placeholder(frame, inner, &status, &self.throbber, "press w to request one");
            return;
        }
        let Some(withdrawals) = self.withdrawals.data.as_deref() else {
            return;
        };

        let header = Row::new(vec!["Amount", "Status", "Requested"]).style(theme::table_header());
        let rows: Vec<Row> = withdrawals
            .iter()
            .map(|w| {
                let status_style = match w.status {
                    WithdrawalStatus::Paid => theme::money_style(),
                    WithdrawalStatus::Rejected => theme::error_style(),
                    WithdrawalStatus::Pending | WithdrawalStatus::Processing => theme::table_row(),
                };
                Row::new(vec![
                    Cell::from(Span::styled(w.amount.to_string(), theme::money_style())),
                    Cell::from(Span::styled(w.status.to_string(), status_style)),
                    Cell::from(w.requested_at.map_or_else(
                        || "\u{2014}".into(),
                        |t| t.format("%b %d, %Y").to_string(),
                    )),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Fill(1),
            ],
        )
        .header(header);

        frame.render_widget(table, inner);
    }

    fn render_form_lines(&self, frame: &mut Frame, area: Rect) {
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
                    format!("{label:<16}"),
                    if active {
                        theme::title_style()
                    } else {
                        theme::key_hint()
                    },
                ),
                Span::styled(value, theme::table_row()),
            ])
        };

        let lines = match &self.mode {
            Mode::AddAccount(form) => vec![
                Line::styled("Add bank account", theme::title_style()),
                Line::default(),
                field_line("bank name", &form.bank_name, form.field == AccountField::BankName),
                field_line(
                    "account name",
                    &form.account_name,
                    form.field == AccountField::AccountName,
                ),
                field_line(
                    "account number",
                    &form.account_number,
                    form.field == AccountField::AccountNumber,
                ),
                field_line(
                    "routing number",
                    &form.routing_number,
                    form.field == AccountField::RoutingNumber,
                ),
                Line::default(),
                Line::styled("tab next field · enter submit · esc cancel", theme::muted()),
            ],
            Mode::Withdraw(form) => vec![
                Line::styled(
                    format!("Withdraw to {}", form.account_label),
                    theme::title_style(),
                ),
                Line::default(),
                field_line("amount", &form.amount, true),
                Line::default(),
                Line::styled("enter submit · esc cancel", theme::muted()),
            ],
            Mode::List | Mode::ConfirmDelete(_) => Vec::new(),
        };
        frame.render_widget(Paragraph::new(lines), area);
    }
}

impl Component for AccountsScreen {
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
        self.accounts_binding = None;
        self.withdrawals_binding = None;
        self.mode = Mode::List;
    }

    fn captures_input(&self) -> bool {
        !matches!(self.mode, Mode::List)
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if matches!(self.mode, Mode::AddAccount(_)) {
            match key.code {
                KeyCode::Esc => self.mode = Mode::List,
                KeyCode::Enter => return Ok(self.submit_account()),
                KeyCode::Tab => {
                    if let Mode::AddAccount(form) = &mut self.mode {
                        form.field = form.field.next();
                    }
                }
                _ => {
                    if let Mode::AddAccount(form) = &mut self.mode {
                        text_entry::apply_key(form.active_input(), key);
                    }
                }
            }
            return Ok(None);
        }

        if matches!(self.mode, Mode::Withdraw(_)) {
            match key.code {
                KeyCode::Esc => self.mode = Mode::List,
                KeyCode::Enter => return Ok(self.submit_withdrawal()),
                _ => {
                    if let Mode::Withdraw(form) = &mut self.mode {
                        text_entry::apply_key(&mut form.amount, key);
                    }
                }
            }
            return Ok(None);
        }

        if matches!(self.mode, Mode::ConfirmDelete(_)) {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Esc => self.mode = Mode::List,
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('a') => {
                if self.mutating.is_none() {
                    self.mode = Mode::AddAccount(AccountForm::new());
                }
            }
            KeyCode::Char('w') => {
                if self.mutating.is_none() {
                    if let Some(account) = self.selected_account() {
                        self.mode = Mode::Withdraw(WithdrawForm {
                            bank_account_id: account.id.clone(),
                            account_label: account.masked_label(),
                            amount: Input::default(),
                        });
                    } else {
                        return Ok(Some(Action::Notify(Notification::warning(
                            "Add a bank account first",
                        ))));
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(account) = self.selected_account() {
                    self.mode = Mode::ConfirmDelete(account.id.clone());
                }
            }
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => {
                self.throbber.calc_next();
                return Ok(self.poll_mutation());
            }
            Action::BankAccountsUpdated(snapshot) => {
                self.accounts = snapshot.clone();
                let len = self.accounts.data.as_deref().map_or(0, Vec::len);
                if self.accounts_state.selected().unwrap_or(0) >= len {
                    self.accounts_state.select(Some(len.saturating_sub(1)));
                }
            }
            Action::WithdrawalsUpdated(snapshot) => {
                self.withdrawals = snapshot.clone();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Payouts ")
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

        if matches!(self.mode, Mode::AddAccount(_) | Mode::Withdraw(_)) {
            self.render_form_lines(frame, inner);
            return;
        }

        let [accounts, withdrawals, prompt] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.render_accounts(frame, accounts);
        self.render_withdrawals(frame, withdrawals);

        if matches!(self.mode, Mode::ConfirmDelete(_)) {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("Remove this bank account? ", theme::error_style()),
                    Span::styled("y", theme::key_hint_key()),
                    Span::styled(" yes  ", theme::key_hint()),
                    Span::styled("n", theme::key_hint_key()),
                    Span::styled(" no", theme::key_hint()),
                ])),
                prompt,
            );
        } else if self.mutating.is_some() {
            frame.render_widget(
                Paragraph::new(Line::styled("Working\u{2026}", theme::muted())),
                prompt,
            );
        }
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("a", "add account"),
            ("w", "withdraw"),
            ("d", "delete"),
            ("r", "refresh"),
        ]
    }

    fn id(&self) -> &str {
        "accounts"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn account_form_requires_every_field() {
        let mut form = AccountForm::new();
        form.bank_name = Input::new("First Bank".into());
        form.account_name = Input::new("Ada L.".into());
        form.account_number = Input::new("12345678".into());

        let err = form.build().unwrap_err();
        assert!(err.contains("routing number"));

        form.routing_number = Input::new("021000021".into());
        let payload = form.build().unwrap();
        assert_eq!(payload.bank_name, "First Bank");
    }

    #[test]
    fn withdraw_form_rejects_zero_and_garbage() {
        let mut form = WithdrawForm {
            bank_account_id: "acct-1".into(),
            account_label: "First Bank \u{00b7}\u{00b7}\u{00b7}\u{00b7}1234".into(),
            amount: Input::new("0".into()),
        };
        assert!(form.build().is_err());

        form.amount = Input::new("abc".into());
        assert!(form.build().is_err());

        form.amount = Input::new("250.00".into());
        assert_eq!(form.build().unwrap().amount, "250.00");
    }
}
