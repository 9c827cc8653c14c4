//! Application core — event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use taskfair_api::ApiClient;
use taskfair_config::session::Session;
use taskfair_core::QueryCache;

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::{AppContext, Component};
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// Notifications linger for this many ticks (4 Hz → ~5 s).
const NOTIFICATION_TICKS: u8 = 20;

/// Top-level application state and event loop.
pub struct App {
    /// Current active screen.
    active_screen: ScreenId,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Whether the app should keep running.
    running: bool,
    /// Current toast plus remaining ticks before auto-dismiss.
    notification: Option<(Notification, u8)>,
    /// Who is signed in, for the status line.
    session: Option<Session>,
    /// Terminal size for responsive layout.
    terminal_size: (u16, u16),
    /// Query cache, disposed on shutdown.
    cache: QueryCache,
    /// Action sender — components dispatch through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver — main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    /// Create the app with every screen wired to the shared context.
    pub fn new(client: ApiClient, cache: QueryCache, session: Option<Session>) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let ctx = AppContext {
            client,
            cache: cache.clone(),
            action_tx: action_tx.clone(),
        };

        let mut screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();
        for screen in screens.values_mut() {
            screen.init(ctx.clone())?;
        }

        Ok(Self {
            active_screen: ScreenId::Browse,
            screens,
            running: true,
            notification: None,
            session,
            terminal_size: (0, 0),
            cache,
            action_tx,
            action_rx,
        })
    }

    /// Queue a notification to show once the loop starts (e.g. "no
    /// session found" from startup).
    pub fn notify_on_start(&mut self, notification: Notification) {
        self.notification = Some((notification, NOTIFICATION_TICKS));
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.terminal_size = tui.size().unwrap_or((80, 24));

        // Mount the initial screen.
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.on_focus();
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            // Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        self.cache.dispose();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Ctrl+C always quits, even inside a text field.
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        let capturing = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.captures_input());

        if !capturing {
            match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

                // Screen navigation via number keys
                (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='5')) => {
                    let n = c as u8 - b'0';
                    if let Some(screen) = ScreenId::from_number(n) {
                        return Ok(Some(Action::SwitchScreen(screen)));
                    }
                }

                // Tab / Shift+Tab for screen cycling
                (KeyModifiers::NONE, KeyCode::Tab) => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
                }
                (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
                }

                _ => {}
            }
        }

        // Delegate to the active screen component
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    fn switch_screen(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!(from = %self.active_screen, to = %target, "switching screen");
        if let Some(old) = self.screens.get_mut(&self.active_screen) {
            old.on_blur();
        }
        self.active_screen = target;
        if let Some(new) = self.screens.get_mut(&self.active_screen) {
            new.on_focus();
        }
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Resize(w, h) => self.terminal_size = (*w, *h),
            Action::SwitchScreen(target) => self.switch_screen(*target),
            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), NOTIFICATION_TICKS));
            }
            Action::DismissNotification => self.notification = None,
            Action::Tick => {
                if let Some((_, ticks)) = &mut self.notification {
                    *ticks = ticks.saturating_sub(1);
                    if *ticks == 0 {
                        self.notification = None;
                    }
                }
            }
            _ => {}
        }

        // Forward to screens; collect follow-up actions.
        let mut follow_ups = Vec::new();
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                follow_ups.push(follow_up);
            }
        }
        for follow_up in follow_ups {
            self.action_tx.send(follow_up)?;
        }

        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let [tabs, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.render_tab_bar(frame, tabs);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, body);
        }

        self.render_footer(frame, footer);
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let narrow = self.terminal_size.0 < 100;
        let mut spans = vec![Span::styled(" taskfair ", theme::title_style())];

        for screen in ScreenId::ALL {
            let label = if narrow {
                screen.label_short()
            } else {
                screen.label()
            };
            let text = format!(" {} {} ", screen.number(), label);
            spans.push(if screen == self.active_screen {
                Span::styled(text, theme::tab_active())
            } else {
                Span::styled(text, theme::tab_inactive())
            });
        }

        if let Some(session) = &self.session {
            let name = session
                .display_name
                .clone()
                .unwrap_or_else(|| session.account_id.clone());
            spans.push(Span::styled(format!("  {name}"), theme::muted()));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        if let Some((notification, _)) = &self.notification {
            let style = match notification.level {
                NotificationLevel::Success => theme::money_style(),
                NotificationLevel::Error => theme::error_style(),
                NotificationLevel::Warning => {
                    ratatui::style::Style::default().fg(theme::WARNING_AMBER)
                }
                NotificationLevel::Info => theme::muted(),
            };
            frame.render_widget(
                Paragraph::new(Line::styled(format!(" {}", notification.message), style)),
                area,
            );
            return;
        }

        let mut spans = Vec::new();
        if let Some(screen) = self.screens.get(&self.active_screen) {
            for (key, label) in screen.hints() {
                spans.push(Span::styled(format!(" {key}"), theme::key_hint_key()));
                spans.push(Span::styled(format!(" {label} "), theme::key_hint()));
            }
        }
        spans.push(Span::styled(" q", theme::key_hint_key()));
        spans.push(Span::styled(" quit ", theme::key_hint()));
        spans.push(Span::styled(" tab", theme::key_hint_key()));
        spans.push(Span::styled(" next screen", theme::key_hint()));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
