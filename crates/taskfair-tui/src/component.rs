//! Component trait — the building block for every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use taskfair_api::ApiClient;
use taskfair_core::QueryCache;

use crate::action::Action;

/// Shared handles every screen needs: the API client for one-shot
/// mutations, the query cache for subscriptions, and the action sender
/// for dispatching into the app loop.
#[derive(Clone)]
pub struct AppContext {
    pub client: ApiClient,
    pub cache: QueryCache,
    pub action_tx: UnboundedSender<Action>,
}

/// Every screen implements Component.
///
/// Lifecycle: `init` → (`on_focus` → (`handle_key_event` | `update` |
/// `render`)* → `on_blur`)*. Screens subscribe to their queries in
/// `on_focus` and drop the subscriptions in `on_blur`, so switching
/// away from a screen releases its cache entries (and cancels any
/// in-flight fetch once the last subscriber is gone).
pub trait Component: Send {
    /// Called once when the component is created.
    fn init(&mut self, _ctx: AppContext) -> Result<()> {
        Ok(())
    }

    /// The screen becomes visible: subscribe to data.
    fn on_focus(&mut self) {}

    /// The screen is navigated away from: release subscriptions.
    fn on_blur(&mut self) {}

    /// Whether the screen is currently capturing raw key input (a text
    /// field or confirm prompt is open). While true, the app loop
    /// suspends global keybindings except Ctrl+C.
    fn captures_input(&self) -> bool {
        false
    }

    /// Handle a keyboard event. Return an Action to dispatch, or None.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Render into the provided frame area.
    fn render(&self, frame: &mut Frame, area: Rect);

    /// Key hints for the footer, as (key, label) pairs.
    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    /// Unique identifier for this component.
    #[allow(dead_code)]
    fn id(&self) -> &str;
}
