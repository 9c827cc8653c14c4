//! Browse screen — provider search with category filter, sort, and text
//! search. The filter/sort state lives here; the server owns ranking.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::ThrobberState;
use tui_input::Input;

use taskfair_api::endpoints::categories::{CategoryRecord, list_categories_request};
use taskfair_api::endpoints::providers::{ProviderSearch, ProviderSort, search_providers_request};
use taskfair_core::convert::into_domain;
use taskfair_core::query::QuerySnapshot;
use taskfair_core::{Category, Provider, QueryKey};

use crate::action::Action;
use crate::component::{AppContext, Component};
use crate::data_bridge::{QueryBinding, bind_query};
use crate::theme;
use crate::widgets::list_status::{ListStatus, list_status, render_placeholder};
use crate::widgets::{stars, sub_tabs, text_entry};

fn sort_slug(sort: ProviderSort) -> &'static str {
    match sort {
        ProviderSort::TopRated => "top_rated",
        ProviderSort::PriceLowHigh => "price_low_high",
        ProviderSort::PriceHighLow => "price_high_low",
        ProviderSort::Newest => "newest",
    }
}

fn sort_label(sort: ProviderSort) -> &'static str {
    match sort {
        ProviderSort::TopRated => "Top rated",
        ProviderSort::PriceLowHigh => "Price ↑",
        ProviderSort::PriceHighLow => "Price ↓",
        ProviderSort::Newest => "Newest",
    }
}

fn next_sort(sort: ProviderSort) -> ProviderSort {
    match sort {
        ProviderSort::TopRated => ProviderSort::PriceLowHigh,
        ProviderSort::PriceLowHigh => ProviderSort::PriceHighLow,
        ProviderSort::PriceHighLow => ProviderSort::Newest,
        ProviderSort::Newest => ProviderSort::TopRated,
    }
}

pub struct BrowseScreen {
    ctx: Option<AppContext>,
    focused: bool,
    categories: QuerySnapshot<Vec<Category>>,
    providers: QuerySnapshot<Vec<Provider>>,
    table_state: TableState,
    /// 0 = all categories, otherwise index+1 into the category list.
    category_idx: usize,
    sort: ProviderSort,
    search: Input,
    search_active: bool,
    categories_binding: Option<QueryBinding>,
    providers_binding: Option<QueryBinding>,
    throbber: ThrobberState,
}

impl BrowseScreen {
    pub fn new() -> Self {
        Self {
            ctx: None,
            focused: false,
            categories: QuerySnapshot::idle(),
            providers: QuerySnapshot::idle(),
            table_state: TableState::default(),
            category_idx: 0,
            sort: ProviderSort::TopRated,
            search: Input::default(),
            search_active: false,
            categories_binding: None,
            providers_binding: None,
            throbber: ThrobberState::default(),
        }
    }

    fn selected_category(&self) -> Option<&Category> {
        let categories = self.categories.data.as_deref()?;
        self.category_idx.checked_sub(1).and_then(|i| categories.get(i))
    }

    /// Assemble the search payload from the current filter state.
    fn search_params(&self) -> ProviderSearch {
        let query = self.search.value().trim();
        ProviderSearch {
            category_id: self.selected_category().map(|c| c.id.clone()),
            search: (!query.is_empty()).then(|| query.to_owned()),
            min_rating: None,
            sort_by: Some(self.sort),
            page: None,
        }
    }

    /// The cache key for the current filter state. Payload changes do
    /// not move cache entries on their own, so every axis of
    /// variability is encoded here.
    fn providers_key(&self) -> QueryKey {
        let category = self
            .selected_category()
            .map_or_else(|| "all".to_owned(), |c| c.id.clone());
        let query = self.search.value().trim().to_lowercase();
        QueryKey::new([
            "providers".to_owned(),
            category,
            sort_slug(self.sort).to_owned(),
            query,
        ])
    }

    fn subscribe_providers(&mut self) {
        let Some(ctx) = self.ctx.clone() else { return };
        let request = match search_providers_request(&self.search_params()) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "failed to build provider search");
                return;
            }
        };
        self.providers_binding = Some(bind_query(
            &ctx,
            self.providers_key(),
            request,
            |records: Vec<taskfair_api::endpoints::providers::ProviderRecord>| {
                into_domain::<_, Provider>(records)
            },
            Action::ProvidersUpdated,
        ));
        self.table_state.select(Some(0));
    }

    fn subscribe_categories(&mut self) {
        let Some(ctx) = self.ctx.clone() else { return };
        self.categories_binding = Some(bind_query(
            &ctx,
            QueryKey::from(["categories"]),
            list_categories_request(),
            |records: Vec<CategoryRecord>| into_domain::<_, Category>(records),
            Action::CategoriesUpdated,
        ));
    }

    fn refresh(&self) {
        if let Some(ctx) = &self.ctx {
            if let Some(binding) = &self.categories_binding {
                ctx.cache.invalidate(binding.key());
            }
            if let Some(binding) = &self.providers_binding {
                ctx.cache.invalidate(binding.key());
            }
        }
    }

    fn cycle_category(&mut self) {
        let count = self.categories.data.as_deref().map_or(0, Vec::len);
        self.category_idx = (self.category_idx + 1) % (count + 1);
        self.subscribe_providers();
    }

    fn cycle_sort(&mut self) {
        self.sort = next_sort(self.sort);
        self.subscribe_providers();
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.providers.data.as_deref().map_or(0, Vec::len);
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = current
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
        self.table_state.select(Some(next));
    }

    fn render_filter_line(&self, frame: &mut Frame, area: Rect) {
        let mut labels: Vec<&str> = vec!["All"];
        if let Some(categories) = self.categories.data.as_deref() {
            labels.extend(categories.iter().map(|c| c.name.as_str()));
        }
        let tabs = sub_tabs::render_sub_tabs(&labels, self.category_idx);
        frame.render_widget(Paragraph::new(tabs), area);
    }

    fn render_search_line(&self, frame: &mut Frame, area: Rect) {
        let line = if self.search_active {
            Line::from(vec![
                Span::styled("search: ", theme::key_hint()),
                Span::styled(format!("{}\u{2588}", self.search.value()), theme::title_style()),
            ])
        } else {
            Line::from(vec![
                Span::styled("sort ", theme::key_hint()),
                Span::styled(sort_label(self.sort), theme::tab_active()),
                Span::styled("    search ", theme::key_hint()),
                Span::styled(
                    if self.search.value().is_empty() {
                        "\u{2014}"
                    } else {
                        self.search.value()
                    },
                    theme::tab_inactive(),
                ),
            ])
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let Some(providers) = self.providers.data.as_deref() else {
            return;
        };

        let header = Row::new(vec!["Name", "Category", "Rating", "Rate", "City", ""])
            .style(theme::table_header());

        let rows: Vec<Row> = providers
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(p.name.clone()),
                    Cell::from(p.category.clone().unwrap_or_else(|| "\u{2014}".into())),
                    Cell::from(Span::styled(
                        stars::stars_detail(p.rating, p.review_count),
                        theme::rating_style(),
                    )),
                    Cell::from(Span::styled(
                        p.hourly_rate
                            .map_or_else(|| "quote".to_owned(), |m| format!("{m}/hr")),
                        theme::money_style(),
                    )),
                    Cell::from(p.city.clone().unwrap_or_else(|| "\u{2014}".into())),
                    Cell::from(if p.verified { "\u{2713}" } else { "" }),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Fill(2),
                Constraint::Fill(1),
                Constraint::Length(18),
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Length(2),
            ],
        )
        .header(header)
        .row_highlight_style(theme::table_selected());

        let mut table_state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut table_state);
    }
}

impl Component for BrowseScreen {
    fn init(&mut self, ctx: AppContext) -> Result<()> {
        self.ctx = Some(ctx);
        Ok(())
    }

    fn on_focus(&mut self) {
        self.focused = true;
        self.subscribe_categories();
        self.subscribe_providers();
    }

    fn on_blur(&mut self) {
        self.focused = false;
        self.categories_binding = None;
        self.providers_binding = None;
    }

    fn captures_input(&self) -> bool {
        self.search_active
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.search_active {
            match key.code {
                KeyCode::Esc => {
                    self.search_active = false;
                    self.search.reset();
                    self.subscribe_providers();
                }
                KeyCode::Enter => {
                    self.search_active = false;
                    self.subscribe_providers();
                }
                _ => {
                    text_entry::apply_key(&mut self.search, key);
                }
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('f') => self.cycle_category(),
            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('/') => self.search_active = true,
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.throbber.calc_next(),
            Action::CategoriesUpdated(snapshot) => {
                self.categories = snapshot.clone();
                let count = self.categories.data.as_deref().map_or(0, Vec::len);
                if self.category_idx > count {
                    self.category_idx = 0;
                }
            }
            Action::ProvidersUpdated(snapshot) => {
                self.providers = snapshot.clone();
                let len = self.providers.data.as_deref().map_or(0, Vec::len);
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
            .title(" Browse providers ")
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

        let [filters, search, body] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(inner);

        self.render_filter_line(frame, filters);
        self.render_search_line(frame, search);

        let status = list_status(&self.providers);
        if status == ListStatus::Ready {
            self.render_table(frame, body);
        } else {
            render_placeholder(frame, body, &status, &self.throbber, "try another filter");
        }
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("f", "category"),
            ("s", "sort"),
            ("/", "search"),
            ("r", "refresh"),
        ]
    }

    fn id(&self) -> &str {
        "browse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn screen_with_categories(names: &[(&str, &str)]) -> BrowseScreen {
        let mut screen = BrowseScreen::new();
        let categories: Vec<Category> = names
            .iter()
            .map(|(id, name)| Category {
                id: (*id).into(),
                name: (*name).into(),
                provider_count: 0,
            })
            .collect();
        screen.categories = QuerySnapshot {
            data: Some(std::sync::Arc::new(categories)),
            error: None,
            is_loading: false,
            is_fetching: false,
            is_error: false,
            last_fetched_at: None,
        };
        screen
    }

    #[test]
    fn param_assembly_defaults_to_unfiltered() {
        let screen = BrowseScreen::new();
        let params = screen.search_params();
        assert_eq!(params.category_id, None);
        assert_eq!(params.search, None);
        assert_eq!(params.sort_by, Some(ProviderSort::TopRated));
    }

    #[test]
    fn param_assembly_reflects_filter_state() {
        let mut screen = screen_with_categories(&[("cat-1", "Cleaning"), ("cat-2", "Plumbing")]);
        screen.category_idx = 2; // "Plumbing"
        screen.sort = ProviderSort::PriceLowHigh;
        screen.search = Input::new("drain  ".into());

        let params = screen.search_params();
        assert_eq!(params.category_id.as_deref(), Some("cat-2"));
        assert_eq!(params.search.as_deref(), Some("drain"));
        assert_eq!(params.sort_by, Some(ProviderSort::PriceLowHigh));
    }

    #[test]
    fn key_encodes_every_filter_axis() {
        let mut screen = screen_with_categories(&[("cat-1", "Cleaning")]);
        screen.category_idx = 1;
        screen.sort = ProviderSort::Newest;
        screen.search = Input::new("Deep Clean".into());

        assert_eq!(
            screen.providers_key().to_string(),
            "providers/cat-1/newest/deep clean"
        );
    }

    #[test]
    fn category_cycle_wraps_through_all() {
        let mut screen = screen_with_categories(&[("cat-1", "Cleaning")]);
        assert_eq!(screen.category_idx, 0);
        screen.category_idx = (screen.category_idx + 1) % 2;
        assert_eq!(screen.selected_category().map(|c| c.id.as_str()), Some("cat-1"));
        screen.category_idx = (screen.category_idx + 1) % 2;
        assert_eq!(screen.selected_category(), None);
    }
}
