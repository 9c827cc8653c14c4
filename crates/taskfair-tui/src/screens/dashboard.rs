//! Dashboard screen — provider summary tiles and recent reviews.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use throbber_widgets_tui::ThrobberState;

use taskfair_api::endpoints::dashboard::{
    DashboardRecord, ReviewRecord, dashboard_request, reviews_request,
};
use taskfair_core::convert::into_domain;
use taskfair_core::query::QuerySnapshot;
use taskfair_core::{DashboardStats, QueryKey, Review};

use crate::action::Action;
use crate::component::{AppContext, Component};
use crate::data_bridge::{QueryBinding, bind_query};
use crate::theme;
use crate::widgets::list_status::{ListStatus, list_status, render_placeholder};
use crate::widgets::stars;

const DASHBOARD_KEY: [&str; 1] = ["dashboard"];
const REVIEWS_KEY: [&str; 1] = ["reviews"];

pub struct DashboardScreen {
    ctx: Option<AppContext>,
    focused: bool,
    stats: QuerySnapshot<DashboardStats>,
    reviews: QuerySnapshot<Vec<Review>>,
    stats_binding: Option<QueryBinding>,
    reviews_binding: Option<QueryBinding>,
    throbber: ThrobberState,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            ctx: None,
            focused: false,
            stats: QuerySnapshot::idle(),
            reviews: QuerySnapshot::idle(),
            stats_binding: None,
            reviews_binding: None,
            throbber: ThrobberState::default(),
        }
    }

    fn subscribe(&mut self) {
        let Some(ctx) = self.ctx.clone() else { return };
        self.stats_binding = Some(bind_query::<DashboardRecord, _, _, _>(
            &ctx,
            QueryKey::from(DASHBOARD_KEY),
            dashboard_request(),
            DashboardStats::from,
            Action::DashboardUpdated,
        ));
        self.reviews_binding = Some(bind_query(
            &ctx,
            QueryKey::from(REVIEWS_KEY),
            reviews_request(),
            |records: Vec<ReviewRecord>| into_domain::<_, Review>(records),
            Action::ReviewsUpdated,
        ));
    }

    fn refresh(&self) {
        if let Some(ctx) = &self.ctx {
            ctx.cache.invalidate(&QueryKey::from(DASHBOARD_KEY));
            ctx.cache.invalidate(&QueryKey::from(REVIEWS_KEY));
        }
    }

    fn freshness_line(&self) -> Line<'static> {
        let text = match self.stats.last_fetched_at {
            Some(at) => {
                let secs = at.elapsed().as_secs();
                format!(
                    "updated {} ago",
                    humantime::format_duration(std::time::Duration::from_secs(secs))
                )
            }
            None => "never updated".to_owned(),
        };
        Line::styled(text, theme::muted()).right_aligned()
    }

    fn render_tile(frame: &mut Frame, area: Rect, title: &str, value: Span<'static>, sub: &str) {
        let block = Block::default()
            .title(format!(" {title} "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = vec![
            Line::from(value),
            Line::styled(sub.to_owned(), theme::muted()),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_tiles(&self, frame: &mut Frame, area: Rect) {
        let stats = self
            .stats
            .data
            .as_deref()
            .copied()
            .unwrap_or_default();

        let [earnings, payout, bookings, rating] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ])
        .areas(area);

        Self::render_tile(
            frame,
            earnings,
            "Earnings",
            Span::styled(stats.total_earnings.to_string(), theme::money_style()),
            "lifetime",
        );
        Self::render_tile(
            frame,
            payout,
            "Pending payout",
            Span::styled(stats.pending_payout.to_string(), theme::money_style()),
            "awaiting withdrawal",
        );
        Self::render_tile(
            frame,
            bookings,
            "Bookings",
            Span::styled(
                format!("{} done", stats.completed_bookings),
                theme::table_row(),
            ),
            &format!("{} upcoming", stats.upcoming_bookings),
        );
        Self::render_tile(
            frame,
            rating,
            "Rating",
            Span::styled(
                stars::stars_detail(stats.average_rating, stats.review_count),
                theme::rating_style(),
            ),
            "from customer reviews",
        );
    }

    fn render_reviews(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Recent reviews ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let status = list_status(&self.reviews);
        if status != ListStatus::Ready {
            render_placeholder(
                frame,
                inner,
                &status,
                &self.throbber,
                "reviews show up after completed bookings",
            );
            return;
        }
        let Some(reviews) = self.reviews.data.as_deref() else {
            return;
        };

        let mut lines = Vec::with_capacity(reviews.len() * 2);
        for review in reviews.iter().take(usize::from(inner.height) / 2) {
            lines.push(Line::from(vec![
                Span::styled(stars::stars(review.rating), theme::rating_style()),
                Span::raw("  "),
                Span::styled(review.customer_name.clone(), theme::table_row()),
                Span::styled(
                    review.created_at.map_or_else(String::new, |t| {
                        format!("  {}", t.format("%b %d, %Y"))
                    }),
                    theme::muted(),
                ),
            ]));
            if let Some(comment) = &review.comment {
                lines.push(Line::styled(format!("  {comment}"), theme::muted()));
            }
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for DashboardScreen {
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
        self.stats_binding = None;
        self.reviews_binding = None;
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Char('r') {
            self.refresh();
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.throbber.calc_next(),
            Action::DashboardUpdated(snapshot) => self.stats = snapshot.clone(),
            Action::ReviewsUpdated(snapshot) => self.reviews = snapshot.clone(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Dashboard ")
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

        let [freshness, tiles, reviews] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Fill(1),
        ])
        .areas(inner);

        frame.render_widget(Paragraph::new(self.freshness_line()), freshness);

        if self.stats.data.is_none() && self.stats.is_loading {
            render_placeholder(
                frame,
                tiles,
                &ListStatus::Loading,
                &self.throbber,
                "",
            );
        } else if let Some(message) = (self.stats.data.is_none() && self.stats.is_error)
            .then(|| self.stats.error.clone().unwrap_or_default())
        {
            render_placeholder(frame, tiles, &ListStatus::Error(message), &self.throbber, "");
        } else {
            self.render_tiles(frame, tiles);
        }

        self.render_reviews(frame, reviews);
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("r", "refresh")]
    }

    fn id(&self) -> &str {
        "dashboard"
    }
}
