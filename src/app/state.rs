//! Application state

use std::time::Instant;

use anyhow::{Context, Result};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use tokio::sync::{broadcast, watch};

use super::menu::{Notice, PostMenu, SheetBody};
use crate::config::Config;
use crate::feed::{Feed, LoadRequest, PendingMutation};
use crate::gesture::{Viewport, VelocityTracker};
use crate::models::MutationKind;
use crate::seen::SeenTracker;
use crate::sheet::{SheetController, SheetHost, SheetProvider, SheetSnapshot};
use crate::signal::Signal;
use crate::tabs::TabEvent;
use crate::theme::Theme;

/// Logical pixels per terminal column
pub const CELL_WIDTH: f32 = 8.0;
/// Logical pixels per terminal row
pub const CELL_HEIGHT: f32 = 16.0;

/// Convert a terminal size into a logical viewport
pub fn viewport_for(cols: u16, rows: u16) -> Viewport {
    Viewport::new(f32::from(cols) * CELL_WIDTH, f32::from(rows) * CELL_HEIGHT)
}

/// Areas from the last frame, used to hit-test the mouse
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutCache {
    /// Whole terminal
    pub screen: Rect,
    /// Visible part of the sheet (empty when closed)
    pub sheet: Rect,
    /// Tab labels row inside a tabbed sheet
    pub tab_bar: Rect,
    /// Paged area inside a tabbed sheet
    pub pager: Rect,
}

/// Which controller a pointer gesture was handed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanAxis {
    /// Sheet drag
    Vertical,
    /// Tab swipe
    Horizontal,
}

/// A mouse press being tracked as a pan
#[derive(Debug, Clone)]
pub struct PointerGesture {
    /// Column where the press started
    pub start_col: u16,
    /// Row where the press started
    pub start_row: u16,
    /// Controller that claimed the pan, once decided
    pub claimed: Option<PanAxis>,
    /// Horizontal velocity samples
    pub velocity: VelocityTracker,
}

/// Application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Whether to quit
    pub should_quit: bool,
    /// Current theme
    pub theme: Theme,

    /// Loaded feed
    pub feed: Feed,
    /// Selected post index
    pub selected_post: usize,
    /// Dwell tracking for the selected post
    pub seen: SeenTracker,
    /// Posts reported as seen so far
    pub seen_count: usize,

    /// The sheet and its command queue
    pub sheet: SheetHost<SheetBody>,
    /// Where features find the sheet
    pub sheet_provider: SheetProvider<SheetBody>,
    sheet_rx: watch::Receiver<SheetSnapshot>,

    /// Header tint requested by whatever sits on top
    pub header_tint: Signal<Option<Color>>,
    tint_rx: broadcast::Receiver<Option<Color>>,
    /// Tint the header is currently drawn with
    pub header_color: Option<Color>,

    /// Areas from the last frame
    pub layout: LayoutCache,
    /// Mouse press in progress
    pub pointer: Option<PointerGesture>,

    /// Status message (bottom bar)
    pub status: String,

    /// Tick counter for animations
    tick: u64,
}

impl AppState {
    /// Create a new app state sized for `viewport`
    pub fn new(config: Config, viewport: Viewport) -> Result<Self> {
        let controller = SheetController::new(viewport, config.sheet.clone(), config.platform);
        let sheet_rx = controller.subscribe();
        let (sheet, handle) = SheetHost::new(controller);
        let sheet_provider = SheetProvider::new();
        sheet_provider.install(handle)?;

        let header_tint = Signal::new("header-tint");
        let tint_rx = header_tint.subscribe();

        Ok(Self {
            theme: config.theme,
            feed: Feed::new(&config.feed),
            seen: SeenTracker::new(config.feed.min_dwell()),
            config,
            should_quit: false,
            selected_post: 0,
            seen_count: 0,
            sheet,
            sheet_provider,
            sheet_rx,
            header_tint,
            tint_rx,
            header_color: None,
            layout: LayoutCache::default(),
            pointer: None,
            status: String::new(),
            tick: 0,
        })
    }

    /// Tick for animations
    ///
    /// Applies queued sheet commands, advances tweens and forwards tab and
    /// sheet changes to the header tint. Returns `true` while anything is
    /// still animating.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.tick = self.tick.wrapping_add(1);
        self.sheet.pump(now);

        let mut animating = self.sheet.controller_mut().tick(now);
        let colors = self.theme.colors();
        if let Some(SheetBody::PostMenu(menu)) = self.sheet.controller_mut().content_mut() {
            let pager_width = f32::from(self.layout.pager.width) * CELL_WIDTH;
            if pager_width > 0.0
                && (menu.tabs.page_width() - pager_width).abs() > f32::EPSILON
                && let Err(e) = menu.tabs.set_page_width(pager_width)
            {
                tracing::warn!("pager resize rejected: {e}");
            }
            animating |= menu.tabs.tick(now);
            while let Ok(event) = menu.events.try_recv() {
                if let TabEvent::Changed { to, .. } = event {
                    self.header_tint.publish(Some(colors.tab_tint(to)));
                }
            }
        }

        if self.sheet_rx.has_changed().unwrap_or(false) {
            let snapshot = *self.sheet_rx.borrow_and_update();
            if !snapshot.is_open {
                self.header_tint.publish(None);
            }
        }

        loop {
            match self.tint_rx.try_recv() {
                Ok(tint) => self.header_color = tint,
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => break,
            }
        }

        for record in self.seen.drain() {
            tracing::debug!(
                post = %record.post_id,
                dwell = ?record.dwell,
                seen_at = %record.seen_at,
                "post seen"
            );
            self.seen_count += 1;
        }
        animating
    }

    /// Get current tick
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Follow a terminal resize
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.sheet
            .controller_mut()
            .set_viewport(viewport_for(cols, rows));
    }

    /// Move selection down in the feed
    pub fn select_next_post(&mut self, now: Instant) {
        if !self.feed.is_empty() {
            self.selected_post = (self.selected_post + 1).min(self.feed.len() - 1);
        }
        self.refocus(now);
    }

    /// Move selection up in the feed
    pub fn select_prev_post(&mut self, now: Instant) {
        self.selected_post = self.selected_post.saturating_sub(1);
        self.refocus(now);
    }

    /// Tell the dwell tracker which post is focused
    pub fn refocus(&mut self, now: Instant) {
        let id = self.feed.get(self.selected_post).map(|p| p.id);
        self.seen.focus(id, now);
    }

    /// Next page to request, if the selection is near the end
    pub fn next_page_request(&mut self) -> Option<LoadRequest> {
        if self.feed.should_load_more(self.selected_post) {
            self.feed.begin_load_more()
        } else {
            None
        }
    }

    /// Cycle through themes
    pub fn next_theme(&mut self) {
        self.theme = self.theme.next();
        self.config.theme = self.theme;
        self.set_status(format!("Theme: {}", self.theme));
    }

    /// Post the sheet actions apply to: the menu's post, else the selection
    pub fn target_post(&self) -> Option<uuid::Uuid> {
        match self.sheet.controller().content() {
            Some(SheetBody::PostMenu(menu)) if self.sheet.controller().is_open() => {
                Some(menu.post_id)
            }
            _ => self.feed.get(self.selected_post).map(|p| p.id),
        }
    }

    /// Flip an engagement on the target post
    pub fn toggle_engagement(&mut self, kind: MutationKind) -> Option<PendingMutation> {
        let id = self.target_post()?;
        let mutation = self.feed.toggle(id, kind)?;
        self.set_status(format!(
            "{}{}...",
            if mutation.activates() { "" } else { "un" },
            kind.name()
        ));
        Some(mutation)
    }

    /// Open the post menu for the selected post
    pub fn open_post_menu(&mut self) -> Result<()> {
        let post = self
            .feed
            .get(self.selected_post)
            .context("No post selected")?;
        let page_width = self.estimated_page_width();
        let menu = PostMenu::new(
            post,
            page_width,
            self.config.tabs.clone(),
            self.config.platform,
        )?;

        let sheet = self.sheet_provider.get()?;
        sheet.set_style(None)?;
        sheet.set_background_style(None)?;
        sheet.set_interactive_scroll(false)?;
        sheet.set_content(move || SheetBody::PostMenu(menu))?;
        sheet.open()?;
        Ok(())
    }

    /// Show a message in the sheet, styled as an error
    pub fn show_notice(&mut self, title: &str, body: &str) -> Result<()> {
        let colors = self.theme.colors();
        let notice = Notice {
            title: title.to_string(),
            body: body.to_string(),
        };
        let sheet = self.sheet_provider.get()?;
        sheet.set_content(move || SheetBody::Notice(notice))?;
        sheet.set_style(Some(Style::default().bg(colors.bg).fg(colors.error)))?;
        sheet.set_background_style(Some(Style::default().fg(colors.error)))?;
        sheet.set_interactive_scroll(true)?;
        sheet.open()?;
        Ok(())
    }

    /// Close the sheet
    pub fn close_sheet(&self) -> Result<()> {
        self.sheet_provider.get()?.close()?;
        Ok(())
    }

    /// Tap a tab in the open post menu
    pub fn activate_menu_tab(&mut self, index: usize, now: Instant) -> Result<()> {
        if let Some(SheetBody::PostMenu(menu)) = self.sheet.controller_mut().content_mut() {
            menu.tabs.activate_tab(index, now)?;
        }
        Ok(())
    }

    /// Step the open post menu one tab left or right
    pub fn step_menu_tab(&mut self, forward: bool, now: Instant) -> Result<()> {
        let Some(SheetBody::PostMenu(menu)) = self.sheet.controller().content() else {
            return Ok(());
        };
        let from = menu.tabs.target_index();
        let target = if forward {
            (from + 1).min(menu.tabs.len() - 1)
        } else {
            from.saturating_sub(1)
        };
        self.activate_menu_tab(target, now)
    }

    fn estimated_page_width(&self) -> f32 {
        let cols = if self.layout.pager.width > 0 {
            self.layout.pager.width
        } else {
            self.layout.screen.width.saturating_sub(2).max(1)
        };
        f32::from(cols) * CELL_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoSource;
    use crate::sheet::SheetPhase;
    use std::time::Duration;

    fn state() -> AppState {
        let mut state = AppState::new(Config::default(), viewport_for(80, 24)).unwrap();
        let request = state.feed.begin_refresh();
        let page = DemoSource::new(30).fetch(&request).unwrap();
        state.feed.apply(&request, page);
        state.layout.screen = Rect::new(0, 0, 80, 24);
        state
    }

    #[test]
    fn test_post_menu_opens_through_provider() {
        let t0 = Instant::now();
        let mut state = state();
        state.open_post_menu().unwrap();
        assert!(!state.sheet.controller().is_open());

        state.tick(t0);
        assert!(state.sheet.controller().is_open());
        assert!(matches!(
            state.sheet.controller().content(),
            Some(SheetBody::PostMenu(_))
        ));
        state.tick(t0 + Duration::from_millis(250));
        assert_eq!(state.sheet.controller().phase(), SheetPhase::Open);
    }

    #[test]
    fn test_tab_change_tints_header_until_close() {
        let t0 = Instant::now();
        let mut state = state();
        state.open_post_menu().unwrap();
        state.tick(t0);
        state.tick(t0 + Duration::from_millis(250));

        state.activate_menu_tab(1, t0 + Duration::from_millis(300)).unwrap();
        state.tick(t0 + Duration::from_millis(600));
        let colors = state.theme.colors();
        assert_eq!(state.header_color, Some(colors.tab_tint(1)));

        state.close_sheet().unwrap();
        state.tick(t0 + Duration::from_millis(700));
        state.tick(t0 + Duration::from_millis(1000));
        assert!(!state.sheet.controller().is_open());
        assert_eq!(state.header_color, None);
    }

    #[test]
    fn test_engagement_targets_menu_post() {
        let t0 = Instant::now();
        let mut state = state();
        let first = state.feed.get(0).unwrap().id;
        state.open_post_menu().unwrap();
        state.tick(t0);
        state.select_next_post(t0);

        let mutation = state.toggle_engagement(MutationKind::Like).unwrap();
        assert_eq!(mutation.post_id, first);
    }

    #[test]
    fn test_quick_steps_chain_through_tabs() {
        let t0 = Instant::now();
        let mut state = state();
        state.open_post_menu().unwrap();
        state.tick(t0);
        state.tick(t0 + Duration::from_millis(250));

        state.step_menu_tab(true, t0 + Duration::from_millis(300)).unwrap();
        state.step_menu_tab(true, t0 + Duration::from_millis(350)).unwrap();
        state.tick(t0 + Duration::from_millis(700));

        let Some(SheetBody::PostMenu(menu)) = state.sheet.controller().content() else {
            panic!("menu not mounted");
        };
        assert_eq!(menu.tabs.active_index(), 2);
    }

    #[test]
    fn test_dwell_records_are_counted() {
        let t0 = Instant::now();
        let mut state = state();
        state.refocus(t0);
        state.select_next_post(t0 + Duration::from_secs(2));
        state.tick(t0 + Duration::from_secs(2));
        assert_eq!(state.seen_count, 1);
        assert!(state.seen.drain().is_empty());
    }

    #[test]
    fn test_out_of_range_menu_tab_is_an_error() {
        let t0 = Instant::now();
        let mut state = state();
        state.open_post_menu().unwrap();
        state.tick(t0);
        assert!(state.activate_menu_tab(5, t0).is_err());
    }
}
