//! UI rendering for the TUI

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::menu::{Notice, PostMenu, SheetBody};
use super::state::{AppState, CELL_HEIGHT, CELL_WIDTH, LayoutCache};
use crate::theme::ThemeColors;

/// Nestle icon
const ICON: &str = "🪺";

/// Main render function
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let colors = state.theme.colors();

    // Set background
    let area = frame.area();
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Feed
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, state, &colors, chunks[0]);
    render_feed(frame, state, &colors, chunks[1]);
    render_status_bar(frame, state, &colors, chunks[2]);

    state.layout = LayoutCache {
        screen: area,
        ..LayoutCache::default()
    };
    render_sheet(frame, state, &colors, area);
}

fn render_header(frame: &mut Frame, state: &AppState, colors: &ThemeColors, area: Rect) {
    let style = match state.header_color {
        Some(tint) => Style::default().bg(tint).fg(colors.bg),
        None => Style::default().bg(colors.bg_secondary).fg(colors.primary),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {ICON} Nestle "), style.add_modifier(Modifier::BOLD)),
        Span::styled(format!("· {} ", state.config.platform.name()), style),
    ]))
    .style(style);
    frame.render_widget(header, area);
}

fn render_feed(frame: &mut Frame, state: &AppState, colors: &ThemeColors, area: Rect) {
    let block = Block::default()
        .title(" 📰 Feed ")
        .title_style(colors.text_primary())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block());

    if state.feed.is_empty() {
        let message = if state.feed.is_loading() {
            "⏳ Loading..."
        } else {
            "No posts yet, press [r] to refresh"
        };
        let empty = Paragraph::new(Line::styled(format!("  {message}"), colors.text_muted()))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let preview_width = usize::from(area.width.saturating_sub(8));
    let items: Vec<ListItem> = state
        .feed
        .posts()
        .iter()
        .map(|post| {
            let mark = |active: bool, on: &'static str, off: &'static str| {
                if active { on } else { off }
            };
            let seen = if state.seen.is_seen(post.id) { " ✓" } else { "" };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!(" @{}", post.author_handle), colors.text_primary()),
                    Span::styled(
                        format!(" · {}{seen}", post.relative_time()),
                        colors.text_muted(),
                    ),
                ]),
                Line::styled(format!("   {}", post.preview(preview_width)), colors.text()),
                Line::styled(
                    format!(
                        "   {} {}  {} {}  {} {}  💬 {}",
                        mark(post.liked, "♥", "♡"),
                        post.like_count,
                        mark(post.reposted, "🔁", "⇄"),
                        post.repost_count,
                        mark(post.saved, "🔖", "□"),
                        post.save_count,
                        post.reply_count,
                    ),
                    colors.text_muted(),
                ),
                Line::from(""),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(colors.selected());
    let mut list_state = ListState::default().with_selected(Some(state.selected_post));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_status_bar(frame: &mut Frame, state: &AppState, colors: &ThemeColors, area: Rect) {
    // Spinner animation frames
    const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

    let loading_indicator = if state.feed.is_loading() {
        let frame_idx = (state.current_tick() / 2) as usize % SPINNER.len();
        format!("{} ", SPINNER[frame_idx])
    } else {
        String::new()
    };

    let mut content = vec![
        Span::styled(" ", Style::default()),
        Span::styled(loading_indicator, colors.text_secondary()),
    ];
    if state.status.is_empty() {
        for (key, label) in [
            ("m", "menu  "),
            ("L/R/S", "like/repost/save  "),
            ("r", "refresh  "),
            ("t", "theme  "),
            ("q", "quit"),
        ] {
            content.push(Span::styled(key, colors.key_hint()));
            content.push(Span::styled(format!(": {label}"), colors.text_muted()));
        }
    } else {
        content.push(Span::styled(state.status.as_str(), colors.text_secondary()));
    }
    content.push(Span::styled(
        format!("  seen {}", state.seen_count),
        colors.text_muted(),
    ));

    let status =
        Paragraph::new(Line::from(content)).style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(status, area);
}

/// Rows covered by a sheet at `offset` (logical px, 0 = fully open)
///
/// The sheet is pinned to the bottom edge; dragging it above its resting
/// height stretches it upward.
pub fn sheet_area(screen: Rect, offset: f32, height_ratio: f32) -> Rect {
    let bottom = i32::from(screen.bottom());
    let rows = ((f32::from(screen.height) * height_ratio).round() as i32).max(1);
    let top = (bottom - rows + (offset / CELL_HEIGHT).round() as i32)
        .clamp(i32::from(screen.y), bottom);
    let top = top as u16;
    Rect::new(screen.x, top, screen.width, screen.bottom() - top)
}

fn render_sheet(frame: &mut Frame, state: &mut AppState, colors: &ThemeColors, screen: Rect) {
    let controller = state.sheet.controller();
    if !controller.is_open() {
        return;
    }

    let backdrop = controller.background_style().unwrap_or_else(|| colors.backdrop());
    frame.buffer_mut().set_style(screen, backdrop);

    let area = sheet_area(
        screen,
        controller.offset(),
        state.config.sheet.height_ratio,
    );
    state.layout.sheet = area;
    if area.height == 0 {
        return;
    }

    let style = controller.style().unwrap_or_else(|| colors.sheet());
    let block = Block::default()
        .borders(Borders::TOP)
        .border_type(BorderType::Rounded)
        .border_style(style)
        .title(Line::from(" ━━━━ ").alignment(Alignment::Center))
        .style(style);
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let inner = Rect {
        x: inner.x + 1,
        width: inner.width.saturating_sub(2),
        ..inner
    };
    match state.sheet.controller().content() {
        Some(SheetBody::PostMenu(menu)) => {
            let (tab_bar, pager) = render_post_menu(frame, menu, colors, inner);
            state.layout.tab_bar = tab_bar;
            state.layout.pager = pager;
        }
        Some(SheetBody::Notice(notice)) => render_notice(frame, notice, style, inner),
        None => {
            let loading = Paragraph::new(Line::styled("⏳", colors.text_muted()))
                .alignment(Alignment::Center);
            frame.render_widget(loading, inner);
        }
    }
}

fn render_post_menu(
    frame: &mut Frame,
    menu: &PostMenu,
    colors: &ThemeColors,
    area: Rect,
) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Labels
            Constraint::Length(1), // Underline
            Constraint::Min(0),    // Pages
        ])
        .split(area);
    let (labels, underline, pager) = (chunks[0], chunks[1], chunks[2]);

    let tabs = &menu.tabs;
    let indicator = tabs.indicator();
    let count = tabs.len().max(1) as u16;
    let slot = labels.width / count;
    for (i, title) in tabs.titles().enumerate() {
        let opacity = indicator.label_opacity.get(i).copied().unwrap_or(1.0);
        let x = labels.x + slot * i as u16;
        let label_area = Rect::new(x, labels.y, slot, 1);
        let label = Paragraph::new(Line::styled(title, colors.tab_label(opacity)))
            .alignment(Alignment::Center);
        frame.render_widget(label, label_area);
    }

    let bar_x = (indicator.underline_x / CELL_WIDTH).round() as u16;
    let bar_width = (indicator.underline_width / CELL_WIDTH).round() as u16;
    let bar_area = Rect::new(underline.x + bar_x, underline.y, bar_width, 1)
        .intersection(underline);
    let bar = Paragraph::new("▔".repeat(usize::from(bar_area.width)))
        .style(colors.text_primary());
    frame.render_widget(bar, bar_area);

    let page_width = tabs.page_width();
    let left = i32::from(pager.x);
    let right = i32::from(pager.right());
    for i in 0..tabs.len() {
        let Some(page) = tabs.content(i) else {
            continue;
        };
        let x_px = i as f32 * page_width - tabs.shared_offset();
        let start = left + (x_px / CELL_WIDTH).round() as i32;
        let end = start + i32::from(pager.width);
        let (visible_start, visible_end) = (start.max(left), end.min(right));
        if visible_start >= visible_end {
            continue;
        }
        let page_area = Rect::new(
            visible_start as u16,
            pager.y,
            (visible_end - visible_start) as u16,
            pager.height,
        );
        let lines: Vec<Line> = page
            .lines
            .iter()
            .map(|l| Line::styled(l.as_str(), colors.text()))
            .collect();
        let skip = (visible_start - start) as u16;
        frame.render_widget(Paragraph::new(lines).scroll((0, skip)), page_area);
    }

    (labels, pager)
}

fn render_notice(frame: &mut Frame, notice: &Notice, style: Style, area: Rect) {
    let text = vec![
        Line::styled(notice.title.as_str(), style.add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::styled(notice.body.as_str(), style),
    ];
    frame.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: true }),
        area,
    );
}
