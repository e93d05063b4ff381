//! Event handling

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use super::async_ops::AsyncCommand;
use super::menu::SheetBody;
use super::state::{AppState, CELL_HEIGHT, CELL_WIDTH, PanAxis, PointerGesture};
use crate::gesture::{DragMode, VelocityTracker, claims_vertical};
use crate::models::MutationKind;

/// Handle key events, returning an optional async command
pub fn handle_key(state: &mut AppState, key: KeyEvent, now: Instant) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            None
        }
        (_, KeyCode::Char('j') | KeyCode::Down) => {
            state.select_next_post(now);
            None
        }
        (_, KeyCode::Char('k') | KeyCode::Up) => {
            state.select_prev_post(now);
            None
        }
        (_, KeyCode::Char('m') | KeyCode::Enter) => {
            if let Err(e) = state.open_post_menu() {
                state.set_status(format!("❌ {e}"));
            }
            None
        }
        (_, KeyCode::Esc) => {
            if let Err(e) = state.close_sheet() {
                tracing::error!("close failed: {e}");
            }
            None
        }
        (_, KeyCode::Char('h') | KeyCode::Left) => {
            report(state, |s| s.step_menu_tab(false, now));
            None
        }
        (_, KeyCode::Char('l') | KeyCode::Right) => {
            report(state, |s| s.step_menu_tab(true, now));
            None
        }
        (_, KeyCode::Char(c @ '1'..='3')) => {
            let index = (c as usize) - ('1' as usize);
            report(state, |s| s.activate_menu_tab(index, now));
            None
        }
        (_, KeyCode::Char('L')) => mutate(state, MutationKind::Like),
        (_, KeyCode::Char('R')) => mutate(state, MutationKind::Repost),
        (_, KeyCode::Char('S')) => mutate(state, MutationKind::Save),
        (_, KeyCode::Char('r')) => {
            let request = state.feed.begin_refresh();
            state.set_status("Refreshing...");
            Some(AsyncCommand::LoadPage { request })
        }
        (_, KeyCode::Char('t')) => {
            state.next_theme();
            None
        }
        _ => None,
    }
}

fn mutate(state: &mut AppState, kind: MutationKind) -> Option<AsyncCommand> {
    state
        .toggle_engagement(kind)
        .map(|mutation| AsyncCommand::Mutate { mutation })
}

fn report(state: &mut AppState, action: impl FnOnce(&mut AppState) -> anyhow::Result<()>) {
    if let Err(e) = action(state) {
        tracing::error!("{e}");
        state.set_status(format!("❌ {e}"));
    }
}

fn contains(rect: Rect, col: u16, row: u16) -> bool {
    rect.contains(Position::new(col, row))
}

/// Handle mouse events
///
/// A press inside the sheet becomes a pan once it leaves the dead zone: the
/// pager claims mostly-horizontal pans that start on it, the sheet claims
/// mostly-vertical ones. A press outside an open sheet closes it.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent, now: Instant) {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if state.sheet.controller().is_open() && !contains(state.layout.sheet, col, row) {
                if let Err(e) = state.close_sheet() {
                    tracing::error!("close failed: {e}");
                }
                return;
            }
            let mut velocity = VelocityTracker::new();
            velocity.push(now, f32::from(col) * CELL_WIDTH);
            state.pointer = Some(PointerGesture {
                start_col: col,
                start_row: row,
                claimed: None,
                velocity,
            });
        }
        MouseEventKind::Drag(MouseButton::Left) => drag(state, col, row, now),
        MouseEventKind::Up(MouseButton::Left) => release(state, col, row, now),
        _ => {}
    }
}

fn drag(state: &mut AppState, col: u16, row: u16, now: Instant) {
    let Some(pointer) = state.pointer.as_mut() else {
        return;
    };
    let dx = (f32::from(col) - f32::from(pointer.start_col)) * CELL_WIDTH;
    let dy = (f32::from(row) - f32::from(pointer.start_row)) * CELL_HEIGHT;
    pointer.velocity.push(now, f32::from(col) * CELL_WIDTH);

    let on_pager = contains(state.layout.pager, pointer.start_col, pointer.start_row);
    let on_sheet = contains(state.layout.sheet, pointer.start_col, pointer.start_row);
    let controller = state.sheet.controller_mut();

    if pointer.claimed.is_none() {
        if on_pager
            && let Some(SheetBody::PostMenu(menu)) = controller.content_mut()
            && menu.tabs.pan_activation().claims(dx, dy)
        {
            menu.tabs.begin_drag(now);
            pointer.claimed = Some(PanAxis::Horizontal);
        } else if on_sheet
            && claims_vertical(dx, dy, controller.drag_threshold())
            && controller.begin_drag(DragMode::Resistive, now)
        {
            pointer.claimed = Some(PanAxis::Vertical);
        }
    }

    match pointer.claimed {
        Some(PanAxis::Horizontal) => {
            if let Some(SheetBody::PostMenu(menu)) = controller.content_mut() {
                menu.tabs.drag_to(dx);
            }
        }
        Some(PanAxis::Vertical) => controller.drag_to(dy),
        None => {}
    }
}

fn release(state: &mut AppState, col: u16, row: u16, now: Instant) {
    let Some(pointer) = state.pointer.take() else {
        return;
    };
    match pointer.claimed {
        Some(PanAxis::Horizontal) => {
            if let Some(SheetBody::PostMenu(menu)) = state.sheet.controller_mut().content_mut() {
                let target = menu.tabs.end_drag(pointer.velocity.velocity(), now);
                tracing::debug!(target, "pager released");
            }
        }
        Some(PanAxis::Vertical) => state.sheet.controller_mut().end_drag(now),
        None => {
            let bar = state.layout.tab_bar;
            if contains(bar, col, row) && contains(bar, pointer.start_col, pointer.start_row) {
                let count = match state.sheet.controller().content() {
                    Some(SheetBody::PostMenu(menu)) => menu.tabs.len(),
                    _ => return,
                };
                let index = usize::from(col - bar.x) * count / usize::from(bar.width.max(1));
                report(state, |s| s.activate_menu_tab(index, now));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::demo::DemoSource;
    use crate::sheet::SheetPhase;
    use crossterm::event::KeyEventState;
    use crossterm::event::KeyEventKind;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn open_state(t0: Instant) -> AppState {
        let mut state =
            AppState::new(Config::default(), super::super::state::viewport_for(80, 24)).unwrap();
        let request = state.feed.begin_refresh();
        let page = DemoSource::new(10).fetch(&request).unwrap();
        state.feed.apply(&request, page);
        state.layout.screen = Rect::new(0, 0, 80, 24);
        state.layout.sheet = Rect::new(0, 10, 80, 14);
        state.layout.tab_bar = Rect::new(1, 11, 78, 1);
        state.layout.pager = Rect::new(1, 13, 40, 10);

        handle_key(&mut state, key(KeyCode::Char('m')), t0);
        state.tick(t0);
        state.tick(t0 + Duration::from_millis(250));
        state
    }

    #[test]
    fn test_escape_closes_sheet() {
        let t0 = Instant::now();
        let mut state = open_state(t0);
        assert!(state.sheet.controller().is_open());

        handle_key(&mut state, key(KeyCode::Esc), t0);
        state.tick(t0 + Duration::from_millis(300));
        assert_eq!(state.sheet.controller().phase(), SheetPhase::Closing);
        state.tick(t0 + Duration::from_millis(600));
        assert!(!state.sheet.controller().is_open());
    }

    #[test]
    fn test_like_key_emits_mutation() {
        let t0 = Instant::now();
        let mut state = open_state(t0);
        let cmd = handle_key(&mut state, key(KeyCode::Char('L')), t0);
        assert!(matches!(cmd, Some(AsyncCommand::Mutate { .. })));
        assert!(state.feed.get(0).unwrap().liked);
    }

    #[test]
    fn test_horizontal_drag_swipes_pager() {
        let t0 = Instant::now();
        let mut state = open_state(t0);

        handle_mouse(&mut state, mouse(MouseEventKind::Down(MouseButton::Left), 30, 15), t0);
        handle_mouse(
            &mut state,
            mouse(MouseEventKind::Drag(MouseButton::Left), 20, 15),
            t0 + Duration::from_millis(16),
        );
        handle_mouse(
            &mut state,
            mouse(MouseEventKind::Drag(MouseButton::Left), 10, 15),
            t0 + Duration::from_millis(32),
        );
        assert!(matches!(
            state.pointer.as_ref().and_then(|p| p.claimed),
            Some(PanAxis::Horizontal)
        ));
        handle_mouse(
            &mut state,
            mouse(MouseEventKind::Up(MouseButton::Left), 10, 15),
            t0 + Duration::from_millis(40),
        );
        state.tick(t0 + Duration::from_millis(400));

        let Some(SheetBody::PostMenu(menu)) = state.sheet.controller().content() else {
            panic!("menu not mounted");
        };
        assert_eq!(menu.tabs.active_index(), 1);
    }

    #[test]
    fn test_vertical_drag_moves_sheet() {
        let t0 = Instant::now();
        let mut state = open_state(t0);

        handle_mouse(&mut state, mouse(MouseEventKind::Down(MouseButton::Left), 60, 11), t0);
        handle_mouse(
            &mut state,
            mouse(MouseEventKind::Drag(MouseButton::Left), 60, 14),
            t0 + Duration::from_millis(16),
        );
        assert!(state.sheet.controller().is_dragging());
        assert!((state.sheet.controller().offset() - 48.0).abs() < 0.01);

        handle_mouse(
            &mut state,
            mouse(MouseEventKind::Up(MouseButton::Left), 60, 14),
            t0 + Duration::from_millis(32),
        );
        assert!(!state.sheet.controller().is_dragging());
    }

    #[test]
    fn test_backdrop_tap_closes_sheet() {
        let t0 = Instant::now();
        let mut state = open_state(t0);
        handle_mouse(&mut state, mouse(MouseEventKind::Down(MouseButton::Left), 5, 2), t0);
        state.tick(t0 + Duration::from_millis(300));
        assert_eq!(state.sheet.controller().phase(), SheetPhase::Closing);
    }

    #[test]
    fn test_tab_bar_tap_activates_tab() {
        let t0 = Instant::now();
        let mut state = open_state(t0);
        handle_mouse(&mut state, mouse(MouseEventKind::Down(MouseButton::Left), 70, 11), t0);
        handle_mouse(&mut state, mouse(MouseEventKind::Up(MouseButton::Left), 70, 11), t0);
        state.tick(t0 + Duration::from_millis(400));

        let Some(SheetBody::PostMenu(menu)) = state.sheet.controller().content() else {
            panic!("menu not mounted");
        };
        assert_eq!(menu.tabs.active_index(), 2);
    }
}
