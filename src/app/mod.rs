//! TUI Application module

mod async_ops;
mod events;
mod menu;
mod state;
mod ui;

pub use menu::{MenuPage, Notice, PostMenu, SheetBody};
pub use state::AppState;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::demo::DemoSource;

use async_ops::{AsyncCommand, AsyncHandle, AsyncResult, spawn_worker};

/// Posts served by the in-memory feed
const DEMO_FEED_SIZE: usize = 60;

/// Frame interval while polling for input
const FRAME: Duration = Duration::from_millis(16);

/// Run the TUI application
pub fn run() -> Result<()> {
    // Create tokio runtime
    let rt = Runtime::new()?;

    // Load config
    let config = Config::load()?;

    // Spawn async worker
    let async_handle = rt.block_on(async { spawn_worker(DemoSource::new(DEMO_FEED_SIZE)) });

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Create app state
    let (cols, rows) = crossterm::terminal::size()?;
    let mut state = AppState::new(config, state::viewport_for(cols, rows))?;

    // Initial page
    let request = state.feed.begin_refresh();
    let _ = async_handle
        .cmd_tx
        .blocking_send(AsyncCommand::LoadPage { request });
    state.set_status("Loading feed...");

    // Main loop
    let result = run_app(&mut terminal, &mut state, async_handle);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    mut async_handle: AsyncHandle,
) -> Result<()> {
    loop {
        // Process any async results
        while let Ok(result) = async_handle.result_rx.try_recv() {
            handle_async_result(state, result);
        }

        // Tick for animations
        state.tick(Instant::now());

        // Draw UI
        terminal.draw(|frame| ui::render(frame, state))?;

        // Handle events
        if event::poll(FRAME)? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) => {
                    if let Some(cmd) = events::handle_key(state, key, now) {
                        let _ = async_handle.cmd_tx.blocking_send(cmd);
                    }
                }
                Event::Mouse(mouse) => events::handle_mouse(state, mouse, now),
                Event::Resize(cols, rows) => state.resize(cols, rows),
                _ => {}
            }
        }

        // Page in more posts near the end of the list
        if let Some(request) = state.next_page_request() {
            let _ = async_handle
                .cmd_tx
                .blocking_send(AsyncCommand::LoadPage { request });
        }

        if state.should_quit {
            // Shutdown async worker
            let _ = async_handle.cmd_tx.blocking_send(AsyncCommand::Shutdown);
            break;
        }
    }

    state.seen.flush(Instant::now());
    tracing::info!(seen = state.seen_count + state.seen.drain().len(), "session ended");

    // Save config on exit
    state.config.save()?;

    Ok(())
}

fn handle_async_result(state: &mut AppState, result: AsyncResult) {
    match result {
        AsyncResult::PageLoaded { request, page } => {
            if state.feed.is_stale(&request) {
                tracing::debug!("ignoring page from a superseded request");
                return;
            }
            let added = state.feed.apply(&request, page);
            if request.refresh {
                state.selected_post = 0;
            }
            state.refocus(Instant::now());
            state.set_status(format!("Loaded {added} posts"));
        }
        AsyncResult::LoadFailed { request, message } => {
            state.feed.fail_load(&request);
            tracing::warn!("feed load failed: {message}");
            state.set_status(format!("❌ {message}"));
        }
        AsyncResult::MutationConfirmed { mutation } => {
            state.feed.confirm(&mutation);
            state.set_status(format!("✅ {} saved", mutation.kind.name()));
        }
        AsyncResult::MutationFailed { mutation, message } => {
            state.feed.rollback(&mutation);
            tracing::warn!(post = %mutation.post_id, "mutation rolled back: {message}");
            state.set_status("❌ Change reverted");
            if let Err(e) = state.show_notice("Couldn't save that", &message) {
                tracing::error!("notice failed: {e}");
            }
        }
    }
}
