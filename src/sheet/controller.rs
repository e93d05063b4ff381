//! Bottom sheet state machine
//!
//! `Closed -> Opening -> Open -> Closing -> Closed`. The transient phases are
//! animation-only; a new command reverses direction instead of queueing.

use std::fmt;
use std::time::Instant;

use ratatui::style::Style;
use tokio::sync::watch;

use crate::config::SheetConfig;
use crate::gesture::{DragMode, Platform, Viewport};
use crate::motion::{Advance, AnimatedValue, Easing};

/// Deferred content construction
pub type ContentProducer<C> = Box<dyn FnOnce() -> C + Send>;

/// Lifecycle phase of the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetPhase {
    /// Hidden, offset parked below the screen
    #[default]
    Closed,
    /// Sliding up
    Opening,
    /// Resting (or being dragged) on screen
    Open,
    /// Sliding down; cleanup runs when this settles
    Closing,
}

/// Read-only view of the sheet published to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SheetSnapshot {
    /// Current phase
    pub phase: SheetPhase,
    /// Whether the sheet is mounted
    pub is_open: bool,
    /// Vertical offset, 0 = fully open
    pub offset: f32,
    /// Whether inner content may capture vertical drags
    pub interactive_scroll: bool,
    /// Whether content is currently mounted
    pub has_content: bool,
}

struct PendingContent<C> {
    producer: ContentProducer<C>,
    ready_at: Instant,
    /// Issued while closing; held until the next `open`
    held: bool,
}

#[derive(Debug, Clone, Copy)]
struct SheetDrag {
    start_offset: f32,
    mode: DragMode,
}

/// Owner of the single bottom sheet surface
pub struct SheetController<C> {
    config: SheetConfig,
    platform: Platform,
    viewport: Viewport,
    phase: SheetPhase,
    offset: AnimatedValue,
    content: Option<C>,
    style: Option<Style>,
    background_style: Option<Style>,
    interactive_scroll: bool,
    pending: Option<PendingContent<C>>,
    drag: Option<SheetDrag>,
    snapshot_tx: watch::Sender<SheetSnapshot>,
}

impl<C> fmt::Debug for SheetController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetController")
            .field("phase", &self.phase)
            .field("offset", &self.offset.value())
            .field("has_content", &self.content.is_some())
            .field("pending_content", &self.pending.is_some())
            .field("dragging", &self.drag.is_some())
            .finish_non_exhaustive()
    }
}

impl<C> SheetController<C> {
    /// Create a closed sheet for `viewport`
    pub fn new(viewport: Viewport, config: SheetConfig, platform: Platform) -> Self {
        let closed = viewport.height + config.close_margin;
        let (snapshot_tx, _) = watch::channel(SheetSnapshot {
            offset: closed,
            ..SheetSnapshot::default()
        });
        Self {
            config,
            platform,
            viewport,
            phase: SheetPhase::Closed,
            offset: AnimatedValue::new(closed),
            content: None,
            style: None,
            background_style: None,
            interactive_scroll: false,
            pending: None,
            drag: None,
            snapshot_tx,
        }
    }

    /// Resting offset of the closed sheet
    pub fn closed_offset(&self) -> f32 {
        self.viewport.height + self.config.close_margin
    }

    /// Current phase
    pub const fn phase(&self) -> SheetPhase {
        self.phase
    }

    /// Whether the sheet is mounted
    pub fn is_open(&self) -> bool {
        self.phase != SheetPhase::Closed
    }

    /// Current vertical offset
    pub const fn offset(&self) -> f32 {
        self.offset.value()
    }

    /// Mounted content
    pub const fn content(&self) -> Option<&C> {
        self.content.as_ref()
    }

    /// Mounted content, mutably (content often owns its own state, e.g. tabs)
    pub const fn content_mut(&mut self) -> Option<&mut C> {
        self.content.as_mut()
    }

    /// Container style override
    pub const fn style(&self) -> Option<Style> {
        self.style
    }

    /// Backdrop style override
    pub const fn background_style(&self) -> Option<Style> {
        self.background_style
    }

    /// Whether inner content may capture vertical drags
    pub const fn interactive_scroll(&self) -> bool {
        self.interactive_scroll
    }

    /// Whether a drag is in progress
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether a content swap is waiting to be applied
    pub const fn has_pending_content(&self) -> bool {
        self.pending.is_some()
    }

    /// Viewport the sheet is laid out against
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Vertical travel needed before a drag on the sheet activates
    pub const fn drag_threshold(&self) -> f32 {
        self.platform.sheet_drag_threshold(self.interactive_scroll)
    }

    /// Snapshot of the current state
    pub fn snapshot(&self) -> SheetSnapshot {
        SheetSnapshot {
            phase: self.phase,
            is_open: self.is_open(),
            offset: self.offset.value(),
            interactive_scroll: self.interactive_scroll,
            has_content: self.content.is_some(),
        }
    }

    /// Subscribe to snapshots; every mutation publishes a fresh one
    pub fn subscribe(&self) -> watch::Receiver<SheetSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Track a new viewport size
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.phase == SheetPhase::Closed {
            self.offset.set(self.closed_offset());
            self.publish();
        }
    }

    /// Show the sheet, sliding it up to offset 0
    pub fn open(&mut self, now: Instant) {
        self.tick(now);
        self.drag = None;
        match self.phase {
            SheetPhase::Opening => return,
            SheetPhase::Open if self.is_resting_open() => return,
            SheetPhase::Closing => tracing::debug!("sheet close reversed by open"),
            _ => {}
        }
        self.settle_open(now);
        if let Some(pending) = self.pending.as_mut()
            && pending.held
        {
            pending.held = false;
            pending.ready_at = now + self.config.content_swap_delay(self.platform);
            self.apply_pending(now);
        }
    }

    /// Hide the sheet; content and styles are cleared once the slide finishes
    pub fn close(&mut self, now: Instant) {
        self.tick(now);
        self.drag = None;
        if matches!(self.phase, SheetPhase::Closed | SheetPhase::Closing) {
            return;
        }
        if self.pending.take().is_some() {
            tracing::debug!("pending sheet content dropped by close");
        }
        if self.phase == SheetPhase::Opening {
            tracing::debug!("sheet open reversed by close");
        }
        self.phase = SheetPhase::Closing;
        let target = self.closed_offset();
        self.offset
            .animate_to(target, now, self.config.open_duration(), Easing::EaseInOut);
        self.publish();
    }

    /// Replace the content with whatever `producer` builds
    ///
    /// The producer runs exactly once, when the swap is applied. With a
    /// non-zero swap delay the swap waits. While the sheet is closing it is
    /// held until the next `open`, so the close still ends with no content.
    /// A later `set_content` replaces a waiting one without running it.
    pub fn set_content(&mut self, producer: ContentProducer<C>, now: Instant) {
        self.tick(now);
        let delay = self.config.content_swap_delay(self.platform);
        if delay.is_zero() && self.phase != SheetPhase::Closing {
            self.pending = None;
            self.content = Some(producer());
            self.publish();
            return;
        }
        if self.pending.is_some() {
            tracing::debug!("pending sheet content superseded");
        }
        self.pending = Some(PendingContent {
            producer,
            ready_at: now + delay,
            held: self.phase == SheetPhase::Closing,
        });
        self.tick(now);
    }

    /// Replace the container style override
    pub fn set_style(&mut self, style: Option<Style>) {
        self.style = style;
        self.publish();
    }

    /// Replace the backdrop style override
    pub fn set_background_style(&mut self, style: Option<Style>) {
        self.background_style = style;
        self.publish();
    }

    /// Allow or forbid inner content to win vertical gesture arbitration
    pub fn set_interactive_scroll(&mut self, enabled: bool) {
        self.interactive_scroll = enabled;
        self.publish();
    }

    /// Advance animations and pending swaps to `now`
    ///
    /// Returns `true` while something is still in flight.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        match self.offset.advance(now) {
            Advance::Settled => {
                changed = true;
                match self.phase {
                    SheetPhase::Opening => {
                        self.phase = SheetPhase::Open;
                        tracing::debug!("sheet opened");
                    }
                    SheetPhase::Closing => self.finish_close(),
                    SheetPhase::Open | SheetPhase::Closed => {}
                }
            }
            Advance::Running => changed = true,
            Advance::Idle => {}
        }

        changed |= self.apply_pending(now);

        if changed {
            self.publish();
        }
        self.offset.is_animating() || self.pending.as_ref().is_some_and(|p| !p.held)
    }

    /// Start a vertical drag; ignored while the sheet is closed
    pub fn begin_drag(&mut self, mode: DragMode, now: Instant) -> bool {
        self.tick(now);
        if self.phase == SheetPhase::Closed {
            tracing::warn!("drag on a closed sheet ignored");
            return false;
        }
        let start_offset = self.offset.value();
        self.offset.set(start_offset);
        self.phase = SheetPhase::Open;
        self.drag = Some(SheetDrag { start_offset, mode });
        self.publish();
        true
    }

    /// Follow a drag; `dy` is the translation since the drag began
    pub fn drag_to(&mut self, dy: f32) {
        let Some(drag) = self.drag else {
            return;
        };
        let height = self.viewport.height;
        let raw = drag.start_offset + dy;
        let offset = match drag.mode {
            DragMode::Overlay => raw.clamp(0.0, height.max(0.0)),
            DragMode::Resistive => {
                if raw >= 0.0 {
                    raw.min(height.max(0.0))
                } else {
                    let floor = (self.config.over_drag_allowance - height).min(0.0);
                    (raw * 0.5).max(floor)
                }
            }
        };
        self.offset.set(offset);
        self.publish();
    }

    /// Finish a drag, committing to close past the dismiss threshold
    pub fn end_drag(&mut self, now: Instant) {
        if self.drag.take().is_none() {
            return;
        }
        let threshold = self.viewport.height * self.config.dismiss_ratio;
        if self.offset.value() > threshold {
            tracing::debug!(offset = self.offset.value(), "sheet dismissed by drag");
            self.close(now);
        } else {
            self.settle_open(now);
        }
    }

    /// Run a due, unheld swap; returns whether content changed
    fn apply_pending(&mut self, now: Instant) -> bool {
        if self.phase == SheetPhase::Closing
            || !self
                .pending
                .as_ref()
                .is_some_and(|p| !p.held && now >= p.ready_at)
        {
            return false;
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };
        self.content = Some((pending.producer)());
        self.publish();
        true
    }

    fn is_resting_open(&self) -> bool {
        !self.offset.is_animating() && self.offset.value().abs() < f32::EPSILON
    }

    fn settle_open(&mut self, now: Instant) {
        self.phase = SheetPhase::Opening;
        self.offset
            .animate_to(0.0, now, self.config.open_duration(), Easing::EaseOut);
        self.publish();
    }

    fn finish_close(&mut self) {
        self.phase = SheetPhase::Closed;
        self.content = None;
        self.style = None;
        self.background_style = None;
        self.offset.set(self.closed_offset());
        tracing::debug!("sheet closed");
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn sheet(platform: Platform) -> SheetController<String> {
        SheetController::new(Viewport::new(400.0, 800.0), SheetConfig::default(), platform)
    }

    fn counted(counter: &Arc<AtomicUsize>, text: &str) -> ContentProducer<String> {
        let counter = Arc::clone(counter);
        let text = text.to_string();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            text
        })
    }

    #[test]
    fn test_open_then_settle() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        assert!(!sheet.is_open());
        assert!((sheet.offset() - 900.0).abs() < f32::EPSILON);

        sheet.open(t0);
        assert!(sheet.is_open());
        assert_eq!(sheet.phase(), SheetPhase::Opening);
        sheet.tick(t0 + ms(100));
        assert!(sheet.offset() > 0.0 && sheet.offset() < 900.0);

        assert!(!sheet.tick(t0 + ms(200)));
        assert_eq!(sheet.phase(), SheetPhase::Open);
        assert!(sheet.offset().abs() < f32::EPSILON);
    }

    #[test]
    fn test_open_is_idempotent() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        sheet.open(t0);
        sheet.open(t0 + ms(100));
        // Second open did not restart the tween
        sheet.tick(t0 + ms(200));
        assert_eq!(sheet.phase(), SheetPhase::Open);
        sheet.open(t0 + ms(300));
        assert_eq!(sheet.phase(), SheetPhase::Open);
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        sheet.close(t0);
        assert_eq!(sheet.phase(), SheetPhase::Closed);
    }

    #[test]
    fn test_close_clears_content_and_styles() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        sheet.set_content(Box::new(|| "menu".to_string()), t0);
        sheet.set_style(Some(Style::default().bg(Color::Blue)));
        sheet.set_background_style(Some(Style::default().bg(Color::Black)));
        sheet.open(t0);
        sheet.tick(t0 + ms(200));
        assert_eq!(sheet.content().map(String::as_str), Some("menu"));

        sheet.close(t0 + ms(300));
        // Still visible while sliding down
        sheet.tick(t0 + ms(400));
        assert!(sheet.is_open());
        assert!(sheet.content().is_some());

        sheet.tick(t0 + ms(500));
        assert!(!sheet.is_open());
        assert!(sheet.content().is_none());
        assert!(sheet.style().is_none());
        assert!(sheet.background_style().is_none());
        assert!((sheet.offset() - sheet.closed_offset()).abs() < f32::EPSILON);
    }

    #[test]
    fn test_last_command_wins() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        sheet.open(t0);
        sheet.close(t0 + ms(50));
        sheet.open(t0 + ms(80));
        sheet.close(t0 + ms(90));
        assert_eq!(sheet.phase(), SheetPhase::Closing);
        sheet.tick(t0 + ms(290));
        assert!(!sheet.is_open());

        sheet.open(t0 + ms(300));
        sheet.close(t0 + ms(350));
        sheet.open(t0 + ms(400));
        sheet.tick(t0 + ms(600));
        assert_eq!(sheet.phase(), SheetPhase::Open);
    }

    #[test]
    fn test_reversal_keeps_content() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        sheet.set_content(Box::new(|| "menu".to_string()), t0);
        sheet.open(t0);
        sheet.tick(t0 + ms(200));
        sheet.close(t0 + ms(210));
        sheet.open(t0 + ms(300));
        sheet.tick(t0 + ms(600));
        assert_eq!(sheet.phase(), SheetPhase::Open);
        assert_eq!(sheet.content().map(String::as_str), Some("menu"));
    }

    #[test]
    fn test_producer_runs_once_immediately() {
        let t0 = Instant::now();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sheet = sheet(Platform::Ios);
        sheet.set_content(counted(&calls, "a"), t0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        sheet.tick(t0 + ms(1000));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(sheet.content().map(String::as_str), Some("a"));
    }

    #[test]
    fn test_delayed_swap_on_android() {
        let t0 = Instant::now();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sheet = sheet(Platform::Android);
        sheet.open(t0);
        sheet.set_content(counted(&calls, "a"), t0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(sheet.content().is_none());

        sheet.tick(t0 + ms(199));
        assert!(sheet.content().is_none());
        sheet.tick(t0 + ms(200));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(sheet.content().map(String::as_str), Some("a"));
    }

    #[test]
    fn test_superseded_swap_never_runs() {
        let t0 = Instant::now();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut sheet = sheet(Platform::Android);
        sheet.set_content(counted(&first, "a"), t0);
        sheet.set_content(counted(&second, "b"), t0 + ms(50));
        sheet.tick(t0 + ms(400));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(sheet.content().map(String::as_str), Some("b"));
    }

    #[test]
    fn test_close_drops_earlier_pending_swap() {
        let t0 = Instant::now();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sheet = sheet(Platform::Android);
        sheet.open(t0);
        sheet.set_content(counted(&calls, "stale"), t0 + ms(10));
        sheet.close(t0 + ms(20));
        sheet.tick(t0 + ms(1000));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(sheet.content().is_none());
    }

    #[test]
    fn test_swap_issued_while_closing_leaves_sheet_empty() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        sheet.set_content(Box::new(|| "old".to_string()), t0);
        sheet.open(t0);
        sheet.tick(t0 + ms(200));

        sheet.close(t0 + ms(200));
        sheet.set_content(Box::new(|| "new".to_string()), t0 + ms(210));
        assert_eq!(sheet.content().map(String::as_str), Some("old"));

        assert!(!sheet.tick(t0 + ms(1000)));
        assert_eq!(sheet.phase(), SheetPhase::Closed);
        assert!(!sheet.is_open());
        assert!(sheet.content().is_none());
        assert!(sheet.has_pending_content());
    }

    #[test]
    fn test_swap_held_through_close_shows_on_next_open() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        sheet.set_content(Box::new(|| "old".to_string()), t0);
        sheet.open(t0);
        sheet.tick(t0 + ms(200));

        sheet.close(t0 + ms(200));
        sheet.set_content(Box::new(|| "new".to_string()), t0 + ms(210));
        sheet.tick(t0 + ms(1000));
        assert!(sheet.content().is_none());

        sheet.open(t0 + ms(1100));
        assert_eq!(sheet.content().map(String::as_str), Some("new"));
        assert!(!sheet.has_pending_content());
    }

    #[test]
    fn test_held_swap_keeps_android_delay_after_open() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Android);
        sheet.open(t0);
        sheet.tick(t0 + ms(200));

        sheet.close(t0 + ms(200));
        sheet.set_content(Box::new(|| "new".to_string()), t0 + ms(210));
        sheet.tick(t0 + ms(1000));
        assert!(sheet.content().is_none());

        sheet.open(t0 + ms(1100));
        assert!(sheet.content().is_none());
        sheet.tick(t0 + ms(1100));
        assert!(sheet.content().is_none());
        sheet.tick(t0 + ms(1300));
        assert_eq!(sheet.content().map(String::as_str), Some("new"));
    }

    #[test]
    fn test_resistive_drag() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        sheet.open(t0);
        sheet.tick(t0 + ms(200));

        assert!(sheet.begin_drag(DragMode::Resistive, t0 + ms(300)));
        sheet.drag_to(100.0);
        assert!((sheet.offset() - 100.0).abs() < f32::EPSILON);
        sheet.drag_to(-100.0);
        assert!((sheet.offset() + 50.0).abs() < f32::EPSILON);
        // Floor is 600 - 800 = -200
        sheet.drag_to(-1000.0);
        assert!((sheet.offset() + 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overlay_drag_clamps() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        sheet.open(t0);
        sheet.tick(t0 + ms(200));
        sheet.begin_drag(DragMode::Overlay, t0 + ms(200));
        sheet.drag_to(-50.0);
        assert!(sheet.offset().abs() < f32::EPSILON);
        sheet.drag_to(5000.0);
        assert!((sheet.offset() - 800.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_release_threshold() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        sheet.open(t0);
        sheet.tick(t0 + ms(200));

        // 20% of 800 is 160
        sheet.begin_drag(DragMode::Resistive, t0 + ms(200));
        sheet.drag_to(150.0);
        sheet.end_drag(t0 + ms(300));
        assert_eq!(sheet.phase(), SheetPhase::Opening);
        sheet.tick(t0 + ms(500));
        assert_eq!(sheet.phase(), SheetPhase::Open);
        assert!(sheet.offset().abs() < f32::EPSILON);

        sheet.begin_drag(DragMode::Resistive, t0 + ms(600));
        sheet.drag_to(170.0);
        sheet.end_drag(t0 + ms(700));
        assert_eq!(sheet.phase(), SheetPhase::Closing);
        sheet.tick(t0 + ms(900));
        assert!(!sheet.is_open());
    }

    #[test]
    fn test_drag_interrupts_close() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        sheet.open(t0);
        sheet.tick(t0 + ms(200));
        sheet.close(t0 + ms(200));
        assert!(sheet.begin_drag(DragMode::Resistive, t0 + ms(250)));
        assert_eq!(sheet.phase(), SheetPhase::Open);
        // The close tween no longer moves the sheet
        let held = sheet.offset();
        sheet.tick(t0 + ms(600));
        assert!((sheet.offset() - held).abs() < f32::EPSILON);
        assert!(sheet.is_open());
    }

    #[test]
    fn test_drag_on_closed_sheet_ignored() {
        let mut sheet = sheet(Platform::Ios);
        assert!(!sheet.begin_drag(DragMode::Overlay, Instant::now()));
        assert!(!sheet.is_dragging());
    }

    #[test]
    fn test_snapshot_subscribers_see_changes() {
        let t0 = Instant::now();
        let mut sheet = sheet(Platform::Ios);
        let mut rx = sheet.subscribe();
        sheet.open(t0);
        tokio_test::block_on(rx.changed()).unwrap();
        assert!(rx.borrow_and_update().is_open);

        sheet.set_interactive_scroll(true);
        assert!(rx.borrow().interactive_scroll);
        assert!(sheet.drag_threshold() > Platform::Ios.sheet_drag_threshold(false));
    }
}
