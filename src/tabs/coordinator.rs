//! Swipe tab coordinator
//!
//! One shared horizontal offset drives both the tab bar and the pager. Taps
//! tween it to a page; drags write it directly; releases resolve to a page
//! with a distance/velocity rule and then tween.

use std::fmt;
use std::time::Instant;

use tokio::sync::watch;

use super::indicator::IndicatorFrame;
use crate::config::TabsConfig;
use crate::error::TabError;
use crate::gesture::{PanActivation, Platform};
use crate::motion::{Advance, AnimatedValue, Easing};
use crate::signal::Signal;

type Builder<C> = Box<dyn FnOnce() -> C + Send>;
type Callback = Box<dyn FnOnce() + Send>;

/// Description of one tab before it is handed to a coordinator
pub struct TabSpec<C> {
    title: String,
    build: Builder<C>,
    on_activate: Option<Callback>,
}

impl<C> TabSpec<C> {
    /// A tab titled `title` whose content is built on first activation
    pub fn new<F>(title: impl Into<String>, build: F) -> Self
    where
        F: FnOnce() -> C + Send + 'static,
    {
        Self {
            title: title.into(),
            build: Box::new(build),
            on_activate: None,
        }
    }

    /// Run `f` the first time this tab is activated
    pub fn on_activate<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_activate = Some(Box::new(f));
        self
    }
}

struct Tab<C> {
    title: String,
    content: Option<C>,
    build: Option<Builder<C>>,
    on_activate: Option<Callback>,
}

impl<C> Tab<C> {
    /// Build the content if this is the first activation
    fn mount(&mut self) -> bool {
        let Some(build) = self.build.take() else {
            return false;
        };
        self.content = Some(build());
        if let Some(callback) = self.on_activate.take() {
            callback();
        }
        true
    }
}

impl<C> From<TabSpec<C>> for Tab<C> {
    fn from(spec: TabSpec<C>) -> Self {
        Self {
            title: spec.title,
            content: None,
            build: Some(spec.build),
            on_activate: spec.on_activate,
        }
    }
}

/// Events published by a tab group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    /// A tab's content was built for the first time
    Mounted {
        /// Tab index
        index: usize,
    },
    /// The active tab changed after a transition settled
    Changed {
        /// Previous active index
        from: usize,
        /// New active index
        to: usize,
    },
}

/// Read-only view of the pager published to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TabSnapshot {
    /// Shared horizontal offset
    pub shared_offset: f32,
    /// Active tab
    pub active_index: usize,
    /// Whether a pan is in progress
    pub dragging: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingSettle {
    index: usize,
    mount_on_settle: bool,
}

#[derive(Debug, Clone, Copy)]
struct PanDrag {
    origin: f32,
}

/// Pick the page a released pan settles on
///
/// `delta` is the shared offset minus the active page's offset; `velocity` is
/// the pan's release velocity in translation space (positive = finger moving
/// toward the previous tab).
pub fn resolve_release(
    delta: f32,
    velocity: f32,
    active: usize,
    count: usize,
    page_width: f32,
    config: &TabsConfig,
) -> usize {
    let far_enough = delta.abs() > page_width * config.distance_ratio;
    let fast_enough = velocity.abs() > config.velocity_threshold;
    if !(far_enough || fast_enough) {
        return active;
    }

    let toward_next = if delta != 0.0 {
        delta > 0.0
    } else {
        velocity < 0.0
    };
    if toward_next {
        if active + 1 < count { active + 1 } else { active }
    } else {
        active.saturating_sub(1)
    }
}

/// Keeps a tab bar and a horizontal pager in lockstep
pub struct TabCoordinator<C> {
    tabs: Vec<Tab<C>>,
    page_width: f32,
    platform: Platform,
    config: TabsConfig,
    offset: AnimatedValue,
    active_index: usize,
    pending: Option<PendingSettle>,
    drag: Option<PanDrag>,
    indicator: IndicatorFrame,
    indicator_key: f32,
    events: Signal<TabEvent>,
    snapshot_tx: watch::Sender<TabSnapshot>,
}

impl<C> fmt::Debug for TabCoordinator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabCoordinator")
            .field("titles", &self.titles().collect::<Vec<_>>())
            .field("active_index", &self.active_index)
            .field("shared_offset", &self.offset.value())
            .field("pending", &self.pending)
            .field("dragging", &self.drag.is_some())
            .finish_non_exhaustive()
    }
}

impl<C> TabCoordinator<C> {
    /// Create a tab group resting on `initial`, which is mounted immediately
    pub fn new(
        specs: Vec<TabSpec<C>>,
        initial: usize,
        page_width: f32,
        config: TabsConfig,
        platform: Platform,
    ) -> Result<Self, TabError> {
        if specs.is_empty() {
            return Err(TabError::Empty);
        }
        if !(page_width.is_finite() && page_width > 0.0) {
            return Err(TabError::InvalidPageWidth(page_width));
        }
        if initial >= specs.len() {
            return Err(TabError::OutOfRange {
                index: initial,
                len: specs.len(),
            });
        }

        let start = initial as f32 * page_width;
        let (snapshot_tx, _) = watch::channel(TabSnapshot {
            shared_offset: start,
            active_index: initial,
            dragging: false,
        });
        let mut coordinator = Self {
            tabs: specs.into_iter().map(Tab::from).collect(),
            page_width,
            platform,
            config,
            offset: AnimatedValue::new(start),
            active_index: initial,
            pending: None,
            drag: None,
            indicator: IndicatorFrame::default(),
            indicator_key: f32::NAN,
            events: Signal::new("tabs"),
            snapshot_tx,
        };
        coordinator.mount(initial);
        coordinator.refresh();
        Ok(coordinator)
    }

    /// Number of tabs
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Always false; a tab group has at least one tab
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Tab titles in order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.tabs.iter().map(|t| t.title.as_str())
    }

    /// Active tab index
    pub const fn active_index(&self) -> usize {
        self.active_index
    }

    /// Page the pager is heading to: the settle target, else the active tab
    pub fn target_index(&self) -> usize {
        self.pending.map_or(self.active_index, |p| p.index)
    }

    /// Shared horizontal offset
    pub const fn shared_offset(&self) -> f32 {
        self.offset.value()
    }

    /// Page width
    pub const fn page_width(&self) -> f32 {
        self.page_width
    }

    /// Largest valid shared offset
    pub fn max_offset(&self) -> f32 {
        (self.tabs.len().saturating_sub(1)) as f32 * self.page_width
    }

    /// Whether a pan is in progress
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether tab `index` has been mounted
    pub fn is_mounted(&self, index: usize) -> bool {
        self.tabs.get(index).is_some_and(|t| t.content.is_some())
    }

    /// Content of tab `index`, if mounted
    pub fn content(&self, index: usize) -> Option<&C> {
        self.tabs.get(index).and_then(|t| t.content.as_ref())
    }

    /// Content of tab `index`, mutably
    pub fn content_mut(&mut self, index: usize) -> Option<&mut C> {
        self.tabs.get_mut(index).and_then(|t| t.content.as_mut())
    }

    /// Cached tab bar frame for the current offset
    pub const fn indicator(&self) -> &IndicatorFrame {
        &self.indicator
    }

    /// Dead zones for a pan starting now
    pub fn pan_activation(&self) -> PanActivation {
        PanActivation::for_tabs(self.platform, self.active_index == 0)
    }

    /// Event signal (mount and change notifications)
    pub const fn events(&self) -> &Signal<TabEvent> {
        &self.events
    }

    /// Subscribe to snapshots
    pub fn subscribe(&self) -> watch::Receiver<TabSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Tap on tab `index`: mount it now, tween to its page, make it active
    /// once the tween settles
    pub fn activate_tab(&mut self, index: usize, now: Instant) -> Result<(), TabError> {
        if index >= self.tabs.len() {
            let err = TabError::OutOfRange {
                index,
                len: self.tabs.len(),
            };
            tracing::error!(%err, "activate_tab");
            return Err(err);
        }
        self.tick(now);
        self.drag = None;
        self.mount(index);
        self.settle_to(index, false, now);
        Ok(())
    }

    /// Start a horizontal pan
    pub fn begin_drag(&mut self, now: Instant) {
        self.tick(now);
        let origin = self.offset.value();
        self.offset.set(origin);
        if self.pending.take().is_some() {
            // Grabbed mid-transition: the nearest page becomes active
            let nearest = ((origin / self.page_width).round() as usize).min(self.tabs.len() - 1);
            self.mount(nearest);
            self.set_active(nearest);
        }
        self.drag = Some(PanDrag { origin });
        self.refresh();
    }

    /// Follow a pan; `translation` is the horizontal travel since it began
    pub fn drag_to(&mut self, translation: f32) {
        let Some(drag) = self.drag else {
            return;
        };
        let offset = (drag.origin - translation).clamp(0.0, self.max_offset());
        self.offset.set(offset);
        self.refresh();
    }

    /// Release a pan with `velocity` (translation space, px/s); returns the
    /// page it settles on
    pub fn end_drag(&mut self, velocity: f32, now: Instant) -> usize {
        if self.drag.take().is_none() {
            return self.active_index;
        }
        let delta = self.offset.value() - self.page_offset(self.active_index);
        let target = resolve_release(
            delta,
            velocity,
            self.active_index,
            self.tabs.len(),
            self.page_width,
            &self.config,
        );
        tracing::debug!(delta, velocity, target, "tab pan released");
        self.settle_to(target, true, now);
        target
    }

    /// Advance the settle tween; returns `true` while it is in flight
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.offset.advance(now) {
            Advance::Settled => {
                if let Some(pending) = self.pending.take() {
                    if pending.mount_on_settle {
                        self.mount(pending.index);
                    }
                    self.set_active(pending.index);
                }
                self.refresh();
            }
            Advance::Running => self.refresh(),
            Advance::Idle => {}
        }
        self.offset.is_animating()
    }

    /// Relayout for a new page width; any transition completes immediately
    pub fn set_page_width(&mut self, page_width: f32) -> Result<(), TabError> {
        if !(page_width.is_finite() && page_width > 0.0) {
            return Err(TabError::InvalidPageWidth(page_width));
        }
        self.page_width = page_width;
        self.drag = None;
        if let Some(pending) = self.pending.take() {
            self.mount(pending.index);
            self.set_active(pending.index);
        }
        self.offset.set(self.page_offset(self.active_index));
        self.refresh();
        Ok(())
    }

    fn page_offset(&self, index: usize) -> f32 {
        index as f32 * self.page_width
    }

    fn settle_to(&mut self, index: usize, mount_on_settle: bool, now: Instant) {
        self.pending = Some(PendingSettle {
            index,
            mount_on_settle,
        });
        let target = self.page_offset(index);
        self.offset.animate_to(
            target,
            now,
            self.config.settle_duration(),
            Easing::EaseInOut,
        );
        self.refresh();
    }

    fn mount(&mut self, index: usize) {
        if self.tabs[index].mount() {
            tracing::debug!(index, title = %self.tabs[index].title, "tab mounted");
            self.events.publish(TabEvent::Mounted { index });
        }
    }

    fn set_active(&mut self, index: usize) {
        if index == self.active_index {
            return;
        }
        let from = self.active_index;
        self.active_index = index;
        self.events.publish(TabEvent::Changed { from, to: index });
    }

    fn refresh(&mut self) {
        let offset = self.offset.value();
        if offset.to_bits() != self.indicator_key.to_bits() {
            self.indicator = IndicatorFrame::compute(offset, self.page_width, self.tabs.len());
            self.indicator_key = offset;
        }
        self.snapshot_tx.send_replace(TabSnapshot {
            shared_offset: offset,
            active_index: self.active_index,
            dragging: self.drag.is_some(),
        });
    }
}
