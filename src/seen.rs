//! Dwell-time tracking for feed posts
//!
//! A post counts as seen once it has stayed the focused item for at least
//! `min_dwell`. Each post is reported at most once per tracker.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A post that stayed in focus long enough
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRecord {
    /// The post
    pub post_id: Uuid,
    /// How long it stayed focused
    pub dwell: Duration,
    /// When the dwell ended
    pub seen_at: DateTime<Utc>,
}

/// Tracks which post is focused and for how long
#[derive(Debug, Clone)]
pub struct SeenTracker {
    min_dwell: Duration,
    focused: Option<(Uuid, Instant)>,
    reported: HashSet<Uuid>,
    queue: Vec<SeenRecord>,
}

impl SeenTracker {
    /// Tracker reporting dwells of at least `min_dwell`
    pub fn new(min_dwell: Duration) -> Self {
        Self {
            min_dwell,
            focused: None,
            reported: HashSet::new(),
            queue: Vec::new(),
        }
    }

    /// Currently focused post
    pub fn focused(&self) -> Option<Uuid> {
        self.focused.map(|(id, _)| id)
    }

    /// Whether `id` has already been reported
    pub fn is_seen(&self, id: Uuid) -> bool {
        self.reported.contains(&id)
    }

    /// The focused post changed (or nothing is focused)
    pub fn focus(&mut self, post_id: Option<Uuid>, now: Instant) {
        if self.focused() == post_id {
            return;
        }
        self.close_dwell(now);
        self.focused = post_id.map(|id| (id, now));
    }

    /// End the current dwell, e.g. when the feed scrolls off screen
    pub fn flush(&mut self, now: Instant) {
        self.close_dwell(now);
        self.focused = None;
    }

    /// Take the queued records
    pub fn drain(&mut self) -> Vec<SeenRecord> {
        std::mem::take(&mut self.queue)
    }

    fn close_dwell(&mut self, now: Instant) {
        let Some((post_id, since)) = self.focused else {
            return;
        };
        let dwell = now.saturating_duration_since(since);
        if dwell < self.min_dwell || !self.reported.insert(post_id) {
            return;
        }
        tracing::debug!(post = %post_id, dwell_ms = dwell.as_millis(), "post seen");
        self.queue.push(SeenRecord {
            post_id,
            dwell,
            seen_at: Utc::now(),
        });
    }
}
