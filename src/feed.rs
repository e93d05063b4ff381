//! Paginated feed with optimistic engagement mutations
//!
//! The feed never talks to the network itself. Callers ask it what to load
//! (`begin_refresh` / `begin_load_more`), fetch elsewhere, and hand the page
//! back. Likes, reposts and saves flip locally first and are confirmed or
//! rolled back when the remote answer arrives.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::FeedConfig;
use crate::models::{MutationKind, Post};

/// One page of posts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage {
    /// Posts in display order
    pub posts: Vec<Post>,
    /// Cursor for the next page; `None` at the end of the feed
    pub next_cursor: Option<String>,
}

/// What the caller should fetch next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Cursor to resume from; `None` for the first page
    pub cursor: Option<String>,
    /// Page size
    pub limit: usize,
    /// Whether the result replaces the feed
    pub refresh: bool,
    /// Refresh generation the request belongs to
    pub generation: u64,
}

/// A locally applied mutation awaiting the remote answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMutation {
    /// Target post
    pub post_id: Uuid,
    /// Which engagement flipped
    pub kind: MutationKind,
    /// Flag value before the flip
    pub previous_active: bool,
    /// Counter value before the flip
    pub previous_count: u32,
}

impl PendingMutation {
    /// Whether this mutation turns the engagement on
    pub const fn activates(&self) -> bool {
        !self.previous_active
    }
}

/// Paginated feed state
#[derive(Debug, Clone)]
pub struct Feed {
    posts: Vec<Post>,
    next_cursor: Option<String>,
    has_more: bool,
    loading: bool,
    page_size: usize,
    end_reached_threshold: usize,
    generation: u64,
}

impl Feed {
    /// Empty feed that has not loaded anything yet
    pub const fn new(config: &FeedConfig) -> Self {
        Self {
            posts: Vec::new(),
            next_cursor: None,
            has_more: true,
            loading: false,
            page_size: config.page_size,
            end_reached_threshold: config.end_reached_threshold,
            generation: 0,
        }
    }

    /// Posts in display order
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Post by index
    pub fn get(&self, index: usize) -> Option<&Post> {
        self.posts.get(index)
    }

    /// Post by id
    pub fn find(&self, id: Uuid) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Number of loaded posts
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Whether nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Whether a request is in flight
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether more pages exist
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Start a refresh from the top; always allowed, supersedes paging
    ///
    /// Answers to requests issued before the refresh are ignored.
    pub fn begin_refresh(&mut self) -> LoadRequest {
        self.generation += 1;
        self.loading = true;
        LoadRequest {
            cursor: None,
            limit: self.page_size,
            refresh: true,
            generation: self.generation,
        }
    }

    /// Whether `request` was superseded by a later refresh
    pub const fn is_stale(&self, request: &LoadRequest) -> bool {
        request.generation != self.generation
    }

    /// Start loading the next page, unless one is in flight or the feed ended
    pub fn begin_load_more(&mut self) -> Option<LoadRequest> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        Some(LoadRequest {
            cursor: self.next_cursor.clone(),
            limit: self.page_size,
            refresh: false,
            generation: self.generation,
        })
    }

    /// Whether the list scrolled close enough to the end to page
    pub fn should_load_more(&self, visible_index: usize) -> bool {
        self.has_more
            && !self.loading
            && visible_index + self.end_reached_threshold >= self.posts.len()
    }

    /// Replace everything with a fresh first page
    pub fn replace(&mut self, page: FeedPage) {
        self.has_more = page.next_cursor.is_some();
        self.next_cursor = page.next_cursor;
        self.posts = page.posts;
        self.loading = false;
    }

    /// Append a page, skipping posts already present
    ///
    /// Returns how many posts were added.
    pub fn append(&mut self, page: FeedPage) -> usize {
        let before = self.posts.len();
        for post in page.posts {
            if !self.posts.iter().any(|p| p.id == post.id) {
                self.posts.push(post);
            }
        }
        self.has_more = page.next_cursor.is_some();
        self.next_cursor = page.next_cursor;
        self.loading = false;
        self.posts.len() - before
    }

    /// Apply a page from a finished request
    ///
    /// Pages from a superseded request are dropped and `0` is returned.
    pub fn apply(&mut self, request: &LoadRequest, page: FeedPage) -> usize {
        if self.is_stale(request) {
            tracing::debug!(
                generation = request.generation,
                current = self.generation,
                "stale feed page dropped"
            );
            return 0;
        }
        if request.refresh {
            self.replace(page);
            self.posts.len()
        } else {
            self.append(page)
        }
    }

    /// A request failed; allow retrying unless a newer one is in flight
    pub const fn fail_load(&mut self, request: &LoadRequest) {
        if !self.is_stale(request) {
            self.loading = false;
        }
    }

    /// Flip `kind` on post `id` locally
    pub fn toggle(&mut self, id: Uuid, kind: MutationKind) -> Option<PendingMutation> {
        let post = self.posts.iter_mut().find(|p| p.id == id)?;
        let (active, count) = post.engagement(kind);
        let next_count = if active {
            count.saturating_sub(1)
        } else {
            count.saturating_add(1)
        };
        post.set_engagement(kind, !active, next_count);
        Some(PendingMutation {
            post_id: id,
            kind,
            previous_active: active,
            previous_count: count,
        })
    }

    /// The remote side accepted the mutation
    pub fn confirm(&self, mutation: &PendingMutation) {
        tracing::debug!(post = %mutation.post_id, kind = mutation.kind.name(), "mutation confirmed");
    }

    /// The remote side rejected the mutation; restore the previous state
    ///
    /// Returns `false` when the post is no longer in the feed.
    pub fn rollback(&mut self, mutation: &PendingMutation) -> bool {
        let Some(post) = self.posts.iter_mut().find(|p| p.id == mutation.post_id) else {
            return false;
        };
        post.set_engagement(
            mutation.kind,
            mutation.previous_active,
            mutation.previous_count,
        );
        tracing::warn!(post = %mutation.post_id, kind = mutation.kind.name(), "mutation rolled back");
        true
    }
}
