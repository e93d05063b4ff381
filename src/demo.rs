//! In-memory feed source for the demo client
//!
//! Stands in for the remote API: serves cursor-paged posts and accepts or
//! rejects engagement mutations. Posts by `offline` always reject, so the
//! rollback path can be exercised by hand.

use anyhow::{Result, anyhow, bail};
use chrono::{Duration, Utc};

use crate::feed::{FeedPage, LoadRequest, PendingMutation};
use crate::models::Post;

/// Handle whose mutations are always rejected
pub const OFFLINE_HANDLE: &str = "offline";

const AUTHORS: &[(&str, &str)] = &[
    ("mira", "Mira Okafor"),
    ("jun", "Jun Takeda"),
    ("sol", "Sol Reyes"),
    (OFFLINE_HANDLE, "Offline Account"),
    ("ana", "Ana Lima"),
];

const LINES: &[&str] = &[
    "New mix is up, three hours of late-night jazz for the commute.",
    "Finished the sketch from yesterday's stream. Swipe for the lineart.",
    "Anyone else rewatching the trilogy this weekend?",
    "Shipping the new link-in-bio layout tonight. Feedback welcome!",
    "Coffee, rain, and a very long reading list.",
    "Drew a tiny fox. That's the post.",
    "Tour dates just dropped, see you in the front row.",
];

/// Deterministic demo feed
#[derive(Debug, Clone)]
pub struct DemoSource {
    posts: Vec<Post>,
}

impl DemoSource {
    /// Build a feed of `total` posts, newest first
    pub fn new(total: usize) -> Self {
        let now = Utc::now();
        let posts = (0..total)
            .map(|i| {
                let (handle, name) = AUTHORS[i % AUTHORS.len()];
                let mut post = Post::new(handle);
                post.author_name = name.to_string();
                post.content = LINES[i % LINES.len()].to_string();
                post.created_at = now - Duration::minutes((i * 17) as i64);
                post.like_count = ((i * 7) % 40) as u32;
                post.repost_count = ((i * 3) % 12) as u32;
                post.save_count = (i % 5) as u32;
                post.reply_count = ((i * 5) % 9) as u32;
                post
            })
            .collect();
        Self { posts }
    }

    /// Total number of posts
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Whether the source has no posts
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Serve the page described by `request`
    pub fn fetch(&self, request: &LoadRequest) -> Result<FeedPage> {
        let start = match request.cursor.as_deref() {
            None => 0,
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| anyhow!("Invalid cursor: {cursor}"))?,
        };
        if start > self.posts.len() {
            bail!("Cursor {start} past end of feed");
        }
        let end = (start + request.limit).min(self.posts.len());
        Ok(FeedPage {
            posts: self.posts[start..end].to_vec(),
            next_cursor: (end < self.posts.len()).then(|| end.to_string()),
        })
    }

    /// Accept or reject a mutation
    pub fn submit(&self, mutation: &PendingMutation) -> Result<()> {
        let post = self
            .posts
            .iter()
            .find(|p| p.id == mutation.post_id)
            .ok_or_else(|| anyhow!("Post not found"))?;
        if post.author_handle == OFFLINE_HANDLE {
            bail!("@{} is unreachable, {} not saved", post.author_handle, mutation.kind.name());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MutationKind;

    fn request(cursor: Option<&str>, limit: usize) -> LoadRequest {
        LoadRequest {
            cursor: cursor.map(String::from),
            limit,
            refresh: cursor.is_none(),
            generation: 0,
        }
    }

    #[test]
    fn test_paging_to_the_end() {
        let source = DemoSource::new(25);
        let first = source.fetch(&request(None, 10)).unwrap();
        assert_eq!(first.posts.len(), 10);
        assert_eq!(first.next_cursor.as_deref(), Some("10"));

        let last = source.fetch(&request(Some("20"), 10)).unwrap();
        assert_eq!(last.posts.len(), 5);
        assert!(last.next_cursor.is_none());

        assert!(source.fetch(&request(Some("nope"), 10)).is_err());
        assert!(source.fetch(&request(Some("99"), 10)).is_err());
    }

    #[test]
    fn test_offline_author_rejects() {
        let source = DemoSource::new(10);
        let page = source.fetch(&request(None, 10)).unwrap();
        let verdict = |post: &Post| {
            source.submit(&PendingMutation {
                post_id: post.id,
                kind: MutationKind::Like,
                previous_active: false,
                previous_count: 0,
            })
        };
        for post in &page.posts {
            assert_eq!(verdict(post).is_err(), post.author_handle == OFFLINE_HANDLE);
        }
    }
}
