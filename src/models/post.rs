//! Post model as rendered in the feed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use uuid::Uuid;

/// A feed post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post ID
    pub id: Uuid,
    /// Author handle
    pub author_handle: String,
    /// Author display name
    pub author_name: String,
    /// Post text
    pub content: String,
    /// When the post was created
    pub created_at: DateTime<Utc>,
    /// Number of likes
    pub like_count: u32,
    /// Number of reposts
    pub repost_count: u32,
    /// Number of saves
    pub save_count: u32,
    /// Number of replies
    pub reply_count: u32,
    /// Whether the current user has liked this post
    pub liked: bool,
    /// Whether the current user has reposted this post
    pub reposted: bool,
    /// Whether the current user has saved this post
    pub saved: bool,
}

/// Toggleable engagement on a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// Like / unlike
    Like,
    /// Repost / undo repost
    Repost,
    /// Save / unsave
    Save,
}

impl MutationKind {
    /// Label for status messages
    pub const fn name(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Repost => "repost",
            Self::Save => "save",
        }
    }
}

impl Post {
    /// Create an empty post by `author_handle`
    pub fn new(author_handle: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_handle: author_handle.to_string(),
            author_name: String::new(),
            content: String::new(),
            created_at: Utc::now(),
            like_count: 0,
            repost_count: 0,
            save_count: 0,
            reply_count: 0,
            liked: false,
            reposted: false,
            saved: false,
        }
    }

    /// Flag and counter for `kind`
    pub const fn engagement(&self, kind: MutationKind) -> (bool, u32) {
        match kind {
            MutationKind::Like => (self.liked, self.like_count),
            MutationKind::Repost => (self.reposted, self.repost_count),
            MutationKind::Save => (self.saved, self.save_count),
        }
    }

    /// Overwrite the flag and counter for `kind`
    pub const fn set_engagement(&mut self, kind: MutationKind, active: bool, count: u32) {
        let (flag, counter) = match kind {
            MutationKind::Like => (&mut self.liked, &mut self.like_count),
            MutationKind::Repost => (&mut self.reposted, &mut self.repost_count),
            MutationKind::Save => (&mut self.saved, &mut self.save_count),
        };
        *flag = active;
        *counter = count;
    }

    /// Get a short preview of the content (for list display)
    ///
    /// Fits within `max_width` terminal columns; wide glyphs count double.
    pub fn preview(&self, max_width: usize) -> String {
        let content = self.content.replace('\n', " ");
        if content.width() <= max_width {
            return content;
        }
        let budget = max_width.saturating_sub(3);
        let mut used = 0;
        let cut: String = content
            .chars()
            .take_while(|c| {
                used += c.width().unwrap_or(0);
                used <= budget
            })
            .collect();
        format!("{cut}...")
    }

    /// Get relative time string (e.g., "5m", "2h", "3d")
    pub fn relative_time(&self) -> String {
        let duration = Utc::now().signed_duration_since(self.created_at);

        if duration.num_seconds() < 60 {
            format!("{}s", duration.num_seconds().max(0))
        } else if duration.num_minutes() < 60 {
            format!("{}m", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h", duration.num_hours())
        } else if duration.num_days() < 7 {
            format!("{}d", duration.num_days())
        } else {
            self.created_at.format("%b %d").to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_preview_is_char_safe() {
        let mut post = Post::new("ana");
        post.content = "héllo wörld, this is long".to_string();
        assert_eq!(post.preview(8), "héllo...");
        assert_eq!(post.preview(100), "héllo wörld, this is long");
    }

    #[test]
    fn test_preview_counts_wide_glyphs() {
        let mut post = Post::new("ana");
        post.content = "🦊🦊🦊🦊 fox".to_string();
        assert_eq!(post.preview(7), "🦊🦊...");
    }

    #[test]
    fn test_relative_time() {
        let mut post = Post::new("ana");
        post.created_at = Utc::now() - Duration::minutes(5);
        assert_eq!(post.relative_time(), "5m");
        post.created_at = Utc::now() - Duration::hours(3);
        assert_eq!(post.relative_time(), "3h");
    }

    #[test]
    fn test_engagement_accessors() {
        let mut post = Post::new("ana");
        post.set_engagement(MutationKind::Save, true, 4);
        assert_eq!(post.engagement(MutationKind::Save), (true, 4));
        assert_eq!(post.engagement(MutationKind::Like), (false, 0));
    }
}
