//! Sheet content used by the demo client

use anyhow::Result;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::TabsConfig;
use crate::gesture::Platform;
use crate::models::Post;
use crate::tabs::{TabCoordinator, TabEvent, TabSpec};

/// Whatever is mounted in the sheet
pub enum SheetBody {
    /// Per-post menu with swipeable tabs
    PostMenu(PostMenu),
    /// A one-off message (mutation failures and the like)
    Notice(Notice),
}

/// A plain message shown in the sheet
#[derive(Debug, Clone)]
pub struct Notice {
    /// Heading
    pub title: String,
    /// Body text
    pub body: String,
}

/// One page of the post menu
#[derive(Debug, Clone, Default)]
pub struct MenuPage {
    /// Rendered lines
    pub lines: Vec<String>,
}

/// Post menu: Actions / Share / About tabs for one post
pub struct PostMenu {
    /// Post the menu was opened for
    pub post_id: Uuid,
    /// Tab group
    pub tabs: TabCoordinator<MenuPage>,
    /// Tab events, drained by the app each frame
    pub events: broadcast::Receiver<TabEvent>,
}

impl PostMenu {
    /// Build the menu for `post`; pages are built on first activation
    pub fn new(
        post: &Post,
        page_width: f32,
        config: TabsConfig,
        platform: Platform,
    ) -> Result<Self> {
        let actions = post.clone();
        let share = post.clone();
        let about = post.clone();

        let specs = vec![
            TabSpec::new("Actions", move || MenuPage {
                lines: vec![
                    format!(
                        "[L] {}  ♥ {}",
                        if actions.liked { "Unlike" } else { "Like" },
                        actions.like_count
                    ),
                    format!(
                        "[R] {}  🔁 {}",
                        if actions.reposted { "Undo repost" } else { "Repost" },
                        actions.repost_count
                    ),
                    format!(
                        "[S] {}  🔖 {}",
                        if actions.saved { "Unsave" } else { "Save" },
                        actions.save_count
                    ),
                ],
            }),
            TabSpec::new("Share", move || MenuPage {
                lines: vec![
                    format!("Link: https://nestle.example/p/{}", share.id),
                    format!("Mention: @{}", share.author_handle),
                ],
            }),
            TabSpec::new("About", move || MenuPage {
                lines: vec![
                    format!("{} (@{})", about.author_name, about.author_handle),
                    format!("Posted {} ago", about.relative_time()),
                    format!("💬 {} replies", about.reply_count),
                ],
            })
            .on_activate(|| tracing::debug!("about tab opened")),
        ];

        let tabs = TabCoordinator::new(specs, 0, page_width, config, platform)?;
        let events = tabs.events().subscribe();
        Ok(Self {
            post_id: post.id,
            tabs,
            events,
        })
    }
}
