//! # Nestle 🪺
//!
//! Bottom-sheet and swipe-tab interaction core for a social client.
//!
//! ## Overview
//!
//! Nestle owns the single bottom sheet an app shows over its main screen and
//! the horizontally swipeable tab pagers that live inside it. Both are plain
//! state machines driven by explicit `Instant`s, so they run the same under a
//! terminal event loop as under a test.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          App                                │
//! │  Feed list, post menu sheet, input and the main event loop  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │      Sheet      │ │      Tabs       │ │      Feed       │
//! │                 │ │                 │ │                 │
//! │ • Open / close  │ │ • Shared offset │ │ • Paging        │
//! │ • Content swap  │ │ • Lazy mounting │ │ • Optimistic    │
//! │ • Drag dismiss  │ │ • Indicator     │ │   mutations     │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │                   │
//!          └───────────────────┴───────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Motion      │ │     Gesture     │ │     Config      │
//! │                 │ │                 │ │                 │
//! │ • Tweens        │ │ • Dead zones    │ │ • Load/Save     │
//! │ • Easing        │ │ • Velocity      │ │ • Platform      │
//! │                 │ │ • Platform      │ │ • Theme         │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`app`]: TUI application state and event loop
//! - [`config`]: Configuration management
//! - [`demo`]: In-memory feed source
//! - [`error`]: Typed errors for the sheet and tab APIs
//! - [`feed`]: Paged feed with optimistic engagement
//! - [`gesture`]: Viewport, platform profile and pan arbitration
//! - [`models`]: Data models (Post)
//! - [`motion`]: Time-driven tweens
//! - [`seen`]: Dwell-time tracking
//! - [`sheet`]: Bottom sheet controller and its command handle
//! - [`signal`]: Broadcast notifications
//! - [`tabs`]: Swipe tab coordinator
//! - [`theme`]: Theme support via ratatui-themes
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Instant;
//! use nestle::config::SheetConfig;
//! use nestle::gesture::{Platform, Viewport};
//! use nestle::sheet::{SheetController, SheetHost};
//!
//! let controller: SheetController<String> =
//!     SheetController::new(Viewport::new(400.0, 800.0), SheetConfig::default(), Platform::Ios);
//! let (mut host, handle) = SheetHost::new(controller);
//!
//! handle.set_content(|| "Hello".to_string())?;
//! handle.open()?;
//! host.pump(Instant::now());
//! assert!(host.controller().is_open());
//! # Ok::<(), nestle::SheetError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/nestle/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::similar_names)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::return_self_not_must_use)]

pub mod app;
pub mod config;
pub mod demo;
pub mod error;
pub mod feed;
pub mod gesture;
pub mod models;
pub mod motion;
pub mod seen;
pub mod sheet;
pub mod signal;
pub mod tabs;
pub mod theme;

// Re-export main types for convenience
pub use app::AppState;
pub use config::Config;
pub use error::{SheetError, TabError};
pub use models::{MutationKind, Post};
pub use sheet::{SheetController, SheetHandle, SheetHost, SheetProvider};
pub use tabs::{TabCoordinator, TabSpec};
pub use theme::{Theme, ThemeColors};

// Re-export theme types from ratatui-themes crate
pub use ratatui_themes::{ThemeName, ThemePalette};

/// ASCII logo for the application
pub const LOGO: &str = r"
    _   __          __  __
   / | / /__  _____/ /_/ /__
  /  |/ / _ \/ ___/ __/ / _ \
 / /|  /  __(__  ) /_/ /  __/
/_/ |_/\___/____/\__/_/\___/
";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
