//! Command channel between feature code and the sheet owner
//!
//! Feature code holds a cloneable [`SheetHandle`] and fires commands; the UI
//! loop owns the [`SheetHost`] and applies them in issue order once per frame.
//! A [`SheetProvider`] is the injectable slot a host is installed into.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use ratatui::style::Style;
use tokio::sync::mpsc;

use super::controller::{ContentProducer, SheetController};
use crate::error::SheetError;

/// Commands sent from feature code to the sheet owner
pub enum SheetCommand<C> {
    /// Slide the sheet up
    Open,
    /// Slide the sheet down and clear it
    Close,
    /// Replace the content
    SetContent(ContentProducer<C>),
    /// Replace the container style override
    SetStyle(Option<Style>),
    /// Replace the backdrop style override
    SetBackgroundStyle(Option<Style>),
    /// Allow inner content to capture vertical drags
    SetInteractiveScroll(bool),
}

impl<C> fmt::Debug for SheetCommand<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("Open"),
            Self::Close => f.write_str("Close"),
            Self::SetContent(_) => f.write_str("SetContent(..)"),
            Self::SetStyle(style) => f.debug_tuple("SetStyle").field(style).finish(),
            Self::SetBackgroundStyle(style) => {
                f.debug_tuple("SetBackgroundStyle").field(style).finish()
            }
            Self::SetInteractiveScroll(on) => {
                f.debug_tuple("SetInteractiveScroll").field(on).finish()
            }
        }
    }
}

/// Cloneable control surface for the sheet
pub struct SheetHandle<C> {
    cmd_tx: mpsc::UnboundedSender<SheetCommand<C>>,
}

impl<C> Clone for SheetHandle<C> {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
        }
    }
}

impl<C> fmt::Debug for SheetHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetHandle")
            .field("closed", &self.cmd_tx.is_closed())
            .finish()
    }
}

impl<C> SheetHandle<C> {
    fn send(&self, cmd: SheetCommand<C>) -> Result<(), SheetError> {
        self.cmd_tx.send(cmd).map_err(|e| {
            tracing::error!(command = ?e.0, "sheet host dropped");
            SheetError::Detached
        })
    }

    /// Show the sheet
    pub fn open(&self) -> Result<(), SheetError> {
        self.send(SheetCommand::Open)
    }

    /// Hide the sheet
    pub fn close(&self) -> Result<(), SheetError> {
        self.send(SheetCommand::Close)
    }

    /// Replace the content; `producer` runs on the owner when the swap applies
    pub fn set_content<F>(&self, producer: F) -> Result<(), SheetError>
    where
        F: FnOnce() -> C + Send + 'static,
    {
        self.send(SheetCommand::SetContent(Box::new(producer)))
    }

    /// Replace the container style override
    pub fn set_style(&self, style: Option<Style>) -> Result<(), SheetError> {
        self.send(SheetCommand::SetStyle(style))
    }

    /// Replace the backdrop style override
    pub fn set_background_style(&self, style: Option<Style>) -> Result<(), SheetError> {
        self.send(SheetCommand::SetBackgroundStyle(style))
    }

    /// Allow or forbid inner content to capture vertical drags
    pub fn set_interactive_scroll(&self, enabled: bool) -> Result<(), SheetError> {
        self.send(SheetCommand::SetInteractiveScroll(enabled))
    }
}

/// The single writer of a sheet: owns the controller and its command queue
pub struct SheetHost<C> {
    controller: SheetController<C>,
    cmd_rx: mpsc::UnboundedReceiver<SheetCommand<C>>,
}

impl<C> fmt::Debug for SheetHost<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetHost")
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl<C> SheetHost<C> {
    /// Mount `controller`, returning the host and a handle to it
    pub fn new(controller: SheetController<C>) -> (Self, SheetHandle<C>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        (Self { controller, cmd_rx }, SheetHandle { cmd_tx })
    }

    /// Shared view of the controller
    pub const fn controller(&self) -> &SheetController<C> {
        &self.controller
    }

    /// Direct access for the owner (gestures, content state)
    pub const fn controller_mut(&mut self) -> &mut SheetController<C> {
        &mut self.controller
    }

    /// Apply every queued command in order, then advance animations
    ///
    /// Returns the number of commands applied.
    pub fn pump(&mut self, now: Instant) -> usize {
        let mut applied = 0;
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            tracing::trace!(?cmd, "sheet command");
            self.apply(cmd, now);
            applied += 1;
        }
        self.controller.tick(now);
        applied
    }

    fn apply(&mut self, cmd: SheetCommand<C>, now: Instant) {
        let sheet = &mut self.controller;
        match cmd {
            SheetCommand::Open => sheet.open(now),
            SheetCommand::Close => sheet.close(now),
            SheetCommand::SetContent(producer) => sheet.set_content(producer, now),
            SheetCommand::SetStyle(style) => sheet.set_style(style),
            SheetCommand::SetBackgroundStyle(style) => sheet.set_background_style(style),
            SheetCommand::SetInteractiveScroll(on) => sheet.set_interactive_scroll(on),
        }
    }
}

/// Injectable slot holding the app's sheet handle
///
/// Created empty at the app root and handed to features; the sheet host
/// installs its handle once when it mounts.
pub struct SheetProvider<C> {
    slot: Arc<OnceLock<SheetHandle<C>>>,
}

impl<C> Clone for SheetProvider<C> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<C> Default for SheetProvider<C> {
    fn default() -> Self {
        Self {
            slot: Arc::new(OnceLock::new()),
        }
    }
}

impl<C> fmt::Debug for SheetProvider<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetProvider")
            .field("installed", &self.is_installed())
            .finish()
    }
}

impl<C> SheetProvider<C> {
    /// Empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the handle of the mounted sheet host
    pub fn install(&self, handle: SheetHandle<C>) -> Result<(), SheetError> {
        self.slot.set(handle).map_err(|_| {
            tracing::error!("sheet controller installed twice");
            SheetError::AlreadyInstalled
        })
    }

    /// Whether a sheet host has been installed
    pub fn is_installed(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The installed handle
    pub fn get(&self) -> Result<&SheetHandle<C>, SheetError> {
        self.slot.get().ok_or_else(|| {
            tracing::error!("sheet used before the host was mounted");
            SheetError::NotInstalled
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetConfig;
    use crate::gesture::{Platform, Viewport};
    use crate::sheet::SheetPhase;
    use ratatui::style::Color;
    use std::time::Duration;

    fn host() -> (SheetHost<String>, SheetHandle<String>) {
        SheetHost::new(SheetController::new(
            Viewport::new(400.0, 800.0),
            SheetConfig::default(),
            Platform::Ios,
        ))
    }

    #[test]
    fn test_uninstalled_provider_is_an_error() {
        let provider = SheetProvider::<String>::new();
        assert_eq!(provider.get().unwrap_err(), SheetError::NotInstalled);
    }

    #[test]
    fn test_install_once() {
        let (_host, handle) = host();
        let provider = SheetProvider::new();
        provider.install(handle.clone()).unwrap();
        assert!(provider.clone().is_installed());
        assert_eq!(
            provider.install(handle).unwrap_err(),
            SheetError::AlreadyInstalled
        );
    }

    #[test]
    fn test_commands_apply_in_order() {
        let t0 = Instant::now();
        let (mut host, handle) = host();
        let provider = SheetProvider::new();
        provider.install(handle).unwrap();

        let sheet = provider.get().unwrap();
        sheet.set_content(|| "share".to_string()).unwrap();
        sheet
            .set_style(Some(ratatui::style::Style::default().bg(Color::Red)))
            .unwrap();
        sheet.open().unwrap();
        sheet.close().unwrap();

        assert_eq!(host.pump(t0), 4);
        assert_eq!(host.controller().phase(), SheetPhase::Closing);
        host.pump(t0 + Duration::from_millis(200));
        assert!(!host.controller().is_open());
        assert!(host.controller().content().is_none());
        assert!(host.controller().style().is_none());
    }

    #[test]
    fn test_detached_handle() {
        let (host, handle) = host();
        drop(host);
        assert_eq!(handle.open().unwrap_err(), SheetError::Detached);
    }
}
