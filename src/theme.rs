//! Theme configuration and colors.
//!
//! Palettes come from the `ratatui-themes` crate; this module adds the
//! styles the feed, the sheet and the tab bar draw with.

use ratatui::style::{Color, Modifier, Style};
use ratatui_themes::{ThemeName, ThemePalette};
use serde::{Deserialize, Serialize};

/// Theme wrapper around `ThemeName` from ratatui-themes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(pub ThemeName);

impl Theme {
    /// Get the next theme in rotation
    #[must_use]
    pub fn next(&self) -> Self {
        Self(self.0.next())
    }

    /// Get the display name for the theme.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0.display_name()
    }

    /// Get the color palette for this theme
    #[must_use]
    pub fn colors(&self) -> ThemeColors {
        ThemeColors::from_palette(self.0.palette())
    }
}

impl From<ThemeName> for Theme {
    fn from(name: ThemeName) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Extended color palette for UI elements.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    /// Primary background color
    pub bg: Color,
    /// Secondary background for the sheet and status bar
    pub bg_secondary: Color,
    /// Primary foreground/text color
    pub fg: Color,
    /// Muted text color
    pub fg_muted: Color,
    /// Primary accent color
    pub primary: Color,
    /// Secondary accent color
    pub secondary: Color,
    /// Error state color (red)
    pub error: Color,
    /// Info state color (blue)
    pub info: Color,
    /// Success state color (green)
    pub success: Color,
    /// Border color (unfocused)
    pub border: Color,
    /// Selection/highlight background
    pub selection: Color,
}

impl ThemeColors {
    /// Create `ThemeColors` from a `ThemePalette`
    #[must_use]
    pub fn from_palette(p: ThemePalette) -> Self {
        Self {
            bg: p.bg,
            bg_secondary: Self::lighten(p.bg, 10),
            fg: p.fg,
            fg_muted: p.muted,
            primary: p.accent,
            secondary: p.secondary,
            error: p.error,
            info: p.info,
            success: p.success,
            border: p.muted,
            selection: p.selection,
        }
    }

    fn lighten(color: Color, amount: u8) -> Color {
        if let Color::Rgb(r, g, b) = color {
            Color::Rgb(
                r.saturating_add(amount),
                g.saturating_add(amount),
                b.saturating_add(amount),
            )
        } else {
            color
        }
    }

    /// Header tint for tab `index` of a sheet menu
    #[must_use]
    pub fn tab_tint(&self, index: usize) -> Color {
        match index % 3 {
            0 => self.primary,
            1 => self.info,
            _ => self.secondary,
        }
    }

    /// Default text style
    #[must_use]
    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    /// Muted text style
    #[must_use]
    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.fg_muted)
    }

    /// Primary accent style
    #[must_use]
    pub fn text_primary(&self) -> Style {
        Style::default().fg(self.primary)
    }

    /// Secondary accent style
    #[must_use]
    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    /// Success style
    #[must_use]
    pub fn text_success(&self) -> Style {
        Style::default().fg(self.success)
    }

    /// Error style
    #[must_use]
    pub fn text_error(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Block border style
    #[must_use]
    pub fn block(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Selected item style
    #[must_use]
    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(self.fg)
            .add_modifier(Modifier::BOLD)
    }

    /// Default sheet container style
    #[must_use]
    pub fn sheet(&self) -> Style {
        Style::default().bg(self.bg_secondary).fg(self.fg)
    }

    /// Default backdrop behind an open sheet
    #[must_use]
    pub fn backdrop(&self) -> Style {
        Style::default().fg(self.fg_muted).add_modifier(Modifier::DIM)
    }

    /// Tab label style for a label at `opacity` in `[0.5, 1.0]`
    #[must_use]
    pub fn tab_label(&self, opacity: f32) -> Style {
        if opacity >= 0.9 {
            Style::default()
                .fg(self.primary)
                .add_modifier(Modifier::BOLD)
        } else if opacity >= 0.7 {
            Style::default().fg(self.fg)
        } else {
            Style::default().fg(self.fg_muted)
        }
    }

    /// Key hint style (for shortcuts)
    #[must_use]
    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.secondary)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_label_steps() {
        let colors = Theme::default().colors();
        assert_eq!(colors.tab_label(1.0).fg, Some(colors.primary));
        assert_eq!(colors.tab_label(0.75).fg, Some(colors.fg));
        assert_eq!(colors.tab_label(0.5).fg, Some(colors.fg_muted));
    }

    #[test]
    fn test_theme_cycles() {
        let theme = Theme::default();
        assert_ne!(theme.next(), theme);
    }
}
