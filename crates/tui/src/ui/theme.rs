//! Terminal colors and palette density.
//!
//! Colors come from one of two bundled palettes selected by
//! [`THEME_ENV`]. Density follows the palette theme chosen in the palette
//! settings: a theme whose name contains `Spacious` pads rows apart.

use std::env;

use ratatui::style::{Color, Modifier, Style};
use tracing::debug;

use notepal_util::last_path_segment;

/// Environment variable choosing the color palette (`dracula` or `nord`).
pub const THEME_ENV: &str = "NOTEPAL_TUI_THEME";

/// Semantic color roles used by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRoles {
    pub background: Color,
    pub surface: Color,
    pub border: Color,
    pub text: Color,
    pub text_muted: Color,
    pub accent: Color,
    pub focus: Color,
    pub error: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub roles: ThemeRoles,
}

impl Theme {
    pub fn dracula() -> Self {
        Self {
            name: "dracula",
            roles: ThemeRoles {
                background: Color::Rgb(0x28, 0x2A, 0x36),
                surface: Color::Rgb(0x28, 0x2A, 0x36),
                border: Color::Rgb(0x44, 0x47, 0x5A),
                text: Color::Rgb(0xF8, 0xF8, 0xF2),
                text_muted: Color::Rgb(0x62, 0x72, 0xA4),
                accent: Color::Rgb(0xFF, 0x79, 0xC6),
                focus: Color::Rgb(0x8B, 0xE9, 0xFD),
                error: Color::Rgb(0xFF, 0x55, 0x55),
                selection_bg: Color::Rgb(0x44, 0x47, 0x5A),
                selection_fg: Color::Rgb(0xF8, 0xF8, 0xF2),
            },
        }
    }

    pub fn nord() -> Self {
        Self {
            name: "nord",
            roles: ThemeRoles {
                background: Color::Rgb(0x2E, 0x34, 0x40),
                surface: Color::Rgb(0x3B, 0x42, 0x52),
                border: Color::Rgb(0x4C, 0x56, 0x6A),
                text: Color::Rgb(0xEC, 0xEF, 0xF4),
                text_muted: Color::Rgb(0xD8, 0xDE, 0xE9),
                accent: Color::Rgb(0x88, 0xC0, 0xD0),
                focus: Color::Rgb(0x8F, 0xBC, 0xBB),
                error: Color::Rgb(0xBF, 0x61, 0x6A),
                selection_bg: Color::Rgb(0x43, 0x4C, 0x5E),
                selection_fg: Color::Rgb(0xE5, 0xE9, 0xF0),
            },
        }
    }

    /// Resolve a palette by name, case-insensitively.
    pub fn resolve(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dracula" => Some(Self::dracula()),
            "nord" => Some(Self::nord()),
            _ => None,
        }
    }

    /// Palette from [`THEME_ENV`], falling back to Dracula.
    pub fn load() -> Self {
        if let Ok(name) = env::var(THEME_ENV)
            && let Some(theme) = Self::resolve(&name)
        {
            debug!(theme = theme.name, "Using theme from environment");
            return theme;
        }
        Self::dracula()
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.roles.text)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.roles.text_muted)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.roles.accent).add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.roles.error)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        let color = if focused { self.roles.focus } else { self.roles.border };
        Style::default().fg(color)
    }

    pub fn panel_style(&self) -> Style {
        Style::default().bg(self.roles.surface).fg(self.roles.text)
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .fg(self.roles.selection_fg)
            .bg(self.roles.selection_bg)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dracula()
    }
}

/// Row spacing of the palette overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaletteDensity {
    #[default]
    Compact,
    Spacious,
}

impl PaletteDensity {
    /// Density implied by the title of the configured palette theme.
    pub fn from_palette_theme(title: &str) -> Self {
        if last_path_segment(title).to_ascii_lowercase().contains("spacious") {
            Self::Spacious
        } else {
            Self::Compact
        }
    }

    /// Terminal lines each result row occupies.
    pub fn row_height(self) -> u16 {
        match self {
            Self::Compact => 1,
            Self::Spacious => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_case_insensitive() {
        assert_eq!(Theme::resolve(" Nord ").map(|theme| theme.name), Some("nord"));
        assert!(Theme::resolve("solarized").is_none());
    }

    #[test]
    fn density_follows_palette_theme_title() {
        assert_eq!(
            PaletteDensity::from_palette_theme("$:/plugins/linonetwo/commandpalette/Spacious.css"),
            PaletteDensity::Spacious
        );
        assert_eq!(
            PaletteDensity::from_palette_theme("$:/plugins/linonetwo/commandpalette/Compact.css"),
            PaletteDensity::Compact
        );
    }
}
