use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl FromStr for ThemeVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(format!("Invalid theme: {s}. Use 'dark' or 'light'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedTheme {
    pub variant: ThemeVariant,
    pub foreground: Color,
    pub foreground_dim: Color,
    pub border: Color,
    pub selection_bg: Color,
    pub primary: Color,
    pub success: Color,
    pub error: Color,
    pub post_author: Color,
    pub post_handle: Color,
    pub post_time: Color,
    pub post_media: Color,
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub spinner: Color,
}

impl ResolvedTheme {
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.foreground_dim)
    }

    pub fn active_tab_style(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn spinner_style(&self) -> Style {
        Style::default().fg(self.spinner)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .bg(self.status_bar_bg)
            .fg(self.status_bar_fg)
    }
}

pub fn default_for_variant(variant: ThemeVariant) -> ResolvedTheme {
    match variant {
        ThemeVariant::Dark => ResolvedTheme {
            variant,
            foreground: Color::White,
            foreground_dim: Color::Rgb(0x6A, 0x9A, 0x9A),
            border: Color::Rgb(0x6A, 0x9A, 0x9A),
            selection_bg: Color::DarkGray,
            primary: Color::Rgb(0x8C, 0x8D, 0xFF),
            success: Color::Green,
            error: Color::Red,
            post_author: Color::White,
            post_handle: Color::Cyan,
            post_time: Color::Rgb(0x6A, 0x9A, 0x9A),
            post_media: Color::Magenta,
            status_bar_bg: Color::Rgb(0x56, 0x3A, 0xCC),
            status_bar_fg: Color::White,
            spinner: Color::Yellow,
        },
        ThemeVariant::Light => ResolvedTheme {
            variant,
            foreground: Color::Black,
            foreground_dim: Color::Rgb(0x60, 0x60, 0x60),
            border: Color::Rgb(0x90, 0x90, 0x90),
            selection_bg: Color::Rgb(0xE0, 0xE0, 0xF0),
            primary: Color::Rgb(0x56, 0x3A, 0xCC),
            success: Color::Rgb(0x1A, 0x7F, 0x37),
            error: Color::Rgb(0xB0, 0x1E, 0x1E),
            post_author: Color::Black,
            post_handle: Color::Blue,
            post_time: Color::Rgb(0x60, 0x60, 0x60),
            post_media: Color::Magenta,
            status_bar_bg: Color::Rgb(0x56, 0x3A, 0xCC),
            status_bar_fg: Color::White,
            spinner: Color::Rgb(0xB0, 0x6A, 0x00),
        },
    }
}

/// Guesses the variant from the terminal background; dark when unknown.
pub fn detect_terminal_theme() -> ThemeVariant {
    match terminal_light::luma() {
        Ok(luma) if luma > 0.6 => ThemeVariant::Light,
        _ => ThemeVariant::Dark,
    }
}
