//! Centralized color theme for the TUI.
//!
//! Defines a `Theme` struct with named color slots for every semantic role on
//! the create-todo screen. Two palettes are provided, light (the default card look) and dark,
//! and Ctrl+T switches between them.

use ratatui::style::Color;

/// Which palette is currently active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeMode {
    Dark,
    Light,
}

/// A complete color palette for the screen.
///
/// Every color used by the UI is looked up here; there are no hardcoded `Color::*`
/// constants elsewhere in the codebase.
#[derive(Debug, Clone)]
pub struct Theme {
    pub mode: ThemeMode,

    // ── Card ─────────────────────────────────────────────────────────────
    pub bg: Color,
    pub card_bg: Color,
    pub border: Color,
    pub title: Color,

    // ── Form fields ──────────────────────────────────────────────────────
    pub label: Color,
    pub label_focused: Color,
    pub input_text: Color,
    pub placeholder: Color,

    // ── Switch ───────────────────────────────────────────────────────────
    pub switch_on: Color,
    pub switch_off: Color,

    // ── Buttons ──────────────────────────────────────────────────────────
    pub button_bg: Color,
    pub button_create_bg: Color,
    pub button_text: Color,
    pub button_disabled_text: Color,

    // ── Status / hints ───────────────────────────────────────────────────
    pub error: Color,
    pub hint_key: Color,
    pub hint_text: Color,
}

impl Theme {
    /// Light theme: the default card look, white card, blue primary button.
    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,

            bg: Color::Rgb(245, 245, 245),
            card_bg: Color::Rgb(255, 255, 255),
            border: Color::Rgb(221, 221, 221),
            title: Color::Rgb(51, 51, 51),

            label: Color::Rgb(85, 85, 85),
            label_focused: Color::Rgb(52, 152, 219),
            input_text: Color::Rgb(51, 51, 51),
            placeholder: Color::Rgb(160, 160, 160),

            switch_on: Color::Rgb(52, 152, 219),
            switch_off: Color::Rgb(180, 180, 180),

            button_bg: Color::Rgb(149, 165, 166),
            button_create_bg: Color::Rgb(52, 152, 219),
            button_text: Color::Rgb(255, 255, 255),
            button_disabled_text: Color::Rgb(210, 215, 215),

            error: Color::Rgb(231, 76, 60),
            hint_key: Color::Rgb(30, 140, 30),
            hint_text: Color::Rgb(140, 140, 140),
        }
    }

    /// Dark theme: terminal-friendly greys with the same blue accent.
    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,

            bg: Color::Rgb(24, 26, 30),
            card_bg: Color::Rgb(34, 37, 43),
            border: Color::Rgb(80, 86, 96),
            title: Color::Rgb(230, 230, 230),

            label: Color::Rgb(170, 170, 175),
            label_focused: Color::Rgb(129, 176, 255),
            input_text: Color::Rgb(220, 220, 220),
            placeholder: Color::Rgb(100, 100, 110),

            switch_on: Color::Rgb(129, 176, 255),
            switch_off: Color::Rgb(90, 90, 100),

            button_bg: Color::Rgb(90, 100, 102),
            button_create_bg: Color::Rgb(52, 152, 219),
            button_text: Color::Rgb(255, 255, 255),
            button_disabled_text: Color::Rgb(150, 155, 160),

            error: Color::Rgb(255, 110, 95),
            hint_key: Color::Rgb(140, 200, 140),
            hint_text: Color::Rgb(120, 115, 130),
        }
    }

    /// Toggle between dark and light palettes.
    pub fn toggle(&mut self) {
        *self = match self.mode {
            ThemeMode::Dark => Self::light(),
            ThemeMode::Light => Self::dark(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_mode() {
        let mut theme = Theme::light();
        theme.toggle();
        assert_eq!(theme.mode, ThemeMode::Dark);
        theme.toggle();
        assert_eq!(theme.mode, ThemeMode::Light);
    }
}
