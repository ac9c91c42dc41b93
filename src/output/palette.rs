//! Explicit colour configuration for text output.

use crate::model::Status;
use crossterm::style::{Color, Stylize};

/// Colours per role, or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub enabled: bool,
    pub header: Color,
    pub label: Color,
    pub good: Color,
    pub warn: Color,
    pub bad: Color,
    pub dim: Color,
    pub value: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            enabled: true,
            header: Color::Cyan,
            label: Color::Yellow,
            good: Color::Green,
            warn: Color::Yellow,
            bad: Color::Red,
            dim: Color::DarkGrey,
            value: Color::White,
        }
    }
}

impl Palette {
    /// Default colours, switched on or off.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// No colours.
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Colour `s` if colours are enabled.
    pub fn paint(&self, s: &str, color: Color) -> String {
        if self.enabled {
            s.with(color).to_string()
        } else {
            s.to_string()
        }
    }

    /// Bold and coloured section heading.
    pub fn heading(&self, s: &str) -> String {
        if self.enabled {
            s.with(self.label).bold().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(s, self.dim)
    }

    pub fn value(&self, s: &str) -> String {
        self.paint(s, self.value)
    }

    pub fn bad(&self, s: &str) -> String {
        self.paint(s, self.bad)
    }

    /// Green for BEST, yellow for one extra hop, red for two.
    pub fn status_color(&self, status: Status) -> Color {
        match status {
            Status::Best => self.good,
            Status::Hub | Status::Chipset => self.warn,
            Status::ChipsetHub => self.bad,
        }
    }

    pub fn status(&self, status: Status, s: &str) -> String {
        self.paint(s, self.status_color(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_palette_leaves_text_alone() {
        let palette = Palette::plain();
        assert_eq!(palette.paint("BEST", Color::Green), "BEST");
        assert_eq!(palette.heading("DEVICES"), "DEVICES");
        assert_eq!(palette.status(Status::ChipsetHub, "x"), "x");
    }

    #[test]
    fn test_status_colors() {
        let palette = Palette::default();
        assert_eq!(palette.status_color(Status::Best), Color::Green);
        assert_eq!(palette.status_color(Status::Hub), Color::Yellow);
        assert_eq!(palette.status_color(Status::Chipset), Color::Yellow);
        assert_eq!(palette.status_color(Status::ChipsetHub), Color::Red);
    }
}
