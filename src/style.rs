use std::fmt::Display;

use termion::color;

use crate::config::ColorMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Red,
    Green,
    Yellow,
    Purple,
    Cyan,
}

/// Wraps text in ANSI color sequences when the terminal supports them.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(mode: ColorMode) -> Self {
        let enabled = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => termion::is_tty(&std::io::stdout()),
        };

        Self { enabled }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn paint(&self, text: impl Display, tint: Tint) -> String {
        if !self.enabled {
            return text.to_string();
        }

        let reset = color::Fg(color::Reset);
        match tint {
            Tint::Red => format!("{}{text}{reset}", color::Fg(color::Red)),
            Tint::Green => format!("{}{text}{reset}", color::Fg(color::Green)),
            Tint::Yellow => format!("{}{text}{reset}", color::Fg(color::Yellow)),
            Tint::Purple => format!("{}{text}{reset}", color::Fg(color::Magenta)),
            Tint::Cyan => format!("{}{text}{reset}", color::Fg(color::Cyan)),
        }
    }
}
