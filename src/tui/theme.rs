// Theme for the TUI
//
// Colors for every UI element in one place so render code never hardcodes
// a color.

use crate::logging::LogLevel;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

#[derive(Debug, Clone)]
pub struct Theme {
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,
    pub border_type: BorderType,

    pub title: Color,
    pub status_bar: Color,

    pub selected_bg: Color,
    pub selected_fg: Color,

    pub label: Color,
    pub link: Color,
    pub age: Color,
    pub key_hint: Color,

    pub success: Color,
    pub error: Color,
    pub spinner: Color,

    pub log_error: Color,
    pub log_warn: Color,
    pub log_info: Color,
    pub log_debug: Color,
    pub log_trace: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::White,
            muted: Color::Gray,
            border: Color::Gray,
            border_focused: Color::Cyan,
            border_type: BorderType::Rounded,

            title: Color::Cyan,
            status_bar: Color::Green,

            selected_bg: Color::DarkGray,
            selected_fg: Color::Yellow,

            label: Color::LightBlue,
            link: Color::Blue,
            age: Color::DarkGray,
            key_hint: Color::Yellow,

            success: Color::Green,
            error: Color::Red,
            spinner: Color::Magenta,

            log_error: Color::Red,
            log_warn: Color::Yellow,
            log_info: Color::Blue,
            log_debug: Color::Gray,
            log_trace: Color::DarkGray,
        }
    }
}

impl Theme {
    pub fn block_border(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selected_bg)
            .fg(self.selected_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn label(&self) -> Style {
        Style::default().fg(self.label).add_modifier(Modifier::BOLD)
    }

    pub fn log_level(&self, level: LogLevel) -> Style {
        let color = match level {
            LogLevel::Error => self.log_error,
            LogLevel::Warn => self.log_warn,
            LogLevel::Info => self.log_info,
            LogLevel::Debug => self.log_debug,
            LogLevel::Trace => self.log_trace,
        };
        Style::default().fg(color)
    }
}
