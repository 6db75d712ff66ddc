// Status bar component
//
// Renders the latest status message and the key hints for the current mode.

use crate::tui::app::{App, Mode, StatusKind};
use crate::tui::keymap::{FILTER_HELP, HELP};
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = Vec::new();

    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => theme.status_bar,
            StatusKind::Success => theme.success,
            StatusKind::Error => theme.error,
        };
        spans.push(Span::styled(
            format!(" {} ", status.text),
            Style::default().fg(color),
        ));
        spans.push(Span::styled("│", Style::default().fg(theme.muted)));
    }

    let hints = if matches!(app.mode, Mode::Filtering { .. }) {
        FILTER_HELP
    } else {
        HELP
    };
    // narrow terminals keep the first few hints only
    let shown = if Breakpoint::from_width(area.width) == Breakpoint::Compact {
        &hints[..hints.len().min(4)]
    } else {
        hints
    };
    for (key, action) in shown {
        spans.push(Span::styled(
            format!(" {}", key),
            Style::default().fg(theme.key_hint),
        ));
        spans.push(Span::styled(
            format!(" {}", action),
            Style::default().fg(theme.muted),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP));
    f.render_widget(status, area);
}
