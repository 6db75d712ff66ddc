// Debug overlay component
//
// Tail of the in-memory log buffer, newest at the bottom.

use crate::tui::app::App;
use crate::tui::layout::centered_rect;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let popup = centered_rect(90, 60, area);
    let rows = popup.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = app
        .log_buffer
        .tail(rows)
        .into_iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    entry.timestamp.format("%H:%M:%S ").to_string(),
                    Style::default().fg(theme.muted),
                ),
                Span::styled(
                    format!("{:<5} ", entry.level.as_str()),
                    theme.log_level(entry.level),
                ),
                Span::styled(
                    format!("{} ", entry.target),
                    Style::default().fg(theme.muted),
                ),
                Span::raw(entry.message),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.log_warn))
        .title(format!(" Debug log ({} entries) ", app.log_buffer.len()));

    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}
