// Filter bar component
//
// While filtering, shows the input with a cursor. Otherwise shows the
// applied filter, or a hint when there is none.

use crate::tui::app::{App, Mode};
use ratatui::{
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

const PROMPT: &str = "/ ";

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let (line, focused) = match &app.mode {
        Mode::Filtering { input } => (
            Line::from(vec![
                Span::styled(PROMPT, Style::default().fg(theme.key_hint)),
                Span::raw(input.clone()),
            ]),
            true,
        ),
        _ if !app.filter_text().is_empty() => (
            Line::from(vec![
                Span::styled("Filter: ", theme.label()),
                Span::raw(app.filter_text().to_string()),
            ]),
            false,
        ),
        _ => (
            Line::from(Span::styled(
                "Press / to filter messages",
                Style::default().fg(theme.muted),
            )),
            false,
        ),
    };

    let bar = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.block_border(focused))
            .title(" Filter "),
    );
    f.render_widget(bar, area);

    if let Mode::Filtering { input } = &app.mode {
        f.set_cursor_position(cursor_position(area, input));
    }
}

/// Cursor just after the input, kept inside the bar's border
fn cursor_position(area: Rect, input: &str) -> Position {
    let offset = u16::try_from(PROMPT.width() + input.width()).unwrap_or(u16::MAX);
    let x = area
        .x
        .saturating_add(1)
        .saturating_add(offset)
        .min(area.right().saturating_sub(2));
    Position::new(x, area.y.saturating_add(1))
}
