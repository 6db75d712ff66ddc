// Summary overlay component
//
// Centered popup over the panels. Pending requests show a spinner; failures
// render in the error color.

use crate::tui::app::{App, SummaryState};
use crate::tui::layout::centered_rect;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(panel) = app.summary() else {
        return;
    };
    let theme = &app.theme;

    let (text, style) = match &panel.state {
        SummaryState::Pending => (
            format!(
                "{} Generating summary... ({}s)",
                app.spinner_char(),
                panel.started.elapsed().as_secs()
            ),
            Style::default().fg(theme.spinner),
        ),
        SummaryState::Done(outcome) if outcome.is_failure() => {
            (outcome.text(), Style::default().fg(theme.error))
        }
        SummaryState::Done(outcome) => (outcome.text(), Style::default().fg(theme.fg)),
    };

    let popup = centered_rect(70, 50, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.block_border(true))
        .title(format!(" AI Summary: {} ", panel.subject))
        .title_bottom(Line::from(" s/Esc close ").right_aligned());

    let body = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(Clear, popup);
    f.render_widget(body, popup);
}
