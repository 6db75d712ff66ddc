// Title bar component
//
// Renders the app name, the feed source and the message counts.

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let counts = if app.is_ready() {
        if app.filter_text().is_empty() {
            format!(" ──── {} messages", app.total_messages())
        } else {
            format!(
                " ──── {} of {} messages",
                app.visible_len(),
                app.total_messages()
            )
        }
    } else {
        String::new()
    };

    let testing = if app.testing_connection {
        format!(" {} testing Gemini", app.spinner_char())
    } else {
        String::new()
    };

    let title_text = format!(" Khoros Reader{}{}", counts, testing);

    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.title))
                .title_top(Line::from(format!(" {} ", app.source_label)).right_aligned()),
        );

    f.render_widget(title, area);
}
