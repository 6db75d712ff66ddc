// Loading and error screens
//
// Full-screen states shown before the browser is Ready.

use crate::tui::app::App;
use crate::tui::layout::centered_rect;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render_loading(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let popup = centered_rect(60, 20, area);
    let text = vec![
        Line::from(format!("{} Loading Khoros TUI Reader...", app.spinner_char())),
        Line::default(),
        Line::from(app.source_label.clone()).style(Style::default().fg(theme.muted)),
    ];
    let loading = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(theme.spinner)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(theme.block_border(true)),
        );
    f.render_widget(loading, popup);
}

pub fn render_error(f: &mut Frame, area: Rect, app: &App, diagnostic: &str) {
    let theme = &app.theme;
    let popup = centered_rect(70, 30, area);
    let text = vec![
        Line::from(diagnostic.to_string()),
        Line::default(),
        Line::from("Press q to quit, d for the debug log").style(Style::default().fg(theme.muted)),
    ];
    let error = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.error))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.error))
                .title(" Error "),
        );
    f.render_widget(error, popup);
}
