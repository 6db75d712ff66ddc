// Message list component
//
// One row per visible message: the subject cut to fit, then its age.

use crate::tui::app::App;
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Highlight symbol in front of the selected row
const HIGHLIGHT: &str = "▶ ";

pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;
    // borders plus highlight symbol
    let row_width = (area.width as usize).saturating_sub(2 + HIGHLIGHT.width());

    let items: Vec<ListItem> = app
        .visible_messages()
        .map(|message| {
            let age = format!(" ({})", message.age);
            let subject_width = row_width.saturating_sub(age.width());
            let subject = truncate_to_width(&message.subject, subject_width);
            ListItem::new(Line::from(vec![
                Span::styled(subject, Style::default().fg(theme.fg)),
                Span::styled(age, Style::default().fg(theme.age)),
            ]))
        })
        .collect();

    let title = match app.selected() {
        Some(i) => format!(" Messages {}/{} ", i + 1, app.visible_len()),
        None => " Messages ".to_string(),
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(theme.block_border(true))
                .title(title),
        )
        .highlight_style(theme.selected())
        .highlight_symbol(HIGHLIGHT);

    let selected = app.selected();
    app.list_state.select(selected);
    f.render_stateful_widget(list, area, &mut app.list_state);
}
