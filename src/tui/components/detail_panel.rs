// Detail panel component
//
// Shows every field of the selected message followed by its body as plain
// text. Scroll position lives in `App::detail_scroll`, is clamped to the
// wrapped height here, and resets whenever the selection changes.

use crate::feed::Message;
use crate::tui::app::App;
use crate::tui::theme::Theme;
use crate::util::html_to_text;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const NOT_AVAILABLE: &str = "N/A";

fn field<'a>(theme: &Theme, label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), theme.label()),
        Span::raw(value),
    ])
}

fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Lines for one message
pub fn message_lines(message: &Message, theme: &Theme) -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(theme.title)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![
        field(theme, "ID", message.id.clone()),
        field(theme, "Subject", message.subject.clone()),
        field(
            theme,
            "Post Time",
            format!("{} ({})", message.post_time, message.age),
        ),
        Line::from(vec![
            Span::styled("View URL: ", theme.label()),
            Span::styled(
                message.view_href.clone(),
                Style::default()
                    .fg(theme.link)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        Line::default(),
        Line::from(Span::styled("Author", heading)),
        field(theme, "  Title", or_na(message.author.title.as_deref())),
        field(
            theme,
            "  First Name",
            or_na(message.author.first_name.as_deref()),
        ),
        field(
            theme,
            "  Last Name",
            or_na(message.author.last_name.as_deref()),
        ),
        Line::default(),
        Line::from(Span::styled("Message Body", heading)),
    ];

    lines.extend(
        html_to_text(&message.body)
            .lines()
            .map(|line| Line::from(line.to_string())),
    );
    lines
}

pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.block_border(false))
        .title(" Message Details ");

    let Some(message) = app.selected_message() else {
        let empty = Paragraph::new("No message selected")
            .style(Style::default().fg(theme.muted))
            .block(block);
        f.render_widget(empty, area);
        return;
    };

    let lines = message_lines(message, theme);
    let inner = block.inner(area);
    let detail = Paragraph::new(lines).wrap(Wrap { trim: false });

    // Scroll range is measured in wrapped rows
    let rows = detail.line_count(inner.width);
    app.detail_scroll.update_dimensions(rows, usize::from(inner.height));
    let offset = u16::try_from(app.detail_scroll.offset()).unwrap_or(u16::MAX);

    f.render_widget(detail.block(block).scroll((offset, 0)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Author;

    fn text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_lines_show_fields_and_plain_body() {
        let message = Message {
            id: "m-1".to_string(),
            subject: "Router reboot loop".to_string(),
            body: "<p>First</p><p>Second &amp; last</p>".to_string(),
            post_time: "2026-02-01T08:00:00Z".to_string(),
            view_href: "https://community.example.com/t5/m/1".to_string(),
            author: Author {
                title: Some("Guide".to_string()),
                first_name: None,
                last_name: Some(" ".to_string()),
            },
            age: "3d ago".to_string(),
        };

        let lines = text(&message_lines(&message, &Theme::default()));
        assert!(lines.contains(&"ID: m-1".to_string()));
        assert!(lines.contains(&"Post Time: 2026-02-01T08:00:00Z (3d ago)".to_string()));
        assert!(lines.contains(&"  Title: Guide".to_string()));
        assert!(lines.contains(&"  First Name: N/A".to_string()));
        assert!(lines.contains(&"  Last Name: N/A".to_string()));
        assert_eq!(lines[lines.len() - 3..], ["First", "", "Second & last"]);
    }
}
