/// Responsive layout helpers for the browser screen.
///
/// Width thresholds live here so render code has no magic numbers.
use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    /// < 80 cols: list above detail
    Compact,
    /// 80-139 cols: list beside detail
    Normal,
    /// 140+ cols: list beside a wider detail panel
    Wide,
}

impl Breakpoint {
    pub fn from_width(width: u16) -> Self {
        match width {
            0..=79 => Breakpoint::Compact,
            80..=139 => Breakpoint::Normal,
            _ => Breakpoint::Wide,
        }
    }
}

/// Areas of the main screen
#[derive(Debug, Clone, Copy)]
pub struct Screen {
    pub title: Rect,
    pub filter: Rect,
    pub list: Rect,
    pub detail: Rect,
    pub status: Rect,
}

impl Screen {
    pub fn split(area: Rect) -> Self {
        let [title, filter, body, status] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .areas(area);

        let (direction, list_pct) = match Breakpoint::from_width(area.width) {
            Breakpoint::Compact => (Direction::Vertical, 40),
            Breakpoint::Normal => (Direction::Horizontal, 40),
            Breakpoint::Wide => (Direction::Horizontal, 33),
        };
        let panes = Layout::default()
            .direction(direction)
            .constraints([
                Constraint::Percentage(list_pct),
                Constraint::Percentage(100 - list_pct),
            ])
            .split(body);

        Self {
            title,
            filter,
            list: panes[0],
            detail: panes[1],
            status,
        }
    }
}

/// A rectangle of `percent_x` by `percent_y` centered in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_thresholds() {
        assert_eq!(Breakpoint::from_width(60), Breakpoint::Compact);
        assert_eq!(Breakpoint::from_width(79), Breakpoint::Compact);
        assert_eq!(Breakpoint::from_width(80), Breakpoint::Normal);
        assert_eq!(Breakpoint::from_width(139), Breakpoint::Normal);
        assert_eq!(Breakpoint::from_width(140), Breakpoint::Wide);
    }

    #[test]
    fn narrow_screens_stack_panes() {
        let screen = Screen::split(Rect::new(0, 0, 60, 40));
        assert_eq!(screen.list.x, screen.detail.x);
        assert!(screen.detail.y > screen.list.y);

        let screen = Screen::split(Rect::new(0, 0, 120, 40));
        assert_eq!(screen.list.y, screen.detail.y);
        assert!(screen.detail.x > screen.list.x);
    }

    #[test]
    fn centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 15);
    }
}
