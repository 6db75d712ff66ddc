// Key bindings
//
// Translates terminal key events into controller commands. The filter input
// captures printable keys, so bindings depend on the current mode.

use super::app::{Mode, PAGE_STEP};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Something the user asked the browser to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    OpenFilter,
    FilterInput(char),
    FilterBackspace,
    SubmitFilter,
    CancelFilter,
    /// Esc outside the filter: close whichever overlay is open
    Dismiss,
    Navigate(isize),
    First,
    Last,
    ScrollDetail(i16),
    OpenExternal,
    ToggleSummary,
    TestConnection,
    ToggleDebug,
}

/// Help line entries as (key, action)
pub const HELP: &[(&str, &str)] = &[
    ("q", "quit"),
    ("/", "filter"),
    ("Esc", "cancel/close"),
    ("↑/↓", "navigate"),
    ("J/K", "scroll"),
    ("Enter", "open in browser"),
    ("s", "summarize"),
    ("t", "test Gemini"),
    ("d", "debug"),
];

/// Help line entries while the filter input is open
pub const FILTER_HELP: &[(&str, &str)] = &[
    ("Enter", "apply"),
    ("Esc", "cancel"),
    ("Backspace", "delete"),
];

/// Map a key event to a command for the given mode
pub fn command_for(key: KeyEvent, mode: &Mode) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }

    if matches!(mode, Mode::Filtering { .. }) {
        return match key.code {
            KeyCode::Esc => Some(Command::CancelFilter),
            KeyCode::Enter => Some(Command::SubmitFilter),
            KeyCode::Backspace => Some(Command::FilterBackspace),
            KeyCode::Char(c) => Some(Command::FilterInput(c)),
            _ => None,
        };
    }

    let command = match key.code {
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Char('/') => Command::OpenFilter,
        KeyCode::Esc => Command::Dismiss,
        KeyCode::Up | KeyCode::Char('k') => Command::Navigate(-1),
        KeyCode::Down | KeyCode::Char('j') => Command::Navigate(1),
        KeyCode::PageUp => Command::Navigate(-PAGE_STEP),
        KeyCode::PageDown => Command::Navigate(PAGE_STEP),
        KeyCode::Home | KeyCode::Char('g') => Command::First,
        KeyCode::End | KeyCode::Char('G') => Command::Last,
        KeyCode::Char('K') => Command::ScrollDetail(-1),
        KeyCode::Char('J') => Command::ScrollDetail(1),
        KeyCode::Enter => Command::OpenExternal,
        KeyCode::Char('s') => Command::ToggleSummary,
        KeyCode::Char('t') => Command::TestConnection,
        KeyCode::Char('d') => Command::ToggleDebug,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn filtering() -> Mode {
        Mode::Filtering {
            input: String::new(),
        }
    }

    #[test]
    fn test_browsing_bindings() {
        let mode = Mode::Browsing;
        assert_eq!(command_for(press(KeyCode::Char('q')), &mode), Some(Command::Quit));
        assert_eq!(command_for(press(KeyCode::Char('/')), &mode), Some(Command::OpenFilter));
        assert_eq!(command_for(press(KeyCode::Down), &mode), Some(Command::Navigate(1)));
        assert_eq!(command_for(press(KeyCode::Char('k')), &mode), Some(Command::Navigate(-1)));
        assert_eq!(
            command_for(press(KeyCode::PageDown), &mode),
            Some(Command::Navigate(PAGE_STEP))
        );
        assert_eq!(command_for(press(KeyCode::Enter), &mode), Some(Command::OpenExternal));
        assert_eq!(command_for(press(KeyCode::Char('s')), &mode), Some(Command::ToggleSummary));
        assert_eq!(command_for(press(KeyCode::Char('t')), &mode), Some(Command::TestConnection));
        assert_eq!(command_for(press(KeyCode::Char('d')), &mode), Some(Command::ToggleDebug));
        assert_eq!(command_for(press(KeyCode::Esc), &mode), Some(Command::Dismiss));
        assert_eq!(command_for(press(KeyCode::Char('x')), &mode), None);
    }

    #[test]
    fn test_filter_captures_printable_keys() {
        let mode = filtering();
        assert_eq!(
            command_for(press(KeyCode::Char('q')), &mode),
            Some(Command::FilterInput('q'))
        );
        assert_eq!(
            command_for(press(KeyCode::Char('s')), &mode),
            Some(Command::FilterInput('s'))
        );
        assert_eq!(command_for(press(KeyCode::Esc), &mode), Some(Command::CancelFilter));
        assert_eq!(command_for(press(KeyCode::Enter), &mode), Some(Command::SubmitFilter));
        assert_eq!(
            command_for(press(KeyCode::Backspace), &mode),
            Some(Command::FilterBackspace)
        );
        assert_eq!(command_for(press(KeyCode::Down), &mode), None);
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(ctrl_c, &Mode::Browsing), Some(Command::Quit));
        assert_eq!(command_for(ctrl_c, &filtering()), Some(Command::Quit));
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut release = press(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert_eq!(command_for(release, &Mode::Browsing), None);
    }
}
