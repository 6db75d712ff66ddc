// UI rendering logic
//
// `draw` is called on every frame. It picks the full-screen state for the
// current phase, then lays out the browser shell and any overlay.

use super::app::{App, Mode, Phase};
use super::components::{
    debug_overlay, detail_panel, filter_bar, message_list, splash, status_bar, summary_overlay,
    title_bar,
};
use super::layout::Screen;
use ratatui::Frame;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();

    match app.phase.clone() {
        Phase::Loading => splash::render_loading(f, area, app),
        Phase::Error(diagnostic) => splash::render_error(f, area, app, &diagnostic),
        Phase::Ready => {
            let screen = Screen::split(area);
            title_bar::render(f, screen.title, app);
            filter_bar::render(f, screen.filter, app);
            message_list::render(f, screen.list, app);
            detail_panel::render(f, screen.detail, app);
            status_bar::render(f, screen.status, app);

            if matches!(app.mode, Mode::Summarizing(_)) {
                summary_overlay::render(f, area, app);
            }
        }
    }

    // Debug overlay is available in every phase
    if app.show_debug {
        debug_overlay::render(f, area, app);
    }
}
