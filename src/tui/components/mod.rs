// Components module - UI building blocks for the browser screen
//
// Shell components are rendered whenever the browser is Ready:
// - Title bar: app name, source, message counts
// - Filter bar: filter input or the applied filter
// - Message list and detail panel
// - Status bar: status message and key hints
//
// Overlays (summary, debug log) draw on top with `Clear`.

pub mod debug_overlay;
pub mod detail_panel;
pub mod filter_bar;
pub mod message_list;
pub mod splash;
pub mod status_bar;
pub mod summary_overlay;
pub mod title_bar;
