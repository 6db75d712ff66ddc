// TUI application state
//
// `App` is the browser controller: it owns the loaded messages, the applied
// filter, the selection and the overlays. Every user action is a method that
// mutates state synchronously and returns the background `Task`s it needs;
// results come back through `apply`. Nothing here awaits.

use super::keymap::Command;
use super::scroll::ScrollState;
use super::tasks::{Task, TaskResult};
use super::theme::Theme;
use crate::feed::{FetchError, Message};
use crate::logging::LogBuffer;
use crate::summarize::{ConnectionReport, SummaryOutcome};
use ratatui::widgets::ListState;
use std::time::Instant;

/// Rows moved by PageUp/PageDown
pub const PAGE_STEP: isize = 10;

/// Diagnostic shown when the feed loads but is empty
pub const NO_MESSAGES: &str = "No messages were returned by the community feed.";

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Top-level lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    /// Startup failed; only quit remains
    Error(String),
}

/// Summary overlay content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryState {
    Pending,
    Done(SummaryOutcome),
}

/// The summary overlay for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPanel {
    pub message_id: String,
    pub subject: String,
    /// Generation the pending request was dispatched with
    pub generation: u64,
    pub state: SummaryState,
    pub started: Instant,
}

/// Interaction mode while Ready; at most one overlay exists at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    /// Filter input is open; `input` is the text being edited
    Filtering { input: String },
    Summarizing(SummaryPanel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One-line status shown under the panels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusLine {
    fn new(text: impl Into<String>, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Main application state for the TUI
pub struct App {
    pub phase: Phase,
    pub mode: Mode,

    /// Every loaded message, in feed order
    messages: Vec<Message>,

    /// Indices into `messages` matching the applied filter
    visible: Vec<usize>,

    /// Index into `visible`
    selected: Option<usize>,

    /// Applied filter as typed (trimmed); empty means no filter
    filter_text: String,

    summary_generation: u64,
    test_generation: u64,

    /// A connection test is in flight
    pub testing_connection: bool,

    pub status: Option<StatusLine>,

    /// Vertical scroll of the detail panel, in rendered rows
    pub detail_scroll: ScrollState,

    pub show_debug: bool,
    pub should_quit: bool,

    /// Where messages come from, for the title bar
    pub source_label: String,

    /// Log buffer for the debug overlay
    pub log_buffer: LogBuffer,

    pub theme: Theme,

    /// Scroll position of the message list, kept between frames
    pub list_state: ListState,

    animation_frame: usize,
}

impl App {
    pub fn new(log_buffer: LogBuffer, source_label: impl Into<String>) -> Self {
        Self {
            phase: Phase::Loading,
            mode: Mode::Browsing,
            messages: Vec::new(),
            visible: Vec::new(),
            selected: None,
            filter_text: String::new(),
            summary_generation: 0,
            test_generation: 0,
            testing_connection: false,
            status: None,
            detail_scroll: ScrollState::new(),
            show_debug: false,
            should_quit: false,
            source_label: source_label.into(),
            log_buffer,
            theme: Theme::default(),
            list_state: ListState::default(),
            animation_frame: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read access for rendering
    // ─────────────────────────────────────────────────────────────────────

    pub fn total_messages(&self) -> usize {
        self.messages.len()
    }

    /// Messages matching the applied filter, in feed order
    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.visible.iter().filter_map(|&i| self.messages.get(i))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_message(&self) -> Option<&Message> {
        let index = *self.visible.get(self.selected?)?;
        self.messages.get(index)
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn summary(&self) -> Option<&SummaryPanel> {
        match &self.mode {
            Mode::Summarizing(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.animation_frame % SPINNER_FRAMES.len()]
    }

    pub fn tick_animation(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────

    /// Enter Loading and request the feed
    pub fn start(&mut self) -> Vec<Task> {
        self.phase = Phase::Loading;
        self.mode = Mode::Browsing;
        vec![Task::Fetch]
    }

    /// Route a key-level command to its transition
    pub fn dispatch(&mut self, command: Command) -> Vec<Task> {
        match command {
            Command::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Command::ToggleDebug => {
                self.show_debug = !self.show_debug;
                Vec::new()
            }
            Command::OpenFilter => self.open_filter(),
            Command::FilterInput(c) => self.edit_filter(|input| input.push(c)),
            Command::FilterBackspace => self.edit_filter(|input| {
                input.pop();
            }),
            Command::SubmitFilter => self.submit_filter(),
            Command::CancelFilter => self.cancel_filter(),
            Command::Dismiss => self.dismiss(),
            Command::Navigate(delta) => self.navigate(delta),
            Command::First => self.select_first(),
            Command::Last => self.select_last(),
            Command::ScrollDetail(delta) => {
                if self.is_ready() {
                    self.detail_scroll.scroll_by(isize::from(delta));
                }
                Vec::new()
            }
            Command::OpenExternal => self.open_selected(),
            Command::ToggleSummary => self.toggle_summary(),
            Command::TestConnection => self.test_connection(),
        }
    }

    /// Apply a finished background task
    pub fn apply(&mut self, result: TaskResult) -> Vec<Task> {
        match result {
            TaskResult::Fetched(result) => self.on_fetched(result),
            TaskResult::Summarized {
                generation,
                outcome,
            } => self.on_summary(generation, outcome),
            TaskResult::ConnectionTested { generation, report } => {
                self.on_connection_tested(generation, report)
            }
            TaskResult::UrlOpened { url, result } => {
                self.status = Some(match result {
                    Ok(()) => StatusLine::new(format!("Opened {}", url), StatusKind::Info),
                    Err(e) => {
                        tracing::warn!("Could not open {}: {}", url, e);
                        StatusLine::new(format!("Could not open browser: {}", e), StatusKind::Error)
                    }
                });
            }
        }
        Vec::new()
    }

    fn on_fetched(&mut self, result: Result<Vec<Message>, FetchError>) {
        if self.phase != Phase::Loading {
            tracing::debug!("Ignoring feed result outside of Loading");
            return;
        }

        match result {
            Ok(messages) if messages.is_empty() => {
                tracing::warn!("{}", NO_MESSAGES);
                self.phase = Phase::Error(NO_MESSAGES.to_string());
            }
            Ok(messages) => {
                tracing::info!("Browsing {} messages", messages.len());
                self.visible = (0..messages.len()).collect();
                self.messages = messages;
                self.filter_text.clear();
                self.phase = Phase::Ready;
                self.selection_changed(Some(0));
            }
            Err(e) => {
                tracing::error!("Failed to load messages: {}", e);
                self.phase = Phase::Error(format!("Failed to load messages: {}", e));
            }
        }
    }

    fn on_summary(&mut self, generation: u64, outcome: SummaryOutcome) {
        let current = self.summary_generation;
        match &mut self.mode {
            Mode::Summarizing(panel) if panel.generation == generation && generation == current => {
                if let SummaryOutcome::Failed(failure) = &outcome {
                    tracing::warn!("Summary for message {} failed: {}", panel.message_id, failure);
                }
                panel.state = SummaryState::Done(outcome);
            }
            _ => tracing::debug!(
                "Dropping stale summary (generation {}, current {})",
                generation,
                current
            ),
        }
    }

    fn on_connection_tested(&mut self, generation: u64, report: ConnectionReport) {
        if generation != self.test_generation {
            tracing::debug!("Dropping stale connection test #{}", generation);
            return;
        }
        self.testing_connection = false;
        let kind = if report.is_success() {
            StatusKind::Success
        } else {
            StatusKind::Error
        };
        tracing::info!("{}", report);
        self.status = Some(StatusLine::new(report.to_string(), kind));
    }

    fn open_filter(&mut self) -> Vec<Task> {
        if !self.is_ready() || matches!(self.mode, Mode::Filtering { .. }) {
            return Vec::new();
        }
        self.close_summary();
        self.mode = Mode::Filtering {
            input: self.filter_text.clone(),
        };
        Vec::new()
    }

    fn edit_filter(&mut self, edit: impl FnOnce(&mut String)) -> Vec<Task> {
        if let Mode::Filtering { input } = &mut self.mode {
            edit(input);
        }
        Vec::new()
    }

    fn submit_filter(&mut self) -> Vec<Task> {
        let Mode::Filtering { input } = &self.mode else {
            return Vec::new();
        };
        let text = input.trim().to_string();
        self.mode = Mode::Browsing;
        self.apply_filter(&text);
        Vec::new()
    }

    /// Discard the edit and show every message again
    fn cancel_filter(&mut self) -> Vec<Task> {
        if !matches!(self.mode, Mode::Filtering { .. }) {
            return Vec::new();
        }
        self.mode = Mode::Browsing;
        self.apply_filter("");
        Vec::new()
    }

    /// Recompute `visible` for `text` and reset the selection
    fn apply_filter(&mut self, text: &str) {
        let needle = text.trim().to_lowercase();
        self.filter_text = text.trim().to_string();
        self.visible = if needle.is_empty() {
            (0..self.messages.len()).collect()
        } else {
            self.messages
                .iter()
                .enumerate()
                .filter(|(_, message)| message.matches(&needle))
                .map(|(i, _)| i)
                .collect()
        };

        tracing::debug!(
            "Filter {:?} matched {} of {} messages",
            needle,
            self.visible.len(),
            self.messages.len()
        );

        let first = (!self.visible.is_empty()).then_some(0);
        self.selection_changed(first);
    }

    /// Esc outside the filter: close the summary, else the debug overlay
    fn dismiss(&mut self) -> Vec<Task> {
        if matches!(self.mode, Mode::Summarizing(_)) {
            self.close_summary();
        } else if self.show_debug {
            self.show_debug = false;
        }
        Vec::new()
    }

    fn can_browse(&self) -> bool {
        self.is_ready() && !matches!(self.mode, Mode::Filtering { .. })
    }

    fn navigate(&mut self, delta: isize) -> Vec<Task> {
        if !self.can_browse() || self.visible.is_empty() {
            return Vec::new();
        }
        let last = self.visible.len() - 1;
        let current = self.selected.unwrap_or(0);
        let target = current.saturating_add_signed(delta).min(last);
        self.move_selection(target);
        Vec::new()
    }

    fn select_first(&mut self) -> Vec<Task> {
        if self.can_browse() && !self.visible.is_empty() {
            self.move_selection(0);
        }
        Vec::new()
    }

    fn select_last(&mut self) -> Vec<Task> {
        if self.can_browse() && !self.visible.is_empty() {
            self.move_selection(self.visible.len() - 1);
        }
        Vec::new()
    }

    fn move_selection(&mut self, target: usize) {
        if self.selected != Some(target) {
            self.selection_changed(Some(target));
        }
    }

    /// Selection moved: reset the detail view and invalidate any summary
    fn selection_changed(&mut self, selected: Option<usize>) {
        self.selected = selected;
        self.detail_scroll.reset();
        self.close_summary();
    }

    /// Close the summary overlay (if open) and invalidate in-flight results
    fn close_summary(&mut self) {
        self.summary_generation += 1;
        if matches!(self.mode, Mode::Summarizing(_)) {
            self.mode = Mode::Browsing;
        }
    }

    fn toggle_summary(&mut self) -> Vec<Task> {
        if !self.can_browse() {
            return Vec::new();
        }
        if matches!(self.mode, Mode::Summarizing(_)) {
            self.close_summary();
            return Vec::new();
        }

        let Some(message) = self.selected_message().cloned() else {
            self.status = Some(StatusLine::new("No message selected", StatusKind::Error));
            return Vec::new();
        };

        self.summary_generation += 1;
        let generation = self.summary_generation;
        self.mode = Mode::Summarizing(SummaryPanel {
            message_id: message.id.clone(),
            subject: message.subject.clone(),
            generation,
            state: SummaryState::Pending,
            started: Instant::now(),
        });
        vec![Task::Summarize {
            generation,
            message,
        }]
    }

    fn open_selected(&mut self) -> Vec<Task> {
        if !self.can_browse() {
            return Vec::new();
        }
        let Some(message) = self.selected_message() else {
            return Vec::new();
        };
        if message.view_href.trim().is_empty() {
            self.status = Some(StatusLine::new("Message has no URL", StatusKind::Error));
            return Vec::new();
        }
        let url = message.view_href.clone();
        self.status = Some(StatusLine::new(format!("Opening {}", url), StatusKind::Info));
        vec![Task::OpenUrl(url)]
    }

    fn test_connection(&mut self) -> Vec<Task> {
        if !self.is_ready() {
            return Vec::new();
        }
        self.test_generation += 1;
        self.testing_connection = true;
        self.status = Some(StatusLine::new(
            "Testing Gemini connection...",
            StatusKind::Info,
        ));
        vec![Task::TestConnection {
            generation: self.test_generation,
        }]
    }

    /// Set the status line directly (startup hints)
    pub fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusLine::new(text, kind));
    }
}
