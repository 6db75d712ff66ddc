// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, background task results)
// - Rendering the UI

pub mod app;
pub mod components;
pub mod keymap;
pub mod layout;
pub mod scroll;
pub mod tasks;
pub mod theme;
pub mod ui;

use anyhow::{Context, Result};
use app::{App, StatusKind};
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tasks::{Services, TaskResult};
use tokio::sync::mpsc;

/// Redraw cadence for spinners and elapsed-time counters
const TICK: Duration = Duration::from_millis(100);

/// Run the TUI
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// even when the loop fails.
pub async fn run_tui(mut app: App, services: Arc<Services>) -> Result<()> {
    // Set up terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    app.set_status(services.summarizer.status_message(), StatusKind::Info);

    // Run the event loop
    let result = run_event_loop(&mut terminal, &mut app, services).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on three sources with `tokio::select!`:
/// 1. Terminal events (keys, resizes)
/// 2. Timer ticks (spinner animation)
/// 3. Results of background tasks
///
/// All `App` mutation happens here; network work runs in spawned tasks.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    services: Arc<Services>,
) -> Result<()> {
    let (results_tx, mut results_rx) = mpsc::channel::<TaskResult>(32);
    let mut events = EventStream::new();
    let mut tick_interval = tokio::time::interval(TICK);

    tasks::spawn_all(app.start(), &services, &results_tx);

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => {
                    if let Some(command) = keymap::command_for(key, &app.mode) {
                        let effects = app.dispatch(command);
                        tasks::spawn_all(effects, &services, &results_tx);
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    return Err(e).context("Failed to read terminal event");
                }
                None => break,
            },

            _ = tick_interval.tick() => {
                app.tick_animation();
            }

            Some(result) = results_rx.recv() => {
                let effects = app.apply(result);
                tasks::spawn_all(effects, &services, &results_tx);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
