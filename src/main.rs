// Khoros Reader - terminal browser for Khoros community messages
//
// Loads the latest messages from a community's GraphQL API (or a saved feed
// document), shows them in a filterable list with a detail view, and can ask
// Gemini for a short summary of the selected message.
//
// Architecture:
// - Session: login and session-key lifecycle for the community REST API
// - Feed: GraphQL query, response validation, message model
// - Summarize: Gemini generateContent client
// - TUI (ratatui): browser state machine plus background tasks over mpsc

mod cli;
mod config;
mod feed;
mod logging;
mod session;
mod summarize;
mod tui;
mod util;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, FetchOptions};
use config::Config;
use feed::{FeedSource, MessageRepository};
use logging::{LogBuffer, LogSink};
use session::SessionManager;
use std::sync::Arc;
use summarize::GeminiSummarizer;
use tui::app::App;
use tui::tasks::Services;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config subcommands run before anything else is set up
    if let Some(Commands::Config { show, reset, path }) = &cli.command {
        return cli::handle_config(*show, *reset, *path);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env();

    // In the browser, logs go to the buffer behind the debug overlay so they
    // never garble the alternate screen. Everything else logs to stderr.
    let interactive = cli.command.is_none();
    let sink = if interactive {
        LogSink::Tui
    } else {
        LogSink::Stderr
    };
    let log_buffer = LogBuffer::new();
    // Guard flushes the file writer on drop; keep it for the whole run
    let _file_guard = logging::init(&config.logging, sink, &log_buffer);

    let page_size = cli.count.unwrap_or(config.page_size);

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let session = Arc::new(SessionManager::new(&config.community, client.clone()));
    let repository = MessageRepository::new(&config.community, client, Arc::clone(&session));

    if let Some(Commands::Fetch {
        write_output,
        output_file,
        export_session,
    }) = cli.command
    {
        return cli::run_fetch(
            &repository,
            &session,
            FetchOptions {
                page_size,
                write_output,
                output_file,
                export_session,
            },
        )
        .await;
    }

    let feed = match cli.from_file {
        Some(path) => FeedSource::File(path),
        None => {
            if !config.community.is_configured() {
                tracing::warn!("No community hostname configured; set KHOROS_HOSTNAME");
            }
            FeedSource::Remote {
                repository,
                page_size,
            }
        }
    };

    let summarizer = GeminiSummarizer::new(&config.gemini, config.request_timeout());
    tracing::info!("Starting browser ({})", feed.describe());

    let app = App::new(log_buffer, feed.describe());
    let services = Arc::new(Services { feed, summarizer });

    tui::run_tui(app, services).await
}
