// CLI module - command-line argument parsing and handlers
//
// Without a subcommand the interactive browser runs. Subcommands:
// - fetch: non-interactive feed fetch (print, save, export session)
// - config --show: Display effective configuration
// - config --path: Show config file path
// - config --reset: Regenerate config file with defaults

use crate::config::{Config, VERSION};
use crate::feed::{parse_document, Message, MessageRepository};
use crate::session::{SessionManager, SessionToken};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Default file written by `fetch --write-output`
pub const DEFAULT_OUTPUT_FILE: &str = "top_posters_output.json";

/// Khoros Reader - terminal browser for community messages
#[derive(Parser)]
#[command(name = "khoros-reader")]
#[command(version = VERSION)]
#[command(about = "Terminal browser for Khoros community messages", long_about = None)]
pub struct Cli {
    /// Number of messages to request (overrides config)
    #[arg(short, long, global = true)]
    pub count: Option<NonZeroU32>,

    /// Browse a saved feed document instead of fetching
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the feed once and print it
    Fetch {
        /// Save the raw feed document instead of printing a listing
        #[arg(long)]
        write_output: bool,

        /// Where to save the document
        #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
        output_file: PathBuf,

        /// Print shell exports for reusing the session on the next run
        #[arg(long)]
        export_session: bool,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// fetch
// ─────────────────────────────────────────────────────────────────────────────

/// Options for the `fetch` subcommand
pub struct FetchOptions {
    pub page_size: NonZeroU32,
    pub write_output: bool,
    pub output_file: PathBuf,
    pub export_session: bool,
}

pub async fn run_fetch(
    repository: &MessageRepository,
    session: &SessionManager,
    options: FetchOptions,
) -> Result<()> {
    let document = repository
        .fetch_document(options.page_size)
        .await
        .context("Failed to fetch messages")?;

    if options.write_output {
        let pretty = serde_json::to_string_pretty(&document)
            .context("Failed to serialize feed document")?;
        std::fs::write(&options.output_file, pretty).with_context(|| {
            format!("Failed to write {}", options.output_file.display())
        })?;
        println!("Wrote feed to {}", options.output_file.display());
    } else {
        let messages = parse_document(document, Utc::now()).context("Failed to parse feed")?;
        for message in &messages {
            println!("{}", summary_line(message));
        }
        println!("{} messages", messages.len());
    }

    if options.export_session {
        print!("{}", session_exports(&session.snapshot().await));
    }

    Ok(())
}

/// One listing line: id, subject, age and author
fn summary_line(message: &Message) -> String {
    let author = message
        .author
        .display_name()
        .unwrap_or_else(|| "unknown author".to_string());
    format!(
        "{:>8}  {} ({}) by {}",
        message.id, message.subject, message.age, author
    )
}

/// Shell lines that hand the session to the next process
fn session_exports(token: &SessionToken) -> String {
    if token.is_empty() {
        return String::new();
    }
    format!(
        "export KHOROS_SESSION_KEY={}\nexport KHOROS_SESSION_START={}\nexport KHOROS_SESSION_LAST_USED={}\n",
        token.key,
        token.issued_at.timestamp_millis(),
        token.last_used_at.timestamp_millis()
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// config
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_config(show: bool, reset: bool, path: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show();
        Ok(())
    } else if reset {
        handle_config_reset()
    } else {
        // No flag provided, show help
        println!("Usage: khoros-reader config [--show|--reset|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!("# Secrets are never shown.");
    println!();
    print!("{}", config.to_toml());
    println!();
    println!(
        "# password set: {}",
        !config.community.password.is_empty()
    );
    println!("# gemini api_key set: {}", config.gemini.api_key.is_some());
    println!(
        "# prior session: {}",
        if config.community.prior_session.is_some() {
            "yes"
        } else {
            "no"
        }
    );

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush().context("Failed to flush stderr")?;

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read confirmation")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Author;
    use chrono::TimeZone;

    #[test]
    fn test_parses_browser_flags() {
        let cli = Cli::try_parse_from(["khoros-reader", "-c", "25", "--from-file", "feed.json"])
            .unwrap();
        assert_eq!(cli.count, NonZeroU32::new(25));
        assert_eq!(cli.from_file, Some(PathBuf::from("feed.json")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_fetch_defaults() {
        let cli = Cli::try_parse_from(["khoros-reader", "fetch", "--count", "5"]).unwrap();
        assert_eq!(cli.count, NonZeroU32::new(5));
        match cli.command {
            Some(Commands::Fetch {
                write_output,
                output_file,
                export_session,
            }) => {
                assert!(!write_output);
                assert!(!export_session);
                assert_eq!(output_file, PathBuf::from(DEFAULT_OUTPUT_FILE));
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(Cli::try_parse_from(["khoros-reader", "-c", "0"]).is_err());
    }

    #[test]
    fn test_session_exports_in_millis() {
        let issued = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let used = Utc.timestamp_millis_opt(1_700_000_060_000).unwrap();
        let token = SessionToken {
            key: "abc".to_string(),
            issued_at: issued,
            last_used_at: used,
        };

        assert_eq!(
            session_exports(&token),
            "export KHOROS_SESSION_KEY=abc\n\
             export KHOROS_SESSION_START=1700000000000\n\
             export KHOROS_SESSION_LAST_USED=1700000060000\n"
        );
        assert_eq!(session_exports(&SessionToken::empty()), "");
    }

    #[test]
    fn test_summary_line_names_author() {
        let message = Message {
            id: "42".to_string(),
            subject: "Billing question".to_string(),
            body: String::new(),
            post_time: String::new(),
            view_href: String::new(),
            author: Author {
                title: None,
                first_name: Some("Ada".to_string()),
                last_name: Some("Lovelace".to_string()),
            },
            age: "5m ago".to_string(),
        };
        assert_eq!(
            summary_line(&message),
            "      42  Billing question (5m ago) by Ada Lovelace"
        );
    }
}
