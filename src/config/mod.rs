//! Configuration for the reader
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/khoros-reader/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod community;
mod gemini;
mod observability;
mod serialization;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (maintain public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use community::{CommunityConfig, FileCommunity, PriorSession};
pub use gemini::{FileGemini, GeminiConfig};
pub use observability::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Messages requested per feed query unless overridden
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Transport-level timeout for every outbound request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Community host, credentials and prior session
    pub community: CommunityConfig,

    /// Gemini summarization settings
    pub gemini: GeminiConfig,

    /// Number of messages requested from the feed
    pub page_size: NonZeroU32,

    /// Request timeout applied by the HTTP clients
    pub request_timeout_secs: u64,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            community: CommunityConfig::default(),
            gemini: GeminiConfig::default(),
            page_size: NonZeroU32::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroU32::MIN),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub page_size: Option<u32>,
    pub request_timeout_secs: Option<u64>,

    /// Optional [community] section
    pub community: Option<FileCommunity>,

    /// Optional [gemini] section
    pub gemini: Option<FileGemini>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/khoros-reader/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("khoros-reader").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// # Panics
    /// Exits the process if the config file exists but cannot be parsed.
    /// A broken config should fail fast instead of silently using defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                    eprintln!("║  CONFIG ERROR - Failed to parse configuration file          ║");
                    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for missing quotes and typos in section names.");
                    eprintln!("  To reset, run `khoros-reader config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: file -> env vars -> defaults
    pub fn from_env() -> Self {
        Self::resolve(Self::load_file_config(), |key| std::env::var(key).ok())
    }

    /// Merge a parsed file config with an environment lookup.
    ///
    /// Split out from `from_env` so precedence can be exercised without
    /// touching the process environment.
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // Page size: env > file > default; zero is ignored
        let page_size = env("KHOROS_PAGE_SIZE")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .and_then(NonZeroU32::new)
            .or_else(|| file.page_size.and_then(NonZeroU32::new))
            .unwrap_or(defaults.page_size);

        let request_timeout_secs = file
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(defaults.request_timeout_secs);

        let community = CommunityConfig::from_file(file.community, &env);
        let gemini = GeminiConfig::from_file(file.gemini, &env);
        let logging = LoggingConfig::from_file(file.logging);

        Self {
            community,
            gemini,
            page_size,
            request_timeout_secs,
            logging,
        }
    }
}
