//! Community configuration: host, API path, credentials, prior session
//!
//! Credentials are usually supplied through the environment so the config
//! file can be shared without secrets.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Login path segment used by most Khoros communities
pub const DEFAULT_TAPESTRY: &str = "t5";

/// Community connection settings
#[derive(Debug, Clone)]
pub struct CommunityConfig {
    /// Community hostname, e.g. "community.example.com"
    pub hostname: String,
    /// Path segment in front of the legacy REST login endpoint
    pub tapestry: String,
    /// Full scheme+host override (staging instances, local fixtures)
    pub base_url: Option<String>,
    pub username: String,
    pub password: String,
    /// Session carried over from a previous run, if any
    pub prior_session: Option<PriorSession>,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            tapestry: DEFAULT_TAPESTRY.to_string(),
            base_url: None,
            username: String::new(),
            password: String::new(),
            prior_session: None,
        }
    }
}

/// Community settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileCommunity {
    pub hostname: Option<String>,
    pub tapestry: Option<String>,
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Session key and timestamps handed over from an earlier process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorSession {
    pub key: String,
    pub issued_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl PriorSession {
    /// Build from raw env values (timestamps in epoch milliseconds).
    ///
    /// Returns None when the key is blank or either timestamp is missing or
    /// zero, which the session policy treats as "no session".
    pub fn from_raw(key: Option<String>, issued_ms: Option<String>, used_ms: Option<String>) -> Option<Self> {
        let key = key.filter(|k| !k.trim().is_empty())?;
        let issued_at = parse_millis(issued_ms?)?;
        let last_used_at = parse_millis(used_ms?)?;
        Some(Self {
            key,
            issued_at,
            last_used_at,
        })
    }
}

fn parse_millis(raw: String) -> Option<DateTime<Utc>> {
    let millis: i64 = raw.trim().parse().ok()?;
    if millis <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(millis).single()
}

impl CommunityConfig {
    /// Create from file config, letting environment values win
    pub fn from_file(file: Option<FileCommunity>, env: &impl Fn(&str) -> Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let prior_session = PriorSession::from_raw(
            env("KHOROS_SESSION_KEY"),
            env("KHOROS_SESSION_START"),
            env("KHOROS_SESSION_LAST_USED"),
        );

        Self {
            hostname: env("KHOROS_HOSTNAME")
                .or(file.hostname)
                .unwrap_or(defaults.hostname),
            tapestry: env("KHOROS_TAPESTRY")
                .or(file.tapestry)
                .unwrap_or(defaults.tapestry),
            base_url: env("KHOROS_BASE_URL").or(file.base_url),
            username: env("KHOROS_USERNAME")
                .or(file.username)
                .unwrap_or(defaults.username),
            password: env("KHOROS_PASSWORD")
                .or(file.password)
                .unwrap_or(defaults.password),
            prior_session,
        }
    }

    /// Scheme and host every endpoint is built on
    pub fn api_base(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.hostname),
        }
    }

    /// Whether enough is configured to talk to the community at all
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() || !self.hostname.trim().is_empty()
    }
}
