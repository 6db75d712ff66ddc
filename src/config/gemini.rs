//! Gemini summarization configuration

use serde::Deserialize;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Settings for the generation API used by summaries
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; None disables summaries
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

/// Gemini settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileGemini {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl GeminiConfig {
    /// Create from file config; GEMINI_API_KEY takes precedence over the file
    pub fn from_file(file: Option<FileGemini>, env: &impl Fn(&str) -> Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let api_key = env("GEMINI_API_KEY")
            .or(file.api_key)
            .filter(|key| !key.trim().is_empty());

        Self {
            api_key,
            model: file.model.unwrap_or(defaults.model),
            base_url: file.base_url.unwrap_or(defaults.base_url),
        }
    }
}
