//! Message summaries through the Gemini `generateContent` REST API
//!
//! The summarizer never fails its caller: every outcome, including a missing
//! API key, is a value the browser can render.

use crate::config::GeminiConfig;
use crate::feed::Message;
use crate::util::{html_to_text, truncate_utf8_safe};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Upper bound on the message body embedded in a prompt
pub const MAX_PROMPT_BODY_BYTES: usize = 12_000;

const CONNECTION_PROBE: &str =
    "Hello! Please respond with 'Connection successful' if you can see this message.";

/// Why a summary could not be produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryFailure {
    /// No API key configured or the client could not be built
    Unavailable,
    /// The API answered without any text
    EmptyResponse,
    /// Transport or API error
    Request(String),
}

impl fmt::Display for SummaryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(
                f,
                "Gemini API not available. Please set GEMINI_API_KEY environment variable."
            ),
            Self::EmptyResponse => write!(f, "Failed to generate summary. Please try again."),
            Self::Request(reason) => write!(f, "Error generating summary: {}", reason),
        }
    }
}

/// Result of a summarize call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Summary(String),
    Failed(SummaryFailure),
}

impl SummaryOutcome {
    /// Text shown in the summary overlay
    pub fn text(&self) -> String {
        match self {
            Self::Summary(text) => text.clone(),
            Self::Failed(failure) => failure.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Result of the connection test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionReport {
    Success(String),
    NoResponse,
    Failed(String),
    Unavailable,
}

impl fmt::Display for ConnectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(text) => write!(f, "Test successful: {}", text),
            Self::NoResponse => write!(f, "Test failed: No response received"),
            Self::Failed(reason) => write!(f, "Test failed: {}", reason),
            Self::Unavailable => write!(f, "Gemini API not available"),
        }
    }
}

impl ConnectionReport {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// First text part of the first candidate, trimmed; None when blank
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|part| part.text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Readable message from an error response body
fn describe_http_error(code: u16, body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| {
            let message = wrapper.error.message?;
            Some(match wrapper.error.status {
                Some(status) if !status.is_empty() => format!("{}: {}", status, message),
                _ => message,
            })
        })
        .unwrap_or_else(|| format!("HTTP {}: {}", code, body.trim()))
}

/// Build the summarization prompt for one message
pub fn build_prompt(message: &Message) -> String {
    let author = message
        .author
        .display_name()
        .unwrap_or_else(|| "Unknown author".to_string());
    let body = html_to_text(&message.body);
    let body = truncate_utf8_safe(&body, MAX_PROMPT_BODY_BYTES);

    format!(
        "Please provide a concise summary of the following message from a community forum:\n\n\
         Subject: {}\n\
         Author: {}\n\
         Content: {}\n\n\
         Please summarize the key points in 2-3 sentences, focusing on:\n\
         - The main topic or question\n\
         - Any specific requests or issues mentioned\n\
         - The overall tone and context\n\n\
         Keep the summary clear and professional.",
        message.subject, author, body
    )
}

/// Client for the generation API
pub struct GeminiSummarizer {
    client: Option<reqwest::Client>,
    api_key: Option<String>,
    endpoint: String,
}

impl GeminiSummarizer {
    pub fn new(config: &GeminiConfig, timeout: Duration) -> Self {
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::error!("Failed to create Gemini HTTP client: {}", e);
                None
            }
        };

        if config.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set, summaries disabled");
        } else {
            tracing::info!("Gemini summarizer ready (model: {})", config.model);
        }

        Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
        }
    }

    /// Key configured and client built; no I/O
    pub fn is_available(&self) -> bool {
        self.api_key.is_some() && self.client.is_some()
    }

    pub fn status_message(&self) -> &'static str {
        if self.is_available() {
            "Gemini API: Available"
        } else {
            "Gemini API: Not available (set GEMINI_API_KEY)"
        }
    }

    pub async fn summarize(&self, message: &Message) -> SummaryOutcome {
        if !self.is_available() {
            return SummaryOutcome::Failed(SummaryFailure::Unavailable);
        }

        tracing::debug!("Summarizing message {}", message.id);
        match self.generate(&build_prompt(message)).await {
            Ok(Some(text)) => SummaryOutcome::Summary(text),
            Ok(None) => SummaryOutcome::Failed(SummaryFailure::EmptyResponse),
            Err(reason) => {
                tracing::error!("Error generating summary: {}", reason);
                SummaryOutcome::Failed(SummaryFailure::Request(reason))
            }
        }
    }

    pub async fn test_connection(&self) -> ConnectionReport {
        if !self.is_available() {
            return ConnectionReport::Unavailable;
        }

        match self.generate(CONNECTION_PROBE).await {
            Ok(Some(text)) => ConnectionReport::Success(text),
            Ok(None) => ConnectionReport::NoResponse,
            Err(reason) => ConnectionReport::Failed(reason),
        }
    }

    /// One `generateContent` call; Ok(None) when the reply carries no text
    async fn generate(&self, prompt: &str) -> Result<Option<String>, String> {
        let (Some(client), Some(api_key)) = (&self.client, &self.api_key) else {
            return Err("client not configured".to_string());
        };

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = client
            .post(&self.endpoint)
            .query(&[("key", api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Gemini API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(describe_http_error(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Gemini response: {}", e))?;

        Ok(extract_text(parsed))
    }
}
