//! Feed data structures
//!
//! `Raw*` types mirror the GraphQL document with every field optional so
//! that missing data is reported per item instead of as a serde error.
//! [`Message`] is the validated form handed to the browser.

use super::age::age_label;
use super::FetchError;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Message author; the API leaves any of these null
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Author {
    /// "First Last", or None when both parts are blank
    pub fn display_name(&self) -> Option<String> {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

/// A validated feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub subject: String,
    /// Raw HTML as delivered by the API
    pub body: String,
    /// Post time exactly as delivered
    pub post_time: String,
    pub view_href: String,
    pub author: Author,
    /// Relative age computed at load time
    pub age: String,
}

impl Message {
    /// Lowercased concatenation of every field, used by the filter
    pub fn search_text(&self) -> String {
        let author = &self.author;
        [
            self.id.as_str(),
            self.subject.as_str(),
            self.body.as_str(),
            self.post_time.as_str(),
            self.view_href.as_str(),
            author.title.as_deref().unwrap_or(""),
            author.first_name.as_deref().unwrap_or(""),
            author.last_name.as_deref().unwrap_or(""),
            self.age.as_str(),
        ]
        .join("\n")
        .to_lowercase()
    }

    /// Case-insensitive match against an already lowercased needle
    pub fn matches(&self, needle: &str) -> bool {
        self.search_text().contains(needle)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct FeedDocument {
    pub data: Option<FeedData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedData {
    pub messages: Option<MessageConnection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageConnection {
    /// Kept as raw values so a bad item can be reported by index
    pub edges: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edge {
    pub node: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMessage {
    pub id: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub post_time: Option<String>,
    pub view_href: Option<String>,
    pub author: Option<Author>,
}

impl RawMessage {
    /// Validate one node; `index` is used in the error message
    fn into_message(self, index: usize, now: DateTime<Utc>) -> Result<Message, FetchError> {
        let missing = |field: &str| {
            FetchError::Malformed(format!("message {} is missing `{}`", index, field))
        };

        let id = self.id.ok_or_else(|| missing("id"))?;
        let subject = self.subject.ok_or_else(|| missing("subject"))?;
        let body = self.body.ok_or_else(|| missing("body"))?;
        let post_time = self.post_time.ok_or_else(|| missing("postTime"))?;
        let view_href = self.view_href.ok_or_else(|| missing("viewHref"))?;
        let author = self.author.ok_or_else(|| missing("author"))?;
        let age = age_label(&post_time, now);

        Ok(Message {
            id,
            subject,
            body,
            post_time,
            view_href,
            author,
            age,
        })
    }
}

impl FeedDocument {
    /// Convert into messages, failing the whole document on the first bad item
    pub fn into_messages(self, now: DateTime<Utc>) -> Result<Vec<Message>, FetchError> {
        let Some(data) = self.data else {
            let reason = self
                .errors
                .into_iter()
                .find_map(|e| e.message)
                .unwrap_or_else(|| "document has no `data`".to_string());
            return Err(FetchError::Api(reason));
        };

        let edges = data
            .messages
            .and_then(|connection| connection.edges)
            .ok_or_else(|| FetchError::Malformed("missing `data.messages.edges`".to_string()))?;

        edges
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let edge: Edge = serde_json::from_value(value).map_err(|e| {
                    FetchError::Malformed(format!("message {} is invalid: {}", index, e))
                })?;
                edge.node
                    .ok_or_else(|| {
                        FetchError::Malformed(format!("message {} has no `node`", index))
                    })?
                    .into_message(index, now)
            })
            .collect()
    }
}
