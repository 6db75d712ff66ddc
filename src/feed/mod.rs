//! Message feed: GraphQL fetch, validation and age labels
//!
//! One query per load. The response is validated as a whole: a single
//! malformed item fails the fetch, so the browser never shows a partial
//! feed.

mod age;
mod models;

pub use models::{Author, Message};

use crate::config::CommunityConfig;
use crate::session::{AuthError, SessionManager};
use crate::util::truncate_utf8_safe;
use chrono::{DateTime, Utc};
use models::FeedDocument;
use serde_json::{json, Value};
use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// GraphQL query for the newest messages
const FEED_QUERY: &str = "query($messageCount: Int!) { messages(first: $messageCount) { edges { node { id subject postTime viewHref body author { title lastName firstName } } } } }";

/// Longest error body kept from a failed query (HTML error pages are large)
const MAX_ERROR_BODY_BYTES: usize = 512;

/// Errors that can occur while loading the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Could not obtain a session token
    Auth(AuthError),
    /// Network failure talking to the community
    Transport(String),
    /// Non-success HTTP status
    Status { code: u16, body: String },
    /// GraphQL `errors` without `data`
    Api(String),
    /// Document shape or a required field was wrong
    Malformed(String),
    /// Reading or writing a local feed file
    Io(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(e) => write!(f, "{}", e),
            Self::Transport(msg) => write!(f, "Network error: {}", msg),
            Self::Status { code, body } => write!(f, "HTTP {}: {}", code, body),
            Self::Api(msg) => write!(f, "API error: {}", msg),
            Self::Malformed(msg) => write!(f, "Malformed feed: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Auth(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AuthError> for FetchError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

/// Validate a raw feed document
pub fn parse_document(document: Value, now: DateTime<Utc>) -> Result<Vec<Message>, FetchError> {
    let document: FeedDocument = serde_json::from_value(document)
        .map_err(|e| FetchError::Malformed(e.to_string()))?;
    document.into_messages(now)
}

/// Load a feed document previously written by `fetch --write-output`
pub fn load_from_file(path: &Path, now: DateTime<Utc>) -> Result<Vec<Message>, FetchError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| FetchError::Io(format!("{}: {}", path.display(), e)))?;
    let document: Value =
        serde_json::from_str(&contents).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let messages = parse_document(document, now)?;
    tracing::info!("Loaded {} messages from {}", messages.len(), path.display());
    Ok(messages)
}

/// Fetches the message feed with a session-authenticated GraphQL query
pub struct MessageRepository {
    client: reqwest::Client,
    graphql_url: String,
    session: Arc<SessionManager>,
}

impl MessageRepository {
    pub fn new(
        config: &CommunityConfig,
        client: reqwest::Client,
        session: Arc<SessionManager>,
    ) -> Self {
        Self {
            client,
            graphql_url: format!("{}/t5/s/api/2.1/graphql", config.api_base()),
            session,
        }
    }

    /// Fetch and validate up to `page_size` messages, newest first
    pub async fn fetch(&self, page_size: NonZeroU32) -> Result<Vec<Message>, FetchError> {
        let document = self.fetch_document(page_size).await?;
        let messages = parse_document(document, Utc::now())?;
        tracing::info!("Fetched {} messages", messages.len());
        Ok(messages)
    }

    /// Issue the feed query and return the document without validation
    ///
    /// A key the server rejects with 401 is replaced by a fresh login and
    /// the query is retried once.
    pub async fn fetch_document(&self, page_size: NonZeroU32) -> Result<Value, FetchError> {
        let token = self.session.get_token().await?;
        match self.query(page_size, &token.key).await {
            Err(FetchError::Status { code: 401, .. }) => {
                tracing::info!("Session key rejected, logging in again");
                self.session.authenticate().await?;
                let token = self.session.get_token().await?;
                self.query(page_size, &token.key).await
            }
            result => result,
        }
    }

    async fn query(&self, page_size: NonZeroU32, session_key: &str) -> Result<Value, FetchError> {
        tracing::debug!("POST {} (messageCount={})", self.graphql_url, page_size);

        let response = self
            .client
            .post(&self.graphql_url)
            .header("li-api-session-key", session_key)
            .header("Content-Type", "application/json")
            .header("Cache-Control", "no-cache, no-store, must-revalidate")
            .header("Pragma", "no-cache")
            .header("Expires", "0")
            .json(&json!({
                "query": FEED_QUERY,
                "variables": { "messageCount": page_size.get() },
            }))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("Feed query failed with HTTP {}", status.as_u16());
            return Err(FetchError::Status {
                code: status.as_u16(),
                body: truncate_utf8_safe(&body, MAX_ERROR_BODY_BYTES).to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

/// Where the browser gets its messages from
pub enum FeedSource {
    Remote {
        repository: MessageRepository,
        page_size: NonZeroU32,
    },
    File(PathBuf),
}

impl FeedSource {
    pub async fn load(&self) -> Result<Vec<Message>, FetchError> {
        match self {
            Self::Remote {
                repository,
                page_size,
            } => repository.fetch(*page_size).await,
            Self::File(path) => load_from_file(path, Utc::now()),
        }
    }

    /// Short description for the title bar
    pub fn describe(&self) -> String {
        match self {
            Self::Remote { page_size, .. } => format!("live feed, {} messages", page_size),
            Self::File(path) => path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PriorSession;
    use crate::test_support::{spawn_fixture, Hits};
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::Mutex;

    const LOGIN_PATH: &str = "/t5/s/restapi/vc/authentication/sessions/login";
    const GRAPHQL_PATH: &str = "/t5/s/api/2.1/graphql";

    fn node(id: &str, subject: &str) -> Value {
        json!({
            "id": id,
            "subject": subject,
            "body": "<p>Caf&eacute; &amp; <b>bold</b></p>",
            "postTime": "2026-01-05T10:00:00.000-08:00",
            "viewHref": format!("https://community.example.com/t5/m/{id}"),
            "author": {"title": "Member", "firstName": "Jo", "lastName": null}
        })
    }

    fn document(nodes: Vec<Value>) -> Value {
        let edges: Vec<Value> = nodes.into_iter().map(|n| json!({"node": n})).collect();
        json!({"data": {"messages": {"edges": edges}}})
    }

    #[derive(Clone, Default)]
    struct Captured {
        headers: Arc<Mutex<Option<HeaderMap>>>,
        body: Arc<Mutex<Option<Value>>>,
    }

    async fn login() -> Json<Value> {
        Json(json!({"response": {"value": {"$": "sess-1"}}}))
    }

    /// Login plus a GraphQL endpoint answering with `reply`
    async fn feed_fixture(status: StatusCode, reply: Value, captured: Captured) -> String {
        let graphql = move |headers: HeaderMap, Json(body): Json<Value>| {
            let captured = captured.clone();
            let reply = reply.clone();
            async move {
                *captured.headers.lock().unwrap() = Some(headers);
                *captured.body.lock().unwrap() = Some(body);
                (status, Json(reply))
            }
        };
        let router = Router::new()
            .route(LOGIN_PATH, post(login))
            .route(GRAPHQL_PATH, post(graphql));
        spawn_fixture(router).await
    }

    fn repository(base: &str) -> MessageRepository {
        let config = CommunityConfig {
            base_url: Some(base.to_string()),
            username: "reader".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        };
        let client = reqwest::Client::new();
        let session = Arc::new(SessionManager::new(&config, client.clone()));
        MessageRepository::new(&config, client, session)
    }

    fn page(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_session_and_cache_headers() {
        let captured = Captured::default();
        let base = feed_fixture(StatusCode::OK, document(vec![node("1", "a")]), captured.clone()).await;

        repository(&base).fetch(page(25)).await.expect("fetch succeeds");

        let headers = captured.headers.lock().unwrap().clone().unwrap();
        assert_eq!(headers["li-api-session-key"], "sess-1");
        assert_eq!(headers["cache-control"], "no-cache, no-store, must-revalidate");
        assert_eq!(headers["pragma"], "no-cache");
        assert_eq!(headers["expires"], "0");
        assert_eq!(headers["content-type"], "application/json");

        let body = captured.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["variables"]["messageCount"], 25);
        assert!(body["query"].as_str().unwrap().contains("messages(first: $messageCount)"));
    }

    #[tokio::test]
    async fn test_fetch_preserves_fields_and_order() {
        let nodes = vec![node("7", "Hello world"), node("3", "Other topic")];
        let base = feed_fixture(StatusCode::OK, document(nodes.clone()), Captured::default()).await;

        let messages = repository(&base).fetch(page(2)).await.unwrap();
        assert_eq!(messages.len(), 2);
        for (message, raw) in messages.iter().zip(&nodes) {
            assert_eq!(message.id, raw["id"]);
            assert_eq!(message.subject, raw["subject"]);
            assert_eq!(message.body, raw["body"]);
            assert_eq!(message.post_time, raw["postTime"]);
            assert_eq!(message.view_href, raw["viewHref"]);
            assert_eq!(message.author.title.as_deref(), Some("Member"));
            assert_eq!(message.author.first_name.as_deref(), Some("Jo"));
            assert_eq!(message.author.last_name, None);
            assert_ne!(message.age, age::UNKNOWN_AGE);
        }
    }

    #[tokio::test]
    async fn test_one_malformed_item_fails_whole_fetch() {
        let mut broken = node("2", "b");
        broken.as_object_mut().unwrap().remove("postTime");
        let nodes = vec![node("1", "a"), broken, node("3", "c")];
        let base = feed_fixture(StatusCode::OK, document(nodes), Captured::default()).await;

        let err = repository(&base).fetch(page(3)).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Malformed("message 1 is missing `postTime`".to_string())
        );
    }

    #[tokio::test]
    async fn test_wrong_type_names_item() {
        let mut broken = node("2", "b");
        broken["id"] = json!(2);
        let base = feed_fixture(StatusCode::OK, document(vec![node("1", "a"), broken]), Captured::default()).await;

        match repository(&base).fetch(page(2)).await.unwrap_err() {
            FetchError::Malformed(msg) => assert!(msg.starts_with("message 1 is invalid"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let base = feed_fixture(
            StatusCode::BAD_GATEWAY,
            json!({"error": "upstream"}),
            Captured::default(),
        )
        .await;

        match repository(&base).fetch(page(1)).await.unwrap_err() {
            FetchError::Status { code, body } => {
                assert_eq!(code, 502);
                assert!(body.contains("upstream"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_page_body_is_bounded() {
        let error_page = format!("<html><body>{}</body></html>", "é".repeat(10_000));
        let base = feed_fixture(
            StatusCode::SERVICE_UNAVAILABLE,
            json!(error_page),
            Captured::default(),
        )
        .await;

        match repository(&base).fetch(page(1)).await.unwrap_err() {
            FetchError::Status { code, body } => {
                assert_eq!(code, 503);
                assert!(body.len() <= MAX_ERROR_BODY_BYTES);
                assert!(body.contains("<html>"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_transport_error() {
        // bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let now = Utc::now();
        let config = CommunityConfig {
            base_url: Some(format!("http://{addr}")),
            prior_session: Some(PriorSession {
                key: "still-valid".to_string(),
                issued_at: now,
                last_used_at: now,
            }),
            ..Default::default()
        };
        let client = reqwest::Client::new();
        let session = Arc::new(SessionManager::new(&config, client.clone()));
        let repository = MessageRepository::new(&config, client, session);

        match repository.fetch(page(1)).await.unwrap_err() {
            FetchError::Transport(reason) => assert!(!reason.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_graphql_errors_surface_first_message() {
        let reply = json!({"errors": [{"message": "Permission denied"}, {"message": "second"}]});
        let base = feed_fixture(StatusCode::OK, reply, Captured::default()).await;

        let err = repository(&base).fetch(page(1)).await.unwrap_err();
        assert_eq!(err, FetchError::Api("Permission denied".to_string()));
    }

    #[tokio::test]
    async fn test_auth_failure_skips_query() {
        async fn rejected() -> Json<Value> {
            Json(json!({"response": {"error": {"message": "Invalid credentials"}}}))
        }
        async fn graphql(State(hits): State<Hits>) -> Json<Value> {
            hits.record();
            Json(json!({}))
        }
        let hits = Hits::default();
        let router = Router::new()
            .route(LOGIN_PATH, post(rejected))
            .route(GRAPHQL_PATH, post(graphql))
            .with_state(hits.clone());
        let base = spawn_fixture(router).await;

        let err = repository(&base).fetch(page(1)).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Auth(AuthError::Rejected("Invalid credentials".to_string()))
        );
        assert_eq!(hits.count(), 0);
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_rejected_key_triggers_one_relogin() {
        #[derive(Clone, Default)]
        struct Counters {
            logins: Hits,
            queries: Hits,
        }
        async fn login(State(c): State<Counters>) -> Json<Value> {
            let n = c.logins.record();
            Json(json!({"response": {"value": {"$": format!("sess-{n}")}}}))
        }
        async fn graphql(State(c): State<Counters>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
            c.queries.record();
            if headers["li-api-session-key"] == "sess-1" {
                (StatusCode::UNAUTHORIZED, Json(json!({"error": "expired"})))
            } else {
                (StatusCode::OK, Json(document(vec![node("1", "a")])))
            }
        }
        let counters = Counters::default();
        let router = Router::new()
            .route(LOGIN_PATH, post(login))
            .route(GRAPHQL_PATH, post(graphql))
            .with_state(counters.clone());
        let base = spawn_fixture(router).await;

        let messages = repository(&base).fetch(page(1)).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(counters.logins.count(), 2);
        assert_eq!(counters.queries.count(), 2);
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("khoros-reader-feed-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feed.json");
        let doc = document(vec![node("1", "Saved")]);
        std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

        let messages = load_from_file(&path, Utc::now()).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].subject, "Saved");

        let missing = load_from_file(&dir.join("absent.json"), Utc::now()).unwrap_err();
        assert!(matches!(missing, FetchError::Io(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_edges_is_empty_feed() {
        let messages = parse_document(document(vec![]), Utc::now()).unwrap();
        assert!(messages.is_empty());
    }
}
