//! Session token lifecycle for the community REST API
//!
//! Feed queries carry an `li-api-session-key` header. The key is obtained
//! from the legacy login endpoint and expires server-side, so every caller
//! goes through [`SessionManager::get_token`], which re-authenticates when
//! either of two timers has run out:
//!
//! - a sliding inactivity window (time since the token was last used)
//! - an absolute ceiling (time since the token was issued)
//!
//! The token lives behind an async mutex that is held across the whole
//! check-and-refresh path, so concurrent callers never log in twice.

use crate::config::{CommunityConfig, PriorSession};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use std::fmt;
use tokio::sync::Mutex;

/// Authentication key plus its issuance and last-use timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub key: String,
    pub issued_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl SessionToken {
    /// Token that always fails validation (no prior session)
    pub fn empty() -> Self {
        Self {
            key: String::new(),
            issued_at: DateTime::<Utc>::UNIX_EPOCH,
            last_used_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Freshly issued token: both timestamps set to `now`
    pub fn issued(key: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            issued_at: now,
            last_used_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl From<PriorSession> for SessionToken {
    fn from(prior: PriorSession) -> Self {
        Self {
            key: prior.key,
            issued_at: prior.issued_at,
            last_used_at: prior.last_used_at,
        }
    }
}

/// The two re-authentication timers
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Sliding window measured from the last use
    pub idle_timeout: TimeDelta,
    /// Absolute ceiling measured from issuance, enforced under constant use
    pub max_lifetime: TimeDelta,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            idle_timeout: TimeDelta::minutes(30),
            max_lifetime: TimeDelta::hours(2),
        }
    }
}

impl SessionPolicy {
    /// Whether `token` must be replaced before it can be used at `now`
    pub fn requires_reauth(&self, token: &SessionToken, now: DateTime<Utc>) -> bool {
        token.is_empty()
            || now - token.last_used_at > self.idle_timeout
            || now - token.issued_at > self.max_lifetime
    }
}

/// Errors from the login flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Username or password not configured; no request was made
    MissingCredentials,
    /// Network failure or non-success HTTP status
    Transport(String),
    /// The server answered with an error payload
    Rejected(String),
    /// The response could not be understood
    Malformed(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => {
                write!(f, "Username and password are required to authenticate")
            }
            Self::Transport(msg) => write!(f, "Authentication request failed: {}", msg),
            Self::Rejected(msg) => write!(f, "Authentication rejected: {}", msg),
            Self::Malformed(msg) => write!(f, "Unexpected login response: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Login response envelope
///
/// Success: `{"response": {"value": {"$": "<key>"}}}`
/// Failure: `{"response": {"error": {"message": "..."}}}`
#[derive(Debug, Deserialize)]
struct LoginResponse {
    response: LoginEnvelope,
}

#[derive(Debug, Deserialize)]
struct LoginEnvelope {
    value: Option<LoginValue>,
    error: Option<LoginError>,
}

#[derive(Debug, Deserialize)]
struct LoginValue {
    #[serde(rename = "$")]
    key: String,
}

#[derive(Debug, Deserialize)]
struct LoginError {
    message: Option<String>,
}

/// Owns the session token and performs logins
pub struct SessionManager {
    client: reqwest::Client,
    login_url: String,
    username: String,
    password: String,
    policy: SessionPolicy,
    token: Mutex<SessionToken>,
}

impl SessionManager {
    pub fn new(config: &CommunityConfig, client: reqwest::Client) -> Self {
        let login_url = format!(
            "{}/{}/s/restapi/vc/authentication/sessions/login",
            config.api_base(),
            config.tapestry.trim_matches('/')
        );

        let token = config
            .prior_session
            .clone()
            .map(SessionToken::from)
            .unwrap_or_else(SessionToken::empty);

        Self {
            client,
            login_url,
            username: config.username.clone(),
            password: config.password.clone(),
            policy: SessionPolicy::default(),
            token: Mutex::new(token),
        }
    }

    /// Return a usable token, logging in first if the current one expired
    pub async fn get_token(&self) -> Result<SessionToken, AuthError> {
        self.get_token_at(Utc::now()).await
    }

    pub(crate) async fn get_token_at(&self, now: DateTime<Utc>) -> Result<SessionToken, AuthError> {
        let mut token = self.token.lock().await;

        if self.policy.requires_reauth(&token, now) {
            tracing::info!("Session expired or missing, authenticating");
            let key = self.login().await?;
            *token = SessionToken::issued(key, now);
        } else {
            tracing::debug!("Reusing session issued at {}", token.issued_at);
            token.last_used_at = now;
        }

        Ok(token.clone())
    }

    /// Log in unconditionally and replace the held token
    ///
    /// On failure the previous token is kept as-is, so the next
    /// `get_token` call retries.
    pub async fn authenticate(&self) -> Result<(), AuthError> {
        let mut token = self.token.lock().await;
        let key = self.login().await?;
        *token = SessionToken::issued(key, Utc::now());
        Ok(())
    }

    /// Copy of the current token without touching its timestamps
    pub async fn snapshot(&self) -> SessionToken {
        self.token.lock().await.clone()
    }

    /// Perform the login request and extract the new key
    async fn login(&self) -> Result<String, AuthError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        tracing::debug!("POST {} as {}", self.login_url, self.username);

        let response = self
            .client
            .post(&self.login_url)
            .query(&[
                ("user.login", self.username.as_str()),
                ("user.password", self.password.as_str()),
                ("restapi.response_format", "json"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Malformed(e.to_string()))?;

        if let Some(error) = body.response.error {
            let message = error
                .message
                .unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!("Login rejected: {}", message);
            return Err(AuthError::Rejected(message));
        }

        match body.response.value {
            Some(value) if !value.key.is_empty() => {
                tracing::info!("Authenticated as {}", self.username);
                Ok(value.key)
            }
            _ => Err(AuthError::Malformed("response carried no session key".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_fixture, Hits};
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::time::Duration;

    const LOGIN_PATH: &str = "/t5/s/restapi/vc/authentication/sessions/login";

    fn community(base_url: &str) -> CommunityConfig {
        CommunityConfig {
            base_url: Some(base_url.to_string()),
            username: "reader".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        }
    }

    /// Login endpoint issuing "key-<n>" for the n-th request
    async fn login_fixture(hits: Hits) -> String {
        async fn handler(
            State(hits): State<Hits>,
            Query(params): Query<HashMap<String, String>>,
        ) -> Json<Value> {
            let n = hits.record();
            // widen the window for concurrent callers
            tokio::time::sleep(Duration::from_millis(50)).await;
            if params.get("user.password").map(String::as_str) != Some("secret") {
                return Json(json!({"response": {"error": {"message": "Invalid credentials"}}}));
            }
            Json(json!({"response": {"value": {"$": format!("key-{n}")}}}))
        }

        let router = Router::new()
            .route(LOGIN_PATH, post(handler))
            .with_state(hits);
        spawn_fixture(router).await
    }

    fn ago(now: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
        now - TimeDelta::minutes(minutes)
    }

    #[test]
    fn test_idle_window_requires_reauth() {
        let now = Utc::now();
        let token = SessionToken {
            key: "abc".to_string(),
            issued_at: ago(now, 60),
            last_used_at: ago(now, 31),
        };
        assert!(SessionPolicy::default().requires_reauth(&token, now));
    }

    #[test]
    fn test_absolute_ceiling_requires_reauth() {
        let now = Utc::now();
        let token = SessionToken {
            key: "abc".to_string(),
            issued_at: ago(now, 180),
            last_used_at: ago(now, 5),
        };
        assert!(SessionPolicy::default().requires_reauth(&token, now));
    }

    #[test]
    fn test_recent_token_is_valid() {
        let now = Utc::now();
        let token = SessionToken {
            key: "abc".to_string(),
            issued_at: ago(now, 10),
            last_used_at: ago(now, 5),
        };
        assert!(!SessionPolicy::default().requires_reauth(&token, now));
    }

    #[test]
    fn test_empty_key_requires_reauth() {
        let now = Utc::now();
        let token = SessionToken::issued("", now);
        assert!(SessionPolicy::default().requires_reauth(&token, now));
    }

    #[tokio::test]
    async fn test_valid_token_is_reused_and_touched() {
        let now = Utc::now();
        let mut config = community("http://127.0.0.1:9");
        config.prior_session = Some(PriorSession {
            key: "prior".to_string(),
            issued_at: ago(now, 10),
            last_used_at: ago(now, 5),
        });
        let manager = SessionManager::new(&config, reqwest::Client::new());

        let token = manager.get_token_at(now).await.expect("valid token reused");
        assert_eq!(token.key, "prior");
        assert_eq!(token.last_used_at, now);
        assert_eq!(token.issued_at, ago(now, 10));
        assert_eq!(manager.snapshot().await.last_used_at, now);
    }

    #[tokio::test]
    async fn test_expired_token_triggers_login() {
        let hits = Hits::default();
        let base = login_fixture(hits.clone()).await;
        let manager = SessionManager::new(&community(&base), reqwest::Client::new());

        let now = Utc::now();
        let token = manager.get_token_at(now).await.expect("login succeeds");
        assert_eq!(token.key, "key-1");
        assert_eq!(token.issued_at, now);
        assert_eq!(token.last_used_at, now);
        assert_eq!(hits.count(), 1);

        // second call inside the window reuses the key
        let later = now + TimeDelta::minutes(1);
        let token = manager.get_token_at(later).await.unwrap();
        assert_eq!(token.key, "key-1");
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_login_once() {
        let hits = Hits::default();
        let base = login_fixture(hits.clone()).await;
        let manager = SessionManager::new(&community(&base), reqwest::Client::new());

        let (a, b) = tokio::join!(manager.get_token(), manager.get_token());
        assert_eq!(a.unwrap().key, "key-1");
        assert_eq!(b.unwrap().key, "key-1");
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_login_carries_server_message() {
        let base = login_fixture(Hits::default()).await;
        let mut config = community(&base);
        config.password = "wrong".to_string();
        let manager = SessionManager::new(&config, reqwest::Client::new());

        let err = manager.get_token().await.unwrap_err();
        assert_eq!(err, AuthError::Rejected("Invalid credentials".to_string()));
        assert!(manager.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_old_token_and_retries() {
        async fn flaky(State(hits): State<Hits>) -> Result<Json<Value>, StatusCode> {
            match hits.record() {
                1 => Err(StatusCode::SERVICE_UNAVAILABLE),
                _ => Ok(Json(json!({"response": {"value": {"$": "fresh"}}}))),
            }
        }
        let hits = Hits::default();
        let router = Router::new()
            .route(LOGIN_PATH, post(flaky))
            .with_state(hits.clone());
        let base = spawn_fixture(router).await;

        let now = Utc::now();
        let mut config = community(&base);
        let stale = PriorSession {
            key: "stale".to_string(),
            issued_at: ago(now, 300),
            last_used_at: ago(now, 200),
        };
        config.prior_session = Some(stale.clone());
        let manager = SessionManager::new(&config, reqwest::Client::new());

        let err = manager.get_token_at(now).await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
        assert_eq!(manager.snapshot().await, SessionToken::from(stale));

        let token = manager.get_token_at(now).await.expect("retry succeeds");
        assert_eq!(token.key, "fresh");
        assert_eq!(hits.count(), 2);
    }

    #[tokio::test]
    async fn test_missing_credentials_makes_no_request() {
        let hits = Hits::default();
        let base = login_fixture(hits.clone()).await;
        let mut config = community(&base);
        config.username.clear();
        let manager = SessionManager::new(&config, reqwest::Client::new());

        let err = manager.get_token().await.unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials);
        assert_eq!(hits.count(), 0);
    }

    #[tokio::test]
    async fn test_authenticate_replaces_valid_token() {
        let base = login_fixture(Hits::default()).await;
        let now = Utc::now();
        let mut config = community(&base);
        config.prior_session = Some(PriorSession {
            key: "prior".to_string(),
            issued_at: now,
            last_used_at: now,
        });
        let manager = SessionManager::new(&config, reqwest::Client::new());

        manager.authenticate().await.expect("forced login");
        assert_eq!(manager.snapshot().await.key, "key-1");
    }
}
