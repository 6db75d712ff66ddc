//! Shared test fixtures: local HTTP servers standing in for the community
//! and Gemini endpoints.

use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral localhost port and return its base URL.
///
/// The server task lives until the test runtime shuts down.
pub async fn spawn_fixture(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("local TCP listener should bind");
    let addr = listener.local_addr().expect("resolved local listener address");

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    format!("http://{addr}")
}

/// Request counter shared between a fixture handler and the test body
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    /// Record a hit and return its 1-based ordinal
    pub fn record(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
