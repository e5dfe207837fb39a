//! Integration tests for the Address API.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (memory store, no external services)
//! cargo test -p address-api-integration-tests
//!
//! # PostgreSQL-backed tests
//! ADDRESS_API_TEST_DATABASE_URL=postgres://localhost/address_test \
//!     cargo test -p address-api-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `address_api` - HTTP contract of `/address` against the memory store
//! - `address_postgres` - Same flows against a real database

use address_api_server::build_router;
use address_api_server::state::AppState;

/// A server running on an OS-assigned local port.
pub struct TestServer {
    /// Base URL, e.g. `http://127.0.0.1:54321`.
    pub base_url: String,
    /// HTTP client for talking to the server.
    pub client: reqwest::Client,
}

impl TestServer {
    /// Spawn the full router over `state` in a background task.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn(state: AppState) -> Self {
        let app = build_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener
            .local_addr()
            .expect("Failed to read local address")
            .port();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Test server error");
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            client: reqwest::Client::new(),
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// A request body with every required field valid.
#[must_use]
pub fn valid_address() -> serde_json::Value {
    serde_json::json!({
        "street": "742 Evergreen Terrace",
        "city": "Springfield",
        "state": "Oregon",
        "zipCode": "97403",
        "country": "US"
    })
}
