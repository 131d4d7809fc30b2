//! Remote reference resolution for anyload.
//!
//! This crate provides:
//! - [`extract_address`] — the address grammar consumed from input strings
//!   (`https?://…`, or a `url(...)` wrapper with single/double/no quoting)
//! - [`Fetcher`] — the fetch-by-address collaborator boundary
//! - [`HttpFetcher`] — the default `reqwest`-backed implementation
//!
//! A fetch never returns an error directly: failure is data
//! ([`FetchOutcome::Failed`]), and the caller applies the configured
//! [`FetchPolicy`](anyload_shared::FetchPolicy).

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use anyload_shared::{AnyloadError, FetchConfig, Result};

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("anyload/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Address grammar
// ---------------------------------------------------------------------------

/// Matches the address grammar at the start of a string:
/// `https?://<rest>` | `url('<text>')` | `url("<text>")` | `url(<text>)`.
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:(https?://.+)|url\(\s*'([^']*)'\s*\)|url\(\s*"([^"]*)"\s*\)|url\(\s*([^)'"]*?)\s*\))"#,
    )
    .expect("address regex")
});

/// Extract a remote address from the start of `text`, if one is present.
///
/// The unquoted `url(...)` form is trimmed. An empty address (e.g. `url()`)
/// extracts as nothing.
pub fn extract_address(text: &str) -> Option<String> {
    let caps = ADDRESS_RE.captures(text)?;
    (1..=4)
        .filter_map(|i| caps.get(i))
        .map(|m| m.as_str())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Fetcher boundary
// ---------------------------------------------------------------------------

/// Result of fetching one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The resource was retrieved as text.
    Text(String),
    /// The fetch failed; the reason is reported per the configured policy.
    Failed(String),
}

/// Fetch-by-address collaborator consumed by the parser.
///
/// Implementations must be shareable across concurrent loads; the default is
/// [`HttpFetcher`], tests substitute in-memory stubs.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the content behind `address`.
    async fn fetch(&self, address: &str) -> FetchOutcome;
}

/// HTTP fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given fetch configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(config.redirect_limit))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnyloadError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, address: &str) -> FetchOutcome {
        // Relative or malformed addresses never hit the network.
        let url = match Url::parse(address) {
            Ok(url) => url,
            Err(e) => {
                debug!(%address, "not a fetchable URL");
                return FetchOutcome::Failed(e.to_string());
            }
        };

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%address, error = %e, "fetch failed");
                return FetchOutcome::Failed(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%address, %status, "fetch returned non-success status");
            return FetchOutcome::Failed(format!("HTTP {status}"));
        }

        match response.text().await {
            Ok(body) => {
                debug!(%address, len = body.len(), "fetched remote content");
                FetchOutcome::Text(body)
            }
            Err(e) => FetchOutcome::Failed(format!("body read failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_http_addresses() {
        assert_eq!(
            extract_address("https://example.com/data.json"),
            Some("https://example.com/data.json".into())
        );
        assert_eq!(
            extract_address("http://example.com"),
            Some("http://example.com".into())
        );
    }

    #[test]
    fn extracts_url_wrappers() {
        assert_eq!(
            extract_address("url('data/data.json')"),
            Some("data/data.json".into())
        );
        assert_eq!(
            extract_address(r#"url( "data/data.html" )"#),
            Some("data/data.html".into())
        );
        assert_eq!(
            extract_address("url( wrong.uri )"),
            Some("wrong.uri".into())
        );
    }

    #[test]
    fn non_addresses_extract_nothing() {
        assert_eq!(extract_address("plain"), None);
        assert_eq!(extract_address("ftp://example.com"), None);
        assert_eq!(extract_address("url()"), None);
    }

    #[tokio::test]
    async fn fetches_text_from_mock_server() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/data.txt"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let outcome = fetcher.fetch(&format!("{}/data.txt", server.uri())).await;
        assert_eq!(outcome, FetchOutcome::Text("hello".into()));
    }

    #[tokio::test]
    async fn non_success_status_fails() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/missing"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let outcome = fetcher.fetch(&format!("{}/missing", server.uri())).await;
        assert!(matches!(outcome, FetchOutcome::Failed(reason) if reason.contains("404")));
    }

    #[tokio::test]
    async fn malformed_address_fails_without_network() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let outcome = fetcher.fetch("wrong.uri").await;
        assert!(matches!(outcome, FetchOutcome::Failed(_)));
    }
}
