pub mod harvester;
pub mod providers;

pub use harvester::{HarvestConfig, HarvestResult, Harvester};
pub use providers::{PageRequest, PageResult, ProviderError, SearchContext, SourceProvider};

use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{debug, error};

/// HTTP client configuration shared by every source adapter
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout duration
    pub timeout: Duration,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!(
                "literature-reconciler/{} (Systematic Literature Review Tool)",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

impl HttpClientConfig {
    /// Build from the `[search]` section of the configuration
    #[must_use]
    pub fn from_search(search: &crate::config::SearchConfig) -> Self {
        Self {
            timeout: search.timeout(),
            user_agent: search.user_agent.clone(),
            ..Self::default()
        }
    }

    /// Build a `reqwest` client with these settings
    pub fn build_client(&self) -> Result<Client, ProviderError> {
        Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| ProviderError::Other(format!("Failed to create HTTP client: {e}")))
    }
}

/// Send a prepared request and decode its JSON body.
///
/// Non-success statuses are mapped onto [`ProviderError`] variants; nothing
/// is retried.
pub(crate) async fn fetch_json(
    provider: &str,
    mut request: RequestBuilder,
    context: &SearchContext,
) -> Result<serde_json::Value, ProviderError> {
    for (key, value) in &context.headers {
        request = request.header(key, value);
    }

    let response = request
        .timeout(context.timeout)
        .send()
        .await
        .map_err(|e| {
            error!("{} request failed: {}", provider, e);
            if e.is_timeout() {
                ProviderError::Timeout
            } else if e.is_connect() {
                ProviderError::Network(format!("Connection failed: {e}"))
            } else {
                ProviderError::Network(format!("Request failed: {e}"))
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(match status.as_u16() {
            401 | 403 => ProviderError::Auth(format!("{provider} rejected credentials: HTTP {status}")),
            429 => ProviderError::RateLimit,
            503 => ProviderError::ServiceUnavailable(format!(
                "{provider} service temporarily unavailable"
            )),
            _ => ProviderError::Network(format!("HTTP {status}: {error_text}")),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Network(format!("Failed to read response: {e}")))?;
    debug!("{} response: {} bytes", provider, body.len());

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::Parse(format!("{provider} returned invalid JSON: {e}")))
}
