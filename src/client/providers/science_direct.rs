use super::traits::{PageRequest, PageResult, ProviderError, SearchContext, SourceProvider};
use super::{json_count, json_string, year_from_date, ElsevierCredentials};
use crate::client::{fetch_json, HttpClientConfig};
use crate::reconcile::{RawRecord, SourceName};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// ScienceDirect Search API provider
pub struct ScienceDirectProvider {
    client: Client,
    base_url: String,
    credentials: ElsevierCredentials,
}

impl ScienceDirectProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.elsevier.com/content/search/sciencedirect";

    /// Create a new ScienceDirect provider
    pub fn new(http: &HttpClientConfig, credentials: ElsevierCredentials) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http.build_client()?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            credentials,
        })
    }

    /// Point the provider at another endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_search_url(&self, request: &PageRequest) -> Result<String, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Other(format!("Invalid base URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("query", &request.query)
            .append_pair("start", &request.start.to_string())
            .append_pair("count", &request.count.to_string());

        Ok(url.to_string())
    }

    /// ScienceDirect keeps answering past the end of the result set, so the
    /// page is judged against `opensearch:totalResults` instead of its size.
    fn parse_response(data: &Value, start: u32) -> PageResult {
        let results = data.get("search-results");
        let total = json_count(results.and_then(|r| r.get("opensearch:totalResults")));

        match total {
            Some(total) if u64::from(start) <= total => {}
            _ => return PageResult::exhausted(total),
        }

        let records = results
            .and_then(|r| r.get("entry"))
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.get("error").is_none())
                    .map(Self::map_entry)
                    .collect()
            })
            .unwrap_or_default();

        PageResult::page(records, total)
    }

    fn map_entry(entry: &Value) -> RawRecord {
        let cover_date = json_string(entry, "prism:coverDate").unwrap_or_default();

        RawRecord {
            title: json_string(entry, "dc:title"),
            publication_year: Some(year_from_date(&cover_date)),
            venue: json_string(entry, "prism:publicationName"),
            venue_type: None,
            authors: json_string(entry, "dc:creator"),
            link: json_string(entry, "prism:url"),
            ..RawRecord::default()
        }
    }
}

#[async_trait]
impl SourceProvider for ScienceDirectProvider {
    fn source(&self) -> SourceName {
        SourceName::ScienceDirect
    }

    fn description(&self) -> &str {
        "ScienceDirect - Elsevier full-text journals and books"
    }

    async fn fetch_page(
        &self,
        request: &PageRequest,
        context: &SearchContext,
    ) -> Result<PageResult, ProviderError> {
        info!("Querying Science Direct (start {})", request.start);

        let url = self.build_search_url(request)?;
        debug!("Science Direct search URL: {}", url);

        let data = fetch_json(
            self.name(),
            self.credentials.apply(self.client.get(&url)),
            context,
        )
        .await?;

        let page = Self::parse_response(&data, request.start);
        info!("Fetched {} results from Science Direct", page.records.len());
        Ok(page)
    }
}
