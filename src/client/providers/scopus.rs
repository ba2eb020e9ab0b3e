use super::traits::{PageRequest, PageResult, ProviderError, SearchContext, SourceProvider};
use super::{json_count, json_string, year_from_date, ElsevierCredentials};
use crate::client::{fetch_json, HttpClientConfig};
use crate::reconcile::{RawRecord, SourceName};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// Scopus Search API provider
pub struct ScopusProvider {
    client: Client,
    base_url: String,
    credentials: ElsevierCredentials,
}

impl ScopusProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.elsevier.com/content/search/scopus";

    /// Create a new Scopus provider
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

    /// Build Scopus API URL for one page
    fn build_search_url(&self, request: &PageRequest) -> Result<String, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Other(format!("Invalid base URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("query", &request.query)
            .append_pair("start", &request.start.to_string())
            .append_pair("count", &request.count.to_string());

        Ok(url.to_string())
    }

    /// Map a Scopus search response into one page.
    ///
    /// An empty result set still carries one entry holding an `error` key,
    /// so such entries do not count as records.
    fn parse_response(data: &Value) -> PageResult {
        let results = data.get("search-results");
        let total = json_count(results.and_then(|r| r.get("opensearch:totalResults")));

        let records: Vec<RawRecord> = results
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

        if records.is_empty() {
            PageResult::exhausted(total)
        } else {
            PageResult::page(records, total)
        }
    }

    fn map_entry(entry: &Value) -> RawRecord {
        // Prefer the human-facing Scopus page over the API resource URL
        let scopus_link = entry
            .get("link")
            .and_then(Value::as_array)
            .and_then(|links| {
                links
                    .iter()
                    .find(|link| link.get("@ref").and_then(Value::as_str) == Some("scopus"))
            })
            .and_then(|link| json_string(link, "@href"));

        RawRecord {
            title: json_string(entry, "dc:title"),
            publication_year: json_string(entry, "prism:coverDate").map(|date| year_from_date(&date)),
            venue: json_string(entry, "prism:publicationName"),
            venue_type: json_string(entry, "subtypeDescription"),
            authors: json_string(entry, "dc:creator"),
            link: scopus_link.or_else(|| json_string(entry, "prism:url")),
            ..RawRecord::default()
        }
    }
}

#[async_trait]
impl SourceProvider for ScopusProvider {
    fn source(&self) -> SourceName {
        SourceName::Scopus
    }

    fn description(&self) -> &str {
        "Scopus - Elsevier abstract and citation database"
    }

    async fn fetch_page(
        &self,
        request: &PageRequest,
        context: &SearchContext,
    ) -> Result<PageResult, ProviderError> {
        info!("Querying Scopus (start {})", request.start);

        let url = self.build_search_url(request)?;
        debug!("Scopus search URL: {}", url);

        let data = fetch_json(
            self.name(),
            self.credentials.apply(self.client.get(&url)),
            context,
        )
        .await?;

        let page = Self::parse_response(&data);
        info!("Fetched {} results from Scopus", page.records.len());
        Ok(page)
    }
}
