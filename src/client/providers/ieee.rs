use super::traits::{PageRequest, PageResult, ProviderError, SearchContext, SourceProvider};
use super::{join_authors, json_count, json_string};
use crate::client::{fetch_json, HttpClientConfig};
use crate::reconcile::{PublicationYear, RawRecord, SourceName};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// IEEE Xplore Metadata API provider
pub struct IeeeProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl IeeeProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://ieeexploreapi.ieee.org/api/v1/search/articles";

    /// Create a new IEEE Xplore provider
    pub fn new(http: &HttpClientConfig, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http.build_client()?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Point the provider at another endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build IEEE API URL; the API counts records from 1
    fn build_search_url(&self, request: &PageRequest) -> Result<String, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Other(format!("Invalid base URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("querytext", &request.query)
            .append_pair("apikey", &self.api_key)
            .append_pair("start_record", &(request.start + 1).to_string())
            .append_pair("max_records", &request.count.to_string());

        Ok(url.to_string())
    }

    fn parse_response(data: &Value) -> PageResult {
        let total = json_count(data.get("total_records"));

        let records: Vec<RawRecord> = data
            .get("articles")
            .and_then(Value::as_array)
            .map(|articles| articles.iter().map(Self::map_article).collect())
            .unwrap_or_default();

        if records.is_empty() {
            PageResult::exhausted(total)
        } else {
            PageResult::page(records, total)
        }
    }

    fn map_article(article: &Value) -> RawRecord {
        let authors = article
            .get("authors")
            .and_then(|a| a.get("authors"))
            .and_then(Value::as_array)
            .map(|authors| {
                join_authors(
                    authors
                        .iter()
                        .filter(|author| author.is_object())
                        .map(|author| json_string(author, "full_name").unwrap_or_default()),
                )
            })
            .unwrap_or_default();

        RawRecord {
            title: json_string(article, "title"),
            publication_year: article
                .get("publication_year")
                .and_then(PublicationYear::from_json),
            venue: json_string(article, "publisher"),
            venue_type: json_string(article, "content_type"),
            authors: Some(authors),
            link: json_string(article, "html_url"),
            ..RawRecord::default()
        }
    }
}

#[async_trait]
impl SourceProvider for IeeeProvider {
    fn source(&self) -> SourceName {
        SourceName::Ieee
    }

    fn description(&self) -> &str {
        "IEEE Xplore - IEEE journals, conferences and standards"
    }

    async fn fetch_page(
        &self,
        request: &PageRequest,
        context: &SearchContext,
    ) -> Result<PageResult, ProviderError> {
        info!("Querying IEEE Xplore (start {})", request.start);

        let url = self.build_search_url(request)?;
        debug!("IEEE search URL built for start_record {}", request.start + 1);

        let data = fetch_json(
            self.name(),
            self.client.get(&url).header("Accept", "application/json"),
            context,
        )
        .await?;

        let page = Self::parse_response(&data);
        info!("Fetched {} results from IEEE Xplore", page.records.len());
        Ok(page)
    }
}
