use super::traits::{PageRequest, PageResult, ProviderError, SearchContext, SourceProvider};
use super::{join_authors, json_count, json_first_string, json_string};
use crate::client::{fetch_json, HttpClientConfig};
use crate::reconcile::{PublicationYear, RawRecord, SourceName};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// Crossref member id of the Association for Computing Machinery
const ACM_MEMBER_FILTER: &str = "member:320";

/// ACM Digital Library provider.
///
/// The ACM DL has no public search API; its metadata is read from Crossref
/// restricted to ACM-deposited works.
pub struct AcmProvider {
    client: Client,
    base_url: String,
    mailto: Option<String>,
}

impl AcmProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.crossref.org/works";

    /// Create a new ACM provider; `mailto` joins the Crossref polite pool
    pub fn new(http: &HttpClientConfig, mailto: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http.build_client()?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            mailto,
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

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("query", &request.query)
                .append_pair("filter", ACM_MEMBER_FILTER)
                .append_pair("offset", &request.start.to_string())
                .append_pair("rows", &request.count.to_string());
            if let Some(mailto) = &self.mailto {
                query.append_pair("mailto", mailto);
            }
        }

        Ok(url.to_string())
    }

    fn parse_response(data: &Value) -> PageResult {
        let message = data.get("message");
        let total = json_count(message.and_then(|m| m.get("total-results")));

        let records: Vec<RawRecord> = message
            .and_then(|m| m.get("items"))
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Self::map_item).collect())
            .unwrap_or_default();

        if records.is_empty() {
            PageResult::exhausted(total)
        } else {
            PageResult::page(records, total)
        }
    }

    fn map_item(item: &Value) -> RawRecord {
        let year = item
            .get("issued")
            .and_then(|issued| issued.get("date-parts"))
            .and_then(|parts| parts.get(0))
            .and_then(|first| first.get(0))
            .and_then(PublicationYear::from_json);

        let authors = item.get("author").and_then(Value::as_array).map(|authors| {
            join_authors(authors.iter().map(|author| {
                let given = json_string(author, "given").unwrap_or_default();
                let family = json_string(author, "family").unwrap_or_default();
                format!("{given} {family}").trim().to_string()
            }))
        });

        RawRecord {
            title: json_first_string(item, "title"),
            publication_year: year,
            venue: json_first_string(item, "container-title"),
            venue_type: json_string(item, "type"),
            authors,
            link: json_string(item, "URL"),
            ..RawRecord::default()
        }
    }
}

#[async_trait]
impl SourceProvider for AcmProvider {
    fn source(&self) -> SourceName {
        SourceName::Acm
    }

    fn description(&self) -> &str {
        "ACM Digital Library - ACM journals and proceedings via Crossref"
    }

    async fn fetch_page(
        &self,
        request: &PageRequest,
        context: &SearchContext,
    ) -> Result<PageResult, ProviderError> {
        info!("Querying ACM Digital Library (offset {})", request.start);

        let url = self.build_search_url(request)?;
        debug!("ACM search URL: {}", url);

        let data = fetch_json(self.name(), self.client.get(&url), context).await?;

        let page = Self::parse_response(&data);
        info!("Fetched {} results from ACM Digital Library", page.records.len());
        Ok(page)
    }
}
