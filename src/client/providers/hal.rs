use super::traits::{PageRequest, PageResult, ProviderError, SearchContext, SourceProvider};
use super::{join_authors, json_count, json_first_string, json_string};
use crate::client::{fetch_json, HttpClientConfig};
use crate::reconcile::{PublicationYear, RawRecord, SourceName};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// Fields requested from the HAL search index
const HAL_FIELDS: &str =
    "title_s,producedDateY_i,journalTitle_s,conferenceTitle_s,docType_s,authFullName_s,uri_s";

/// HAL open archive provider (no authentication)
pub struct HalProvider {
    client: Client,
    base_url: String,
}

impl HalProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.archives-ouvertes.fr/search/";

    /// Create a new HAL provider
    pub fn new(http: &HttpClientConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http.build_client()?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
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
            .append_pair("q", &request.query)
            .append_pair("start", &request.start.to_string())
            .append_pair("rows", &request.count.to_string())
            .append_pair("wt", "json")
            .append_pair("fl", HAL_FIELDS);

        Ok(url.to_string())
    }

    fn parse_response(data: &Value) -> PageResult {
        let response = data.get("response");
        let total = json_count(response.and_then(|r| r.get("numFound")));

        let records: Vec<RawRecord> = response
            .and_then(|r| r.get("docs"))
            .and_then(Value::as_array)
            .map(|docs| docs.iter().map(Self::map_doc).collect())
            .unwrap_or_default();

        if records.is_empty() {
            PageResult::exhausted(total)
        } else {
            PageResult::page(records, total)
        }
    }

    fn map_doc(doc: &Value) -> RawRecord {
        let authors = doc
            .get("authFullName_s")
            .and_then(Value::as_array)
            .map(|names| join_authors(names.iter().filter_map(|n| n.as_str().map(str::to_string))));

        RawRecord {
            title: json_first_string(doc, "title_s"),
            publication_year: doc.get("producedDateY_i").and_then(PublicationYear::from_json),
            venue: json_string(doc, "journalTitle_s").or_else(|| json_string(doc, "conferenceTitle_s")),
            venue_type: json_string(doc, "docType_s"),
            authors,
            link: json_string(doc, "uri_s"),
            ..RawRecord::default()
        }
    }
}

#[async_trait]
impl SourceProvider for HalProvider {
    fn source(&self) -> SourceName {
        SourceName::Hal
    }

    fn description(&self) -> &str {
        "HAL - French multidisciplinary open archive"
    }

    async fn fetch_page(
        &self,
        request: &PageRequest,
        context: &SearchContext,
    ) -> Result<PageResult, ProviderError> {
        info!("Querying Hal Open Science (start {})", request.start);

        let url = self.build_search_url(request)?;
        debug!("HAL search URL: {}", url);

        let data = fetch_json(self.name(), self.client.get(&url), context).await?;

        let page = Self::parse_response(&data);
        info!("Fetched {} results from Hal Open Science", page.records.len());
        Ok(page)
    }
}
