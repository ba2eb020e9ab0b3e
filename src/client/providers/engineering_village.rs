use super::traits::{PageRequest, PageResult, ProviderError, SearchContext, SourceProvider};
use super::{join_authors, json_count, json_string, ElsevierCredentials};
use crate::client::{fetch_json, HttpClientConfig};
use crate::reconcile::{PublicationYear, RawRecord, SourceName};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

const DOCUMENT_LINK_PREFIX: &str = "https://www.engineeringvillage.com/app/doc/?docid=";

/// Inspec database code
const INSPEC: &str = "i";

/// Engineering Village (Inspec/Compendex) provider, served by the Elsevier API
pub struct EngineeringVillageProvider {
    client: Client,
    base_url: String,
    credentials: ElsevierCredentials,
}

impl EngineeringVillageProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.elsevier.com/content/ev/results";

    /// Create a new Engineering Village provider searching Inspec
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
            .append_pair("offset", &request.start.to_string())
            .append_pair("pageSize", &request.count.to_string())
            .append_pair("database", INSPEC);

        Ok(url.to_string())
    }

    /// A page reporting zero results per page (or none at all) ends the source.
    fn parse_response(data: &Value) -> PageResult {
        let page = data.get("PAGE");
        let total = json_count(page.and_then(|p| p.get("RESULTS-COUNT")));
        let per_page = json_count(page.and_then(|p| p.get("RESULTS-PER-PAGE"))).unwrap_or(0);

        if per_page == 0 {
            return PageResult::exhausted(total);
        }

        let records = page
            .and_then(|p| p.get("PAGE-RESULTS"))
            .and_then(|r| r.get("PAGE-ENTRY"))
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("EI-DOCUMENT"))
                    .map(Self::map_document)
                    .collect()
            })
            .unwrap_or_default();

        PageResult::page(records, total)
    }

    fn map_document(document: &Value) -> RawRecord {
        let properties = document.get("DOCUMENTPROPERTIES").unwrap_or(&Value::Null);

        let authors = document
            .get("AUS")
            .and_then(|aus| aus.get("AU"))
            .and_then(Value::as_array)
            .map(|names| join_authors(names.iter().filter_map(|au| json_string(au, "NAME"))))
            .unwrap_or_default();

        let link = document
            .get("DOC")
            .and_then(|doc| json_string(doc, "DOC-ID"))
            .map(|doc_id| format!("{DOCUMENT_LINK_PREFIX}{doc_id}"));

        RawRecord {
            title: json_string(properties, "TI"),
            publication_year: properties.get("YR").and_then(PublicationYear::from_json),
            venue: json_string(properties, "SO"),
            venue_type: json_string(properties, "DT"),
            authors: Some(authors),
            link,
            ..RawRecord::default()
        }
    }
}

#[async_trait]
impl SourceProvider for EngineeringVillageProvider {
    fn source(&self) -> SourceName {
        SourceName::EngineeringVillage
    }

    fn description(&self) -> &str {
        "Engineering Village - Inspec and Compendex engineering indexes"
    }

    async fn fetch_page(
        &self,
        request: &PageRequest,
        context: &SearchContext,
    ) -> Result<PageResult, ProviderError> {
        info!("Querying Engineering Village (offset {})", request.start);

        let url = self.build_search_url(request)?;
        debug!("Engineering Village search URL: {}", url);

        let data = fetch_json(
            self.name(),
            self.credentials.apply(self.client.get(&url)),
            context,
        )
        .await?;

        let page = Self::parse_response(&data);
        info!("Fetched {} results from Engineering Village", page.records.len());
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_url() {
        let provider = EngineeringVillageProvider::new(
            &HttpClientConfig::default(),
            ElsevierCredentials::new("key", Some("token".to_string())),
        )
        .unwrap();
        let url = provider
            .build_search_url(&PageRequest::new("agile", 50, 25))
            .unwrap();

        assert!(url.contains("offset=50"));
        assert!(url.contains("pageSize=25"));
        assert!(url.contains("database=i"));
    }

    #[test]
    fn test_parse_documents() {
        let data = json!({
            "PAGE": {
                "RESULTS-COUNT": 1,
                "RESULTS-PER-PAGE": 1,
                "PAGE-RESULTS": {"PAGE-ENTRY": [{
                    "EI-DOCUMENT": {
                        "DOCUMENTPROPERTIES": {
                            "TI": "Agile documentation in aerospace",
                            "YR": "2021",
                            "SO": "Journal of Aerospace Information Systems",
                            "DT": "Journal article (JA)"
                        },
                        "AUS": {"AU": [{"NAME": "Doe, Jane"}, {"NAME": "Roe, Rick"}]},
                        "DOC": {"DOC-ID": "cpx_123"}
                    }
                }]}
            }
        });

        let page = EngineeringVillageProvider::parse_response(&data);

        assert!(!page.exhausted);
        let record = &page.records[0];
        assert_eq!(record.title.as_deref(), Some("Agile documentation in aerospace"));
        assert_eq!(record.publication_year, Some(PublicationYear::Text("2021".to_string())));
        assert_eq!(record.venue.as_deref(), Some("Journal of Aerospace Information Systems"));
        assert_eq!(record.venue_type.as_deref(), Some("Journal article (JA)"));
        assert_eq!(record.authors.as_deref(), Some("Doe, Jane, Roe, Rick"));
        assert_eq!(
            record.link.as_deref(),
            Some("https://www.engineeringvillage.com/app/doc/?docid=cpx_123")
        );
    }

    #[test]
    fn test_zero_results_per_page_is_exhausted() {
        let data = json!({"PAGE": {"RESULTS-COUNT": 0, "RESULTS-PER-PAGE": 0}});
        assert!(EngineeringVillageProvider::parse_response(&data).exhausted);
        assert!(EngineeringVillageProvider::parse_response(&json!({})).exhausted);
    }
}
