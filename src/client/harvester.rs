use crate::client::providers::{
    AcmProvider, ElsevierCredentials, EngineeringVillageProvider, HalProvider, IeeeProvider,
    PageRequest, ProviderError, ScienceDirectProvider, ScopusProvider, SearchContext,
    SourceProvider,
};
use crate::client::HttpClientConfig;
use crate::config::Config;
use crate::reconcile::{RawRecord, SourceBatch, SourceName};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Configuration for the paginated polling loop
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Records requested per page
    pub page_size: u32,
    /// Last start index that is still requested
    pub max_start_index: u32,
    /// Timeout for each page request
    pub request_timeout: Duration,
    /// Whether to keep polling other sources when one fails
    pub continue_on_failure: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            max_start_index: 300,
            request_timeout: Duration::from_secs(30),
            continue_on_failure: true,
        }
    }
}

impl HarvestConfig {
    /// Build from the `[search]` section of the configuration
    #[must_use]
    pub fn from_search(search: &crate::config::SearchConfig) -> Self {
        Self {
            page_size: search.page_size,
            max_start_index: search.max_start_index,
            request_timeout: search.timeout(),
            continue_on_failure: search.continue_on_failure,
        }
    }
}

/// Outcome of one harvest run
#[derive(Debug, Clone)]
pub struct HarvestResult {
    /// One batch per registered source, in registration order
    pub batches: Vec<SourceBatch>,
    /// Errors from sources that were deactivated after a failure
    pub provider_errors: HashMap<SourceName, String>,
    /// Number of page requests sent
    pub pages_fetched: usize,
    /// Total harvest time
    pub total_harvest_time: Duration,
}

impl HarvestResult {
    /// Total number of records across all batches
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.batches.iter().map(|batch| batch.records.len()).sum()
    }
}

struct RegisteredSource {
    provider: Arc<dyn SourceProvider>,
    query: String,
}

/// Sequential paginated poller over the registered source providers
pub struct Harvester {
    sources: Vec<RegisteredSource>,
    config: HarvestConfig,
}

impl Harvester {
    /// Create a harvester without providers
    #[must_use]
    pub const fn new(config: HarvestConfig) -> Self {
        Self {
            sources: Vec::new(),
            config,
        }
    }

    /// Create a harvester with every enabled source of `app_config`, in
    /// union order
    pub fn from_config(app_config: &Config) -> Result<Self, ProviderError> {
        let http = HttpClientConfig::from_search(&app_config.search);
        let credentials = &app_config.credentials;
        let mut harvester = Self::new(HarvestConfig::from_search(&app_config.search));

        let elsevier = || {
            credentials
                .elsevier_api_key
                .clone()
                .map(|key| ElsevierCredentials::new(key, credentials.elsevier_inst_token.clone()))
                .ok_or_else(|| ProviderError::Auth("Elsevier API key is not configured".to_string()))
        };

        for source in app_config.sources.enabled() {
            let settings = app_config.sources.get(source);
            let base_url = settings.base_url.clone();

            let provider: Arc<dyn SourceProvider> = match source {
                SourceName::Scopus => {
                    let provider = ScopusProvider::new(&http, elsevier()?)?;
                    Arc::new(match base_url {
                        Some(url) => provider.with_base_url(url),
                        None => provider,
                    })
                }
                SourceName::Ieee => {
                    let key = credentials.ieee_api_key.clone().ok_or_else(|| {
                        ProviderError::Auth("IEEE API key is not configured".to_string())
                    })?;
                    let provider = IeeeProvider::new(&http, key)?;
                    Arc::new(match base_url {
                        Some(url) => provider.with_base_url(url),
                        None => provider,
                    })
                }
                SourceName::EngineeringVillage => {
                    let provider = EngineeringVillageProvider::new(&http, elsevier()?)?;
                    Arc::new(match base_url {
                        Some(url) => provider.with_base_url(url),
                        None => provider,
                    })
                }
                SourceName::ScienceDirect => {
                    let provider = ScienceDirectProvider::new(&http, elsevier()?)?;
                    Arc::new(match base_url {
                        Some(url) => provider.with_base_url(url),
                        None => provider,
                    })
                }
                SourceName::Hal => {
                    let provider = HalProvider::new(&http)?;
                    Arc::new(match base_url {
                        Some(url) => provider.with_base_url(url),
                        None => provider,
                    })
                }
                SourceName::Acm => {
                    let provider = AcmProvider::new(&http, credentials.crossref_mailto.clone())?;
                    Arc::new(match base_url {
                        Some(url) => provider.with_base_url(url),
                        None => provider,
                    })
                }
            };

            harvester = harvester.with_provider(provider, settings.query.clone());
        }

        info!(
            "Initialized harvester with {} providers",
            harvester.sources.len()
        );

        Ok(harvester)
    }

    /// Register a provider; sources are polled in registration order
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn SourceProvider>, query: impl Into<String>) -> Self {
        self.sources.push(RegisteredSource {
            provider,
            query: query.into(),
        });
        self
    }

    /// Registered sources in polling order
    #[must_use]
    pub fn sources(&self) -> Vec<SourceName> {
        self.sources.iter().map(|s| s.provider.source()).collect()
    }

    #[must_use]
    pub const fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Poll every source page by page until all are exhausted or failed,
    /// or the start index passes `max_start_index`.
    ///
    /// One request is in flight at a time. A failed source is dropped from
    /// the rest of the run and keeps the records it already returned,
    /// unless `continue_on_failure` is off, in which case the error ends
    /// the harvest.
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub async fn harvest(&self) -> Result<HarvestResult, ProviderError> {
        let start_time = Instant::now();
        let context = SearchContext {
            timeout: self.config.request_timeout,
            ..SearchContext::default()
        };

        let mut active = vec![true; self.sources.len()];
        let mut collected: Vec<Vec<RawRecord>> = vec![Vec::new(); self.sources.len()];
        let mut provider_errors = HashMap::new();
        let mut pages_fetched = 0;
        let mut start: u32 = 0;

        while active.contains(&true) && start <= self.config.max_start_index {
            info!("Fetching results starting from index {}", start);

            for (index, registered) in self.sources.iter().enumerate() {
                if !active[index] {
                    continue;
                }

                let provider = &registered.provider;
                let source = provider.source();
                let request = PageRequest::new(registered.query.clone(), start, self.config.page_size);
                pages_fetched += 1;

                let result = timeout(
                    self.config.request_timeout,
                    provider.fetch_page(&request, &context),
                )
                .await
                .unwrap_or(Err(ProviderError::Timeout));

                match result {
                    Ok(page) if page.exhausted => {
                        info!("No more results from {}", source);
                        active[index] = false;
                    }
                    Ok(page) => {
                        debug!(
                            "{} returned {} records at start {}",
                            source,
                            page.records.len(),
                            start
                        );
                        collected[index].extend(page.records);
                    }
                    Err(error) => {
                        warn!("Provider {} failed: {}", source, error);
                        active[index] = false;
                        if !self.config.continue_on_failure {
                            return Err(error);
                        }
                        provider_errors.insert(source, error.to_string());
                    }
                }
            }

            start = start.saturating_add(self.config.page_size);
        }

        let batches: Vec<SourceBatch> = self
            .sources
            .iter()
            .zip(collected)
            .map(|(registered, records)| SourceBatch::new(registered.provider.source(), records))
            .collect();

        let result = HarvestResult {
            batches,
            provider_errors,
            pages_fetched,
            total_harvest_time: start_time.elapsed(),
        };

        info!(
            "Harvest completed: {} records from {} sources in {:?} ({} pages, {} failed sources)",
            result.total_records(),
            result.batches.len(),
            result.total_harvest_time,
            result.pages_fetched,
            result.provider_errors.len()
        );

        Ok(result)
    }
}
