use crate::reconcile::{RawRecord, SourceName};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// One page of a paginated search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Query string in the provider's syntax
    pub query: String,
    /// Zero-based index of the first record
    pub start: u32,
    /// Records per page
    pub count: u32,
}

impl PageRequest {
    pub fn new(query: impl Into<String>, start: u32, count: u32) -> Self {
        Self {
            query: query.into(),
            start,
            count,
        }
    }
}

/// Context for search operations
#[derive(Debug, Clone)]
pub struct SearchContext {
    /// Timeout for one request
    pub timeout: Duration,
    /// Additional headers
    pub headers: HashMap<String, String>,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            headers: HashMap::new(),
        }
    }
}

/// Result of fetching one page from a source provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    /// Records of this page, in API order
    pub records: Vec<RawRecord>,
    /// Total number of results available (if known)
    pub total_available: Option<u64>,
    /// The source has no more data; `records` must not be used
    pub exhausted: bool,
}

impl PageResult {
    /// A page with data
    #[must_use]
    pub const fn page(records: Vec<RawRecord>, total_available: Option<u64>) -> Self {
        Self {
            records,
            total_available,
            exhausted: false,
        }
    }

    /// Signal that the source has nothing left
    #[must_use]
    pub const fn exhausted(total_available: Option<u64>) -> Self {
        Self {
            records: Vec::new(),
            total_available,
            exhausted: true,
        }
    }
}

/// Errors that can occur during provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Timeout occurred")]
    Timeout,

    #[error("Provider error: {0}")]
    Other(String),
}

/// Trait for literature-search source adapters
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Source this provider tags its records with
    fn source(&self) -> SourceName;

    /// Unique name/identifier for this provider
    fn name(&self) -> &str {
        self.source().key()
    }

    /// Human-readable description of the provider
    fn description(&self) -> &str;

    /// Fetch one page and map it into raw records
    async fn fetch_page(
        &self,
        request: &PageRequest,
        context: &SearchContext,
    ) -> Result<PageResult, ProviderError>;
}
