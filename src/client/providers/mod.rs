pub mod acm;
pub mod engineering_village;
pub mod hal;
pub mod ieee;
pub mod science_direct;
pub mod scopus;
pub mod traits;

pub use acm::AcmProvider;
pub use engineering_village::EngineeringVillageProvider;
pub use hal::HalProvider;
pub use ieee::IeeeProvider;
pub use science_direct::ScienceDirectProvider;
pub use scopus::ScopusProvider;
pub use traits::{PageRequest, PageResult, ProviderError, SearchContext, SourceProvider};

use crate::reconcile::PublicationYear;
use reqwest::RequestBuilder;
use serde_json::Value;

/// Author separator inside the `Authors` column
pub const AUTHOR_SEPARATOR: &str = ", ";

/// API key and optional institutional token for the Elsevier APIs
#[derive(Debug, Clone)]
pub struct ElsevierCredentials {
    pub api_key: String,
    pub inst_token: Option<String>,
}

impl ElsevierCredentials {
    pub fn new(api_key: impl Into<String>, inst_token: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            inst_token,
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("Accept", "application/json")
            .header("X-ELS-APIKey", &self.api_key);
        match &self.inst_token {
            Some(token) => request.header("X-ELS-Insttoken", token),
            None => request,
        }
    }
}

/// String at `key`; numbers are rendered, everything else is absent
fn json_string(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First string of an array at `key`, or the string itself
fn json_first_string(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Non-negative count that some APIs send as a string
fn json_count(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Year part of an ISO date (`2019-05-01` → `2019`), kept as text
fn year_from_date(date: &str) -> PublicationYear {
    PublicationYear::Text(date.split('-').next().unwrap_or_default().to_string())
}

/// Join names with [`AUTHOR_SEPARATOR`]; no names gives an empty string
fn join_authors<I>(names: I) -> String
where
    I: IntoIterator<Item = String>,
{
    names.into_iter().collect::<Vec<_>>().join(AUTHOR_SEPARATOR)
}
