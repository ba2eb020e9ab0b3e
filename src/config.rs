//! # Configuration
//!
//! Layered configuration: built-in defaults, then an optional TOML file,
//! then `LITREC_*` environment variables, then command-line overrides.
//!
//! Environment keys use `__` between nested keys, for example
//! `LITREC_CREDENTIALS__ELSEVIER_API_KEY` or `LITREC_SOURCES__HAL__ENABLED`.

use crate::reconcile::{SourceName, DEFAULT_MIN_YEAR};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "LITREC";

/// Largest page size any of the supported APIs accepts
pub const MAX_PAGE_SIZE: u32 = 200;

const MASK: &str = "********";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub sources: SourcesConfig,
    pub credentials: CredentialsConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Pagination and HTTP settings shared by every source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Records requested per page
    pub page_size: u32,
    /// Last start index that is still requested
    pub max_start_index: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Keep harvesting the other sources when one of them fails
    pub continue_on_failure: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            max_start_index: 300,
            timeout_secs: 30,
            user_agent: format!(
                "literature-reconciler/{} (Systematic Literature Review Tool)",
                env!("CARGO_PKG_VERSION")
            ),
            continue_on_failure: true,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings of one source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourceSettings {
    pub enabled: bool,
    /// Query in the provider's own syntax
    pub query: String,
    /// Override of the provider endpoint
    pub base_url: Option<String>,
}

impl SourceSettings {
    fn with_query(query: &str) -> Self {
        Self {
            enabled: true,
            query: query.to_string(),
            base_url: None,
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self::with_query("")
    }
}

/// Per-source settings, one table per provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourcesConfig {
    pub scopus: SourceSettings,
    pub ieee: SourceSettings,
    pub engineering_village: SourceSettings,
    pub science_direct: SourceSettings,
    pub hal: SourceSettings,
    pub acm: SourceSettings,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            scopus: SourceSettings::with_query(
                "TITLE-ABS-KEY(\"documentation\" AND \"agile\" AND \"safety-critical\")",
            ),
            ieee: SourceSettings::with_query(
                "(\"documentation\" AND \"agile\" AND \"safety-critical\")",
            ),
            engineering_village: SourceSettings::with_query(
                "((documentation) AND (agile) AND (safety-critical))",
            ),
            science_direct: SourceSettings::with_query(
                "documentation AND agile AND \"safety-critical\"",
            ),
            hal: SourceSettings::with_query(
                "documentation AND agile AND \"safety-critical\"",
            ),
            acm: SourceSettings::with_query("documentation agile safety-critical"),
        }
    }
}

impl SourcesConfig {
    /// Settings of `source`
    #[must_use]
    pub const fn get(&self, source: SourceName) -> &SourceSettings {
        match source {
            SourceName::Scopus => &self.scopus,
            SourceName::Ieee => &self.ieee,
            SourceName::EngineeringVillage => &self.engineering_village,
            SourceName::ScienceDirect => &self.science_direct,
            SourceName::Hal => &self.hal,
            SourceName::Acm => &self.acm,
        }
    }

    /// Enabled sources in union order
    #[must_use]
    pub fn enabled(&self) -> Vec<SourceName> {
        SourceName::ALL
            .into_iter()
            .filter(|source| self.get(*source).enabled)
            .collect()
    }
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Elsevier key, used by Scopus, Engineering Village and Science Direct
    pub elsevier_api_key: Option<String>,
    pub elsevier_inst_token: Option<String>,
    pub ieee_api_key: Option<String>,
    /// Contact address sent to Crossref for the ACM source
    pub crossref_mailto: Option<String>,
}

/// Where and how results are written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Unique results published before this year are dropped
    pub min_publication_year: i64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data_results"),
            min_publication_year: DEFAULT_MIN_YEAR,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings; `RUST_LOG` takes precedence over `level`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Command-line overrides applied on top of the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_dir: Option<PathBuf>,
    pub min_year: Option<i64>,
    pub log_level: Option<String>,
    pub json_logs: bool,
}

impl Config {
    /// Load configuration from defaults, `path` (or the default config file
    /// when present) and the environment. Validation is left to the caller,
    /// after command-line overrides are applied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = ::config::Config::try_from(&Self::default())?;
        let mut builder = ::config::Config::builder().add_source(defaults);

        match path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                builder = builder.add_source(::config::File::from(path).required(true));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    debug!("Looking for configuration at {}", path.display());
                    builder = builder.add_source(::config::File::from(path).required(false));
                }
            }
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Load configuration from a TOML file only, without environment
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::Parse {
            context: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// `<config dir>/literature-reconciler/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("literature-reconciler").join("config.toml"))
    }

    /// Apply command-line overrides
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(directory) = &overrides.output_dir {
            self.output.directory.clone_from(directory);
        }
        if let Some(min_year) = overrides.min_year {
            self.output.min_publication_year = min_year;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level.clone_from(level);
        }
        if overrides.json_logs {
            self.logging.format = LogFormat::Json;
        }
    }

    /// Validate settings needed by every command
    pub fn validate(&self) -> Result<()> {
        if self.search.page_size == 0 {
            return Err(invalid("search.page_size", "must be greater than zero"));
        }
        if self.search.page_size > MAX_PAGE_SIZE {
            return Err(invalid(
                "search.page_size",
                &format!("must not exceed {MAX_PAGE_SIZE}"),
            ));
        }
        if self.search.timeout_secs == 0 {
            return Err(invalid("search.timeout_secs", "must be greater than zero"));
        }
        for source in self.sources.enabled() {
            if self.sources.get(source).query.trim().is_empty() {
                return Err(invalid(
                    &format!("sources.{}.query", source.key()),
                    "enabled source needs a query",
                ));
            }
        }
        if self.output.directory.as_os_str().is_empty() {
            return Err(invalid("output.directory", "cannot be empty"));
        }
        if !(1000..=9999).contains(&self.output.min_publication_year) {
            return Err(invalid(
                "output.min_publication_year",
                "must be a four-digit year",
            ));
        }
        Ok(())
    }

    /// Validate settings needed to query the APIs
    pub fn validate_for_harvest(&self) -> Result<()> {
        self.validate()?;

        let enabled = self.sources.enabled();
        if enabled.is_empty() {
            return Err(invalid("sources", "no source is enabled"));
        }

        let needs_elsevier = enabled.iter().any(|source| {
            matches!(
                source,
                SourceName::Scopus | SourceName::EngineeringVillage | SourceName::ScienceDirect
            )
        });
        if needs_elsevier && is_blank(self.credentials.elsevier_api_key.as_deref()) {
            return Err(invalid(
                "credentials.elsevier_api_key",
                "required by Scopus, Engineering Village and Science Direct",
            ));
        }
        if enabled.contains(&SourceName::Ieee) && is_blank(self.credentials.ieee_api_key.as_deref())
        {
            return Err(invalid("credentials.ieee_api_key", "required by IEEE Xplore"));
        }
        Ok(())
    }

    /// Copy with every secret masked, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mask = |value: &Option<String>| value.as_ref().map(|_| MASK.to_string());
        let mut config = self.clone();
        config.credentials.elsevier_api_key = mask(&self.credentials.elsevier_api_key);
        config.credentials.elsevier_inst_token = mask(&self.credentials.elsevier_inst_token);
        config.credentials.ieee_api_key = mask(&self.credentials.ieee_api_key);
        config
    }
}

fn invalid(field: &str, reason: &str) -> Error {
    Error::InvalidInput {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |value| value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.search.page_size, 25);
        assert_eq!(config.search.max_start_index, 300);
        assert_eq!(config.output.directory, PathBuf::from("data_results"));
        assert_eq!(config.output.min_publication_year, 2001);
        assert_eq!(config.sources.enabled(), SourceName::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.search.page_size = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));
        config.search.page_size = MAX_PAGE_SIZE + 1;
        assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));
        config.search.page_size = 25;

        config.sources.hal.query = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidInput { ref field, .. }) if field == "sources.hal.query"));
        config.sources.hal.enabled = false;
        assert!(config.validate().is_ok());

        config.output.min_publication_year = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_harvest_validation_requires_credentials() {
        let mut config = Config::default();
        assert!(matches!(
            config.validate_for_harvest(),
            Err(Error::InvalidInput { ref field, .. }) if field == "credentials.elsevier_api_key"
        ));

        config.credentials.elsevier_api_key = Some("key".to_string());
        assert!(matches!(
            config.validate_for_harvest(),
            Err(Error::InvalidInput { ref field, .. }) if field == "credentials.ieee_api_key"
        ));

        config.sources.ieee.enabled = false;
        assert!(config.validate_for_harvest().is_ok());

        for source in SourceName::ALL {
            match source {
                SourceName::Scopus => config.sources.scopus.enabled = false,
                SourceName::Ieee => config.sources.ieee.enabled = false,
                SourceName::EngineeringVillage => config.sources.engineering_village.enabled = false,
                SourceName::ScienceDirect => config.sources.science_direct.enabled = false,
                SourceName::Hal => config.sources.hal.enabled = false,
                SourceName::Acm => config.sources.acm.enabled = false,
            }
        }
        assert!(config.validate_for_harvest().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(&ConfigOverrides {
            output_dir: Some(PathBuf::from("/tmp/out")),
            min_year: Some(2010),
            log_level: Some("debug".to_string()),
            json_logs: true,
        });

        assert_eq!(config.output.directory, PathBuf::from("/tmp/out"));
        assert_eq!(config.output.min_publication_year, 2010);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[search]
page_size = 50

[sources.acm]
enabled = false

[credentials]
elsevier_api_key = "secret"

[output]
directory = "results"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.search.page_size, 50);
        assert_eq!(config.search.max_start_index, 300);
        assert!(!config.sources.acm.enabled);
        assert!(config.sources.hal.enabled);
        assert_eq!(config.credentials.elsevier_api_key.as_deref(), Some("secret"));
        assert_eq!(config.output.directory, PathBuf::from("results"));

        let direct = Config::load_from_file(file.path()).unwrap();
        assert_eq!(direct.search.page_size, 50);
    }

    #[test]
    fn test_invalid_file_value_can_be_overridden() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[output]
min_publication_year = 20
"#
        )
        .unwrap();

        let mut config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.output.min_publication_year, 20);
        assert!(config.validate().is_err());

        config.apply_overrides(&ConfigOverrides {
            min_year: Some(2005),
            ..ConfigOverrides::default()
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = Config::default();
        config.credentials.ieee_api_key = Some("abc".to_string());

        let redacted = config.redacted();
        assert_eq!(redacted.credentials.ieee_api_key.as_deref(), Some(MASK));
        assert_eq!(redacted.credentials.elsevier_api_key, None);
    }
}
