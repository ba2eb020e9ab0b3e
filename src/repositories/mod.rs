//! # Result Repositories
//!
//! Persistence of pipeline output, kept behind a trait so the pipeline does
//! not care whether results end up in CSV files or in memory.
//!
//! ## Layout
//!
//! - One file per source with the records exactly as that source returned
//!   them, tagged with `Source`.
//! - One file per [`ResultStage`]: all results, unique results, repeated.
//!
//! ## Usage Example
//!
//! ```no_run
//! use literature_reconciler::reconcile::{RawRecord, Record, SourceName};
//! use literature_reconciler::repositories::{CsvResultRepository, ResultRepository, ResultStage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = CsvResultRepository::new("data_results");
//!
//! let record = Record::from_raw(RawRecord::titled("Docs Agility"), "Scopus");
//! repository.store_source(SourceName::Scopus, &[record.clone()]).await?;
//! repository.store_stage(ResultStage::AllResults, &[record]).await?;
//!
//! let reloaded = repository.load_source(SourceName::Scopus).await?;
//! assert_eq!(reloaded.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod csv_store;
pub mod memory;

pub use csv_store::CsvResultRepository;
pub use memory::InMemoryResultRepository;

use crate::reconcile::{RawRecord, Record, SourceName};
use async_trait::async_trait;
use std::fmt::{self, Debug};

/// Common repository error types
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for RepositoryError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            Self::Storage {
                message: err.to_string(),
            }
        } else {
            Self::Serialization {
                message: err.to_string(),
            }
        }
    }
}

/// Repository result type
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Output stages of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultStage {
    /// Full union before deduplication, provenance merged per title
    AllResults,
    /// One row per processed title, year-filtered
    UniqueResults,
    /// One row per processed title seen more than once
    Repeated,
}

impl ResultStage {
    pub const ALL: [Self; 3] = [Self::AllResults, Self::UniqueResults, Self::Repeated];

    /// File name used by file-backed repositories
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::AllResults => "all_results.csv",
            Self::UniqueResults => "unique_results.csv",
            Self::Repeated => "repeated.csv",
        }
    }
}

impl fmt::Display for ResultStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AllResults => "all results",
            Self::UniqueResults => "unique results",
            Self::Repeated => "repeated",
        };
        f.write_str(name)
    }
}

/// Storage for per-source slices and stage outputs
#[async_trait]
pub trait ResultRepository: Send + Sync + Debug {
    /// Returns the name of the repository for logging and debugging
    fn name(&self) -> &'static str;

    /// Persist the records one source returned, tagged with that source
    async fn store_source(&self, source: SourceName, records: &[Record]) -> RepositoryResult<()>;

    /// Persist the output of one pipeline stage, replacing any previous run
    async fn store_stage(&self, stage: ResultStage, records: &[Record]) -> RepositoryResult<()>;

    /// Read back a stored per-source slice
    async fn load_source(&self, source: SourceName) -> RepositoryResult<Vec<RawRecord>>;
}
