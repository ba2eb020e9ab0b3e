pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod reconcile;
pub mod repositories;

pub use client::{HarvestConfig, HarvestResult, Harvester, HttpClientConfig};
pub use config::{Config, ConfigOverrides};
pub use error::{Error, Result};
pub use reconcile::{
    aggregate, filter_by_year, normalize, reconcile, PipelineReport, RawRecord, Record,
    ReconcilePipeline, Reconciliation, SourceBatch, SourceName,
};
pub use repositories::{CsvResultRepository, InMemoryResultRepository, ResultRepository, ResultStage};
