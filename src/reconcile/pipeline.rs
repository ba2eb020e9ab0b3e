use super::aggregate::{aggregate, SourceBatch};
use super::reconciler::reconcile;
use super::record::SourceName;
use super::year_filter::{filter_by_year, YearCoercionError, DEFAULT_MIN_YEAR};
use crate::repositories::{ResultRepository, ResultStage};
use crate::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Summary of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Records received per source, in union order
    pub per_source: Vec<(SourceName, usize)>,
    /// Size of the full union
    pub total_records: usize,
    /// Number of distinct processed titles
    pub distinct_titles: usize,
    /// Unique rows written after the year filter
    pub unique_records: usize,
    /// Repeated rows written
    pub repeated_records: usize,
    /// Set when the year filter could not run and unique rows are unfiltered
    pub year_filter_skipped: Option<YearCoercionError>,
    pub finished_at: DateTime<Utc>,
}

/// Aggregate → reconcile → year-filter, persisting every stage
#[derive(Debug, Clone)]
pub struct ReconcilePipeline {
    repository: Arc<dyn ResultRepository>,
    min_year: i64,
}

impl ReconcilePipeline {
    pub fn new(repository: Arc<dyn ResultRepository>) -> Self {
        Self {
            repository,
            min_year: DEFAULT_MIN_YEAR,
        }
    }

    #[must_use]
    pub const fn with_min_year(mut self, min_year: i64) -> Self {
        self.min_year = min_year;
        self
    }

    #[must_use]
    pub const fn min_year(&self) -> i64 {
        self.min_year
    }

    /// Run the pipeline over batches already in union order
    #[instrument(skip_all, fields(repository = self.repository.name(), min_year = self.min_year))]
    pub async fn run(&self, batches: Vec<SourceBatch>) -> Result<PipelineReport> {
        let mut per_source = Vec::with_capacity(batches.len());
        for batch in &batches {
            self.repository
                .store_source(batch.source, &batch.tagged())
                .await?;
            per_source.push((batch.source, batch.records.len()));
        }

        let records = aggregate(batches);
        let total_records = records.len();

        let reconciliation = reconcile(records);
        let distinct_titles = reconciliation.group_count();
        self.repository
            .store_stage(ResultStage::AllResults, &reconciliation.all)
            .await?;

        let (unique, repeated) = reconciliation.into_split();

        let filtered = filter_by_year(unique, self.min_year);
        if let Some(error) = &filtered.skipped {
            warn!(
                "Unique results were written WITHOUT the publication year filter: {}",
                error
            );
        }
        self.repository
            .store_stage(ResultStage::UniqueResults, &filtered.records)
            .await?;

        self.repository
            .store_stage(ResultStage::Repeated, &repeated)
            .await?;

        let report = PipelineReport {
            per_source,
            total_records,
            distinct_titles,
            unique_records: filtered.records.len(),
            repeated_records: repeated.len(),
            year_filter_skipped: filtered.skipped,
            finished_at: Utc::now(),
        };

        info!(
            "Reconciled {} records: {} distinct titles, {} unique after year filter, {} repeated",
            report.total_records, report.distinct_titles, report.unique_records, report.repeated_records
        );

        Ok(report)
    }

    /// Rebuild batches from previously stored per-source slices
    pub async fn load_stored(&self, sources: &[SourceName]) -> Result<Vec<SourceBatch>> {
        let mut batches = Vec::with_capacity(sources.len());
        for &source in sources {
            let records = self.repository.load_source(source).await?;
            info!("Loaded {} stored records for {}", records.len(), source);
            batches.push(SourceBatch::new(source, records));
        }
        Ok(batches)
    }
}
