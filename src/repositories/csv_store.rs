//! # CSV Result Repository
//!
//! Writes every slice and stage as a CSV file in one output directory.
//! Null values become empty cells and empty cells read back as null.
//!
//! Reading back is therefore lossy for empty strings. Science Direct reports a
//! missing cover date as an empty year, which disables the year filter during
//! `harvest`; the same row loaded by `reconcile` has no year at all, so it is
//! dropped and the filter runs normally. Pandas round-trips CSV the same way.

use super::{RepositoryError, RepositoryResult, ResultRepository, ResultStage};
use crate::reconcile::record::{PROCESSED_TITLE_COLUMN, RAW_COLUMNS, SOURCE_COLUMN};
use crate::reconcile::{PublicationYear, RawRecord, Record, SourceName};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Trailing columns written after the raw and extra columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrailingColumns {
    /// Per-source slices: `Source`
    SourceOnly,
    /// Stage outputs: `Source`, `ProcessedTitle`
    SourceAndKey,
}

/// CSV-file implementation of [`ResultRepository`]
#[derive(Debug, Clone)]
pub struct CsvResultRepository {
    directory: PathBuf,
}

impl CsvResultRepository {
    /// Create a repository rooted at `directory`; the directory is created
    /// on first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Output directory
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of a per-source slice (`<dir>/engineering_village.csv`)
    #[must_use]
    pub fn source_path(&self, source: SourceName) -> PathBuf {
        self.directory.join(format!("{}.csv", source.file_stem()))
    }

    /// Path of a stage output (`<dir>/unique_results.csv`)
    #[must_use]
    pub fn stage_path(&self, stage: ResultStage) -> PathBuf {
        self.directory.join(stage.file_name())
    }

    async fn write_file(
        &self,
        path: PathBuf,
        records: &[Record],
        trailing: TrailingColumns,
    ) -> RepositoryResult<()> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let records = records.to_vec();
        let count = records.len();
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_records(&target, &records, trailing))
            .await
            .map_err(|e| RepositoryError::Storage {
                message: format!("CSV writer task failed: {e}"),
            })??;

        info!("Wrote {} rows to {}", count, path.display());
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for CsvResultRepository {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn store_source(&self, source: SourceName, records: &[Record]) -> RepositoryResult<()> {
        self.write_file(self.source_path(source), records, TrailingColumns::SourceOnly)
            .await
    }

    async fn store_stage(&self, stage: ResultStage, records: &[Record]) -> RepositoryResult<()> {
        self.write_file(self.stage_path(stage), records, TrailingColumns::SourceAndKey)
            .await
    }

    async fn load_source(&self, source: SourceName) -> RepositoryResult<Vec<RawRecord>> {
        let path = self.source_path(source);
        if !tokio::fs::try_exists(&path).await? {
            return Err(RepositoryError::NotFound {
                entity_type: "source results".to_string(),
                id: path.display().to_string(),
            });
        }

        let target = path.clone();
        let records = tokio::task::spawn_blocking(move || read_records(&target))
            .await
            .map_err(|e| RepositoryError::Storage {
                message: format!("CSV reader task failed: {e}"),
            })??;

        debug!("Loaded {} rows from {}", records.len(), path.display());
        Ok(records)
    }
}

fn write_records(path: &Path, records: &[Record], trailing: TrailingColumns) -> RepositoryResult<()> {
    let extra_columns: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.extra.keys().map(String::as_str))
        .collect();

    let mut header: Vec<&str> = RAW_COLUMNS.to_vec();
    header.extend(extra_columns.iter().copied());
    header.push(SOURCE_COLUMN);
    if trailing == TrailingColumns::SourceAndKey {
        header.push(PROCESSED_TITLE_COLUMN);
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = record
            .raw_cells()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        row.extend(
            extra_columns
                .iter()
                .map(|column| record.extra.get(*column).cloned().unwrap_or_default()),
        );
        row.push(record.source.clone());
        if trailing == TrailingColumns::SourceAndKey {
            row.push(record.processed_title.clone());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn read_records(path: &Path) -> RepositoryResult<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let mut record = RawRecord::default();

        for (column, cell) in headers.iter().zip(row.iter()) {
            let value = (!cell.is_empty()).then(|| cell.to_string());
            match column {
                "Title" => record.title = value,
                "Publication Year" => record.publication_year = value.map(PublicationYear::Text),
                "Venue" => record.venue = value,
                "Venue Type" => record.venue_type = value,
                "Authors" => record.authors = value,
                "Link" => record.link = value,
                // Recomputed by the aggregator on every run
                SOURCE_COLUMN | PROCESSED_TITLE_COLUMN => {}
                other => {
                    record
                        .extra
                        .insert(other.to_string(), cell.to_string());
                }
            }
        }

        records.push(record);
    }

    Ok(records)
}
