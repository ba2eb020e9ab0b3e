use super::record::Record;
use tracing::{debug, warn};

/// Earliest publication year kept in the unique results by default
pub const DEFAULT_MIN_YEAR: i64 = 2001;

/// A publication year that could not be read as an integer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("publication year {value:?} of record {title:?} cannot be converted to an integer")]
pub struct YearCoercionError {
    pub value: String,
    pub title: Option<String>,
}

/// Result of [`filter_by_year`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearFilterOutcome {
    pub records: Vec<Record>,
    /// Set when the filter gave up and returned its input unchanged
    pub skipped: Option<YearCoercionError>,
}

impl YearFilterOutcome {
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Keep records published in `min_year` or later.
///
/// Records without a year are dropped. If any present year is not an
/// integer the whole filter is skipped: the input comes back unchanged and
/// the offending value is reported in the outcome. Callers must surface
/// that, because the year cut-off did not happen for the run.
#[must_use]
pub fn filter_by_year(records: Vec<Record>, min_year: i64) -> YearFilterOutcome {
    let mut years = Vec::with_capacity(records.len());

    for record in &records {
        let Some(year) = &record.publication_year else {
            years.push(None);
            continue;
        };

        if let Some(year) = year.as_integer() {
            years.push(Some(year));
        } else {
            let error = YearCoercionError {
                value: year.to_string(),
                title: record.title.clone(),
            };
            warn!("Year filter skipped, returning records unfiltered: {}", error);
            return YearFilterOutcome {
                records,
                skipped: Some(error),
            };
        }
    }

    let before = records.len();
    let kept: Vec<Record> = records
        .into_iter()
        .zip(years)
        .filter(|(_, year)| year.is_some_and(|year| year >= min_year))
        .map(|(record, _)| record)
        .collect();

    debug!(
        "Year filter kept {} of {} records (min year {})",
        kept.len(),
        before,
        min_year
    );

    YearFilterOutcome {
        records: kept,
        skipped: None,
    }
}
