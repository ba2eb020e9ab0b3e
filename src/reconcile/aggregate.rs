use super::record::{RawRecord, Record, SourceName};
use tracing::debug;

/// Records returned by one source adapter, in the adapter's order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBatch {
    pub source: SourceName,
    pub records: Vec<RawRecord>,
}

impl SourceBatch {
    pub const fn new(source: SourceName, records: Vec<RawRecord>) -> Self {
        Self { source, records }
    }

    /// Tag every record of this batch with the batch source
    #[must_use]
    pub fn tagged(&self) -> Vec<Record> {
        self.records
            .iter()
            .cloned()
            .map(|raw| Record::from_raw(raw, self.source.display_name()))
            .collect()
    }
}

/// Union all batches into one flat sequence.
///
/// Batches are taken in the order given and records keep their adapter
/// order. Each record is tagged with its source and gets its processed
/// title; nothing is deduplicated here.
pub fn aggregate<I>(batches: I) -> Vec<Record>
where
    I: IntoIterator<Item = SourceBatch>,
{
    let mut all = Vec::new();

    for batch in batches {
        debug!(
            "Aggregating {} records from {}",
            batch.records.len(),
            batch.source
        );
        let source = batch.source.display_name();
        all.extend(
            batch
                .records
                .into_iter()
                .map(|raw| Record::from_raw(raw, source)),
        );
    }

    all
}
