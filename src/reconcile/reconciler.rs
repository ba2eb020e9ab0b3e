use super::record::Record;
use std::collections::HashMap;
use tracing::debug;

/// Separator between provider names in a merged `Source` value
pub const PROVENANCE_SEPARATOR: &str = ", ";

/// Outcome of grouping the aggregate by processed title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Full union in input order, every row carrying its group's merged source
    pub all: Vec<Record>,
    /// One representative per group, in group-first-seen order
    pub unique: Vec<Record>,
    /// Representatives of groups with more than one member
    pub repeated: Vec<Record>,
    group_sizes: Vec<usize>,
}

impl Reconciliation {
    /// Member count of each group, aligned with `unique`
    #[must_use]
    pub fn group_sizes(&self) -> &[usize] {
        &self.group_sizes
    }

    /// Number of distinct processed titles
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.group_sizes.len()
    }

    /// Split into `(unique, repeated)`
    #[must_use]
    pub fn into_split(self) -> (Vec<Record>, Vec<Record>) {
        (self.unique, self.repeated)
    }
}

/// Group records by processed title and merge their provenance.
///
/// Groups keep first-seen order and members keep input order. The merged
/// source is a plain join of member sources, so a provider that returned the
/// same title twice is listed twice. The first member of each group is its
/// representative.
#[must_use]
pub fn reconcile(records: Vec<Record>) -> Reconciliation {
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut members: Vec<Vec<usize>> = Vec::new();
    let mut group_of = Vec::with_capacity(records.len());

    for (position, record) in records.iter().enumerate() {
        let group = if let Some(&group) = group_index.get(&record.processed_title) {
            group
        } else {
            group_index.insert(record.processed_title.clone(), members.len());
            members.push(Vec::new());
            members.len() - 1
        };
        members[group].push(position);
        group_of.push(group);
    }

    let merged_sources: Vec<String> = members
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|&position| records[position].source.as_str())
                .collect::<Vec<_>>()
                .join(PROVENANCE_SEPARATOR)
        })
        .collect();

    let all: Vec<Record> = records
        .into_iter()
        .zip(&group_of)
        .map(|(record, &group)| record.with_source(merged_sources[group].clone()))
        .collect();

    let unique: Vec<Record> = members.iter().map(|group| all[group[0]].clone()).collect();

    let repeated: Vec<Record> = members
        .iter()
        .filter(|group| group.len() > 1)
        .map(|group| all[group[0]].clone())
        .collect();

    debug!(
        "Reconciled {} records into {} groups ({} repeated)",
        all.len(),
        unique.len(),
        repeated.len()
    );

    Reconciliation {
        all,
        unique,
        repeated,
        group_sizes: members.iter().map(Vec::len).collect(),
    }
}
