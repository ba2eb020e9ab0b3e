use literature_reconciler::reconcile::{
    aggregate, filter_by_year, normalize, reconcile, PublicationYear, RawRecord, Record,
    SourceBatch, SourceName,
};
use proptest::prelude::*;
use std::collections::HashSet;

/// Property-based tests for the reconciliation core
mod normalize_props {
    use super::*;

    const DELETED: &[char] = &[
        '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '_', '+', '-', '=', '[', ']', '{', '}',
        ';', ':', '\'', '"', ',', '.', '<', '>', '?', '/', '~', '`', '|', '\\', ' ', '\t', '\n',
    ];

    proptest! {
        #[test]
        fn test_normalize_idempotent(title in "[ -~\\tÀ-ÖØ-öø-ÿ]{0,60}") {
            let once = normalize(Some(&title));
            let twice = normalize(Some(&once));
            prop_assert_eq!(once, twice, "normalize should be idempotent");
        }

        #[test]
        fn test_deletion_set_and_case_are_ignored(
            words in prop::collection::vec("[a-zA-Z0-9]{1,8}", 1..6),
            noise in prop::collection::vec(prop::sample::select(DELETED), 1..6),
        ) {
            let plain: String = words.concat();
            let decorated: String = words
                .iter()
                .zip(noise.iter().cycle())
                .map(|(word, sep)| format!("{}{}", word.to_uppercase(), sep))
                .collect();

            prop_assert_eq!(normalize(Some(&plain)), normalize(Some(&decorated)));
        }

        #[test]
        fn test_normalized_key_has_no_deleted_characters(title in "[ -~\\tÀ-ÖØ-öø-ÿ]{0,60}") {
            let key = normalize(Some(&title));
            prop_assert!(!key.chars().any(|c| DELETED.contains(&c) || c.is_whitespace()));
        }
    }
}

mod reconcile_props {
    use super::*;

    /// Batches drawn from a small title pool so that duplicates are common
    fn batches() -> impl Strategy<Value = Vec<SourceBatch>> {
        let title = prop::sample::select(vec![
            "Docs Agility!",
            "docs agility",
            "Unrelated Work",
            "unrelated-work",
            "Safety Cases",
            "",
        ]);
        prop::collection::vec(prop::collection::vec(title, 0..8), SourceName::ALL.len()).prop_map(
            |per_source| {
                SourceName::ALL
                    .into_iter()
                    .zip(per_source)
                    .map(|(source, titles)| {
                        SourceBatch::new(
                            source,
                            titles.into_iter().map(RawRecord::titled).collect(),
                        )
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn test_groups_partition_the_input(batches in batches()) {
            let records = aggregate(batches);
            let total = records.len();
            let reconciliation = reconcile(records);

            prop_assert_eq!(reconciliation.group_sizes().iter().sum::<usize>(), total);
            prop_assert_eq!(reconciliation.all.len(), total);
        }

        #[test]
        fn test_one_unique_row_per_distinct_key(batches in batches()) {
            let records = aggregate(batches);
            let distinct: HashSet<String> = records.iter().map(|r| r.processed_title.clone()).collect();
            let (unique, repeated) = reconcile(records).into_split();

            prop_assert_eq!(unique.len(), distinct.len());
            prop_assert!(repeated.len() <= unique.len());
        }

        #[test]
        fn test_repeated_rows_are_unique_rows_of_larger_groups(batches in batches()) {
            let reconciliation = reconcile(aggregate(batches));
            let expected: Vec<&Record> = reconciliation
                .unique
                .iter()
                .zip(reconciliation.group_sizes())
                .filter(|(_, size)| **size > 1)
                .map(|(record, _)| record)
                .collect();

            prop_assert_eq!(expected, reconciliation.repeated.iter().collect::<Vec<_>>());
        }

        #[test]
        fn test_merged_source_lists_every_member(batches in batches()) {
            let reconciliation = reconcile(aggregate(batches));
            for (record, size) in reconciliation.unique.iter().zip(reconciliation.group_sizes()) {
                prop_assert_eq!(record.source.split(", ").count(), *size);
            }
        }
    }
}

mod year_filter_props {
    use super::*;

    fn dated_records(years: &[Option<i64>]) -> Vec<Record> {
        years
            .iter()
            .enumerate()
            .map(|(i, year)| {
                let raw = RawRecord {
                    publication_year: year.map(PublicationYear::Integer),
                    ..RawRecord::titled(format!("paper {i}"))
                };
                Record::from_raw(raw, "Scopus")
            })
            .collect()
    }

    proptest! {
        #[test]
        fn test_retained_years_meet_threshold(
            years in prop::collection::vec(prop::option::of(1950i64..2030), 0..30),
            min_year in 1990i64..2020,
        ) {
            let records = dated_records(&years);
            let outcome = filter_by_year(records, min_year);

            prop_assert!(!outcome.is_skipped());
            for kept in &outcome.records {
                let year = kept.publication_year.as_ref().and_then(PublicationYear::as_integer);
                prop_assert!(year.is_some_and(|y| y >= min_year));
            }
        }

        #[test]
        fn test_filter_is_monotonic(
            years in prop::collection::vec(prop::option::of(1950i64..2030), 0..30),
            lower in 1990i64..2005,
            raise in 0i64..15,
        ) {
            let records = dated_records(&years);
            let loose = filter_by_year(records.clone(), lower).records;
            let strict = filter_by_year(records.clone(), lower + raise).records;

            prop_assert!(strict.len() <= loose.len());
            for kept in &strict {
                prop_assert!(records.contains(kept));
                prop_assert!(loose.contains(kept));
            }
        }
    }
}
