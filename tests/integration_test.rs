use literature_reconciler::reconcile::{
    aggregate, filter_by_year, reconcile, PublicationYear, RawRecord, SourceBatch, SourceName,
};
use literature_reconciler::{
    Config, CsvResultRepository, Error, InMemoryResultRepository, ReconcilePipeline,
    ResultRepository, ResultStage,
};
use std::sync::Arc;
use tempfile::TempDir;

fn docs_agility_batches() -> Vec<SourceBatch> {
    vec![
        SourceBatch::new(
            SourceName::Scopus,
            vec![RawRecord::titled("Docs Agility!").with_year(2019)],
        ),
        SourceBatch::new(
            SourceName::Ieee,
            vec![RawRecord::titled("docs agility").with_year(2019)],
        ),
        SourceBatch::new(
            SourceName::Acm,
            vec![RawRecord::titled("Unrelated Work").with_year(1999)],
        ),
    ]
}

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.search.page_size, 25);
    assert_eq!(config.search.max_start_index, 300);
    assert!(config.search.continue_on_failure);
    assert_eq!(config.output.min_publication_year, 2001);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();

    config.search.page_size = 0;
    assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));
    config.search.page_size = 25;

    config.output.directory = std::path::PathBuf::new();
    assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));
}

#[test]
fn test_error_display() {
    let err = Error::InvalidInput {
        field: "sources".to_string(),
        reason: "unknown source 'arxiv'".to_string(),
    };
    assert_eq!(
        format!("{err}"),
        "Invalid input: sources - unknown source 'arxiv'"
    );
}

#[test]
fn test_docs_agility_scenario() {
    let (unique, repeated) = reconcile(aggregate(docs_agility_batches())).into_split();

    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0].title.as_deref(), Some("Docs Agility!"));
    assert_eq!(unique[0].source, "Scopus, IEEE");
    assert_eq!(unique[0].processed_title, "docsagility");
    assert_eq!(unique[1].source, "ACM Digital Library");

    assert_eq!(repeated.len(), 1);
    assert_eq!(repeated[0].source, "Scopus, IEEE");

    let filtered = filter_by_year(unique, 2001);
    assert_eq!(filtered.records.len(), 1);
    assert_eq!(filtered.records[0].title.as_deref(), Some("Docs Agility!"));
}

#[test]
fn test_empty_input() {
    let (unique, repeated) = reconcile(aggregate(Vec::new())).into_split();
    assert!(unique.is_empty());
    assert!(repeated.is_empty());
}

#[test]
fn test_all_records_share_one_title() {
    let batches: Vec<SourceBatch> = SourceName::ALL
        .into_iter()
        .map(|source| SourceBatch::new(source, vec![RawRecord::titled("Same Paper")]))
        .collect();

    let (unique, repeated) = reconcile(aggregate(batches)).into_split();

    assert_eq!(unique.len(), 1);
    assert_eq!(repeated.len(), 1);
    assert_eq!(
        repeated[0].source,
        "Scopus, IEEE, Engineering Village, Science Direct, Hal Open Science, ACM Digital Library"
    );
}

#[test]
fn test_non_numeric_year_skips_filter() {
    let batches = vec![SourceBatch::new(
        SourceName::ScienceDirect,
        vec![
            RawRecord::titled("Old").with_year("1990"),
            RawRecord::titled("Undated").with_year("n.d."),
        ],
    )];

    let (unique, _) = reconcile(aggregate(batches)).into_split();
    let outcome = filter_by_year(unique.clone(), 2001);

    assert!(outcome.is_skipped());
    assert_eq!(outcome.records, unique);
}

#[tokio::test]
async fn test_pipeline_with_memory_repository() {
    let repository = Arc::new(InMemoryResultRepository::new());
    let pipeline = ReconcilePipeline::new(repository.clone());

    let report = pipeline.run(docs_agility_batches()).await.unwrap();

    assert_eq!(
        report.per_source,
        vec![
            (SourceName::Scopus, 1),
            (SourceName::Ieee, 1),
            (SourceName::Acm, 1)
        ]
    );
    assert_eq!(report.unique_records, 1);

    let repeated = repository.stage(ResultStage::Repeated).await.unwrap();
    assert_eq!(repeated.len(), 1);
    assert_eq!(repeated[0].processed_title, "docsagility");
}

#[tokio::test]
async fn test_year_filter_leaves_repeated_untouched() {
    let batches = vec![
        SourceBatch::new(
            SourceName::Scopus,
            vec![
                RawRecord::titled("Waterfall Revisited").with_year(1999),
                RawRecord::titled("Docs Agility!").with_year(2019),
            ],
        ),
        SourceBatch::new(
            SourceName::Hal,
            vec![RawRecord::titled("waterfall revisited").with_year(1999)],
        ),
    ];
    let repository = Arc::new(InMemoryResultRepository::new());
    let report = ReconcilePipeline::new(repository.clone())
        .run(batches)
        .await
        .unwrap();

    assert_eq!(report.unique_records, 1);
    assert_eq!(report.repeated_records, 1);

    let unique = repository.stage(ResultStage::UniqueResults).await.unwrap();
    assert_eq!(unique.len(), 1);
    assert_eq!(unique[0].processed_title, "docsagility");

    let repeated = repository.stage(ResultStage::Repeated).await.unwrap();
    assert_eq!(repeated.len(), 1);
    assert_eq!(repeated[0].title.as_deref(), Some("Waterfall Revisited"));
    assert_eq!(repeated[0].publication_year, Some(PublicationYear::Integer(1999)));
    assert_eq!(repeated[0].source, "Scopus, Hal Open Science");
}

#[tokio::test]
async fn test_pipeline_writes_csv_files() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("data_results");
    let repository = Arc::new(CsvResultRepository::new(&output));
    let pipeline = ReconcilePipeline::new(repository.clone());

    pipeline.run(docs_agility_batches()).await.unwrap();

    for file in [
        "scopus.csv",
        "ieee.csv",
        "acm_digital_library.csv",
        "all_results.csv",
        "unique_results.csv",
        "repeated.csv",
    ] {
        assert!(output.join(file).exists(), "{file} should be written");
    }

    let all = std::fs::read_to_string(output.join("all_results.csv")).unwrap();
    let rows: Vec<&str> = all.lines().collect();
    assert_eq!(
        rows[0],
        "Title,Publication Year,Venue,Venue Type,Authors,Link,Source,ProcessedTitle"
    );
    assert_eq!(rows[1], "Docs Agility!,2019,,,,,\"Scopus, IEEE\",docsagility");
    assert_eq!(rows[2], "docs agility,2019,,,,,\"Scopus, IEEE\",docsagility");
    assert_eq!(rows.len(), 4);

    let unique = std::fs::read_to_string(output.join("unique_results.csv")).unwrap();
    assert_eq!(unique.lines().count(), 2);

    let ieee = repository.load_source(SourceName::Ieee).await.unwrap();
    assert_eq!(ieee[0].title.as_deref(), Some("docs agility"));
    assert_eq!(
        ieee[0].publication_year,
        Some(PublicationYear::Text("2019".to_string()))
    );
}

#[tokio::test]
async fn test_offline_rerun_from_csv() {
    let dir = TempDir::new().unwrap();
    let repository = Arc::new(CsvResultRepository::new(dir.path()));
    let pipeline = ReconcilePipeline::new(repository);

    pipeline.run(docs_agility_batches()).await.unwrap();

    let sources = [SourceName::Scopus, SourceName::Ieee, SourceName::Acm];
    let batches = pipeline.load_stored(&sources).await.unwrap();
    let report = pipeline.run(batches).await.unwrap();

    assert_eq!(report.total_records, 3);
    assert_eq!(report.distinct_titles, 2);
    assert_eq!(report.unique_records, 1);
    assert_eq!(report.repeated_records, 1);
    assert!(report.year_filter_skipped.is_none());

    let missing = pipeline.load_stored(&[SourceName::Hal]).await;
    assert!(matches!(missing, Err(Error::Repository(_))));
}
