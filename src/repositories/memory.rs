use super::{RepositoryError, RepositoryResult, ResultRepository, ResultStage};
use crate::reconcile::{RawRecord, Record, SourceName};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory implementation of [`ResultRepository`] for testing
#[derive(Debug, Default, Clone)]
pub struct InMemoryResultRepository {
    sources: Arc<RwLock<HashMap<SourceName, Vec<Record>>>>,
    stages: Arc<RwLock<HashMap<ResultStage, Vec<Record>>>>,
}

impl InMemoryResultRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records stored for a source, if any
    pub async fn source(&self, source: SourceName) -> Option<Vec<Record>> {
        self.sources.read().await.get(&source).cloned()
    }

    /// Records stored for a stage, if any
    pub async fn stage(&self, stage: ResultStage) -> Option<Vec<Record>> {
        self.stages.read().await.get(&stage).cloned()
    }
}

#[async_trait]
impl ResultRepository for InMemoryResultRepository {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    async fn store_source(&self, source: SourceName, records: &[Record]) -> RepositoryResult<()> {
        debug!("Storing {} records for {}", records.len(), source);
        self.sources.write().await.insert(source, records.to_vec());
        Ok(())
    }

    async fn store_stage(&self, stage: ResultStage, records: &[Record]) -> RepositoryResult<()> {
        debug!("Storing {} records for {}", records.len(), stage);
        self.stages.write().await.insert(stage, records.to_vec());
        Ok(())
    }

    async fn load_source(&self, source: SourceName) -> RepositoryResult<Vec<RawRecord>> {
        self.sources
            .read()
            .await
            .get(&source)
            .map(|records| records.iter().map(Record::to_raw).collect())
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "source results".to_string(),
                id: source.to_string(),
            })
    }
}
