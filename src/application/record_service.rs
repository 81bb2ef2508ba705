use crate::domain::records::{Recommendation, Record, built_in_recommendations};
use crate::domain::repository::RecordRepository;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// List/append access to one record kind.
pub struct RecordService<T: Record> {
    repository: Arc<dyn RecordRepository<T>>,
}

impl<T: Record> RecordService<T> {
    pub fn new(repository: Arc<dyn RecordRepository<T>>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self), fields(resource = T::RESOURCE))]
    pub async fn list(&self) -> Result<Vec<T>> {
        let records = self.repository.list().await?;
        debug!(count = records.len(), "Records listed");
        Ok(records.iter().map(Record::redacted).collect())
    }

    /// Stores `draft` under a fresh id and returns what was stored.
    #[instrument(skip(self, draft), fields(resource = T::RESOURCE, record_id))]
    pub async fn append(&self, draft: T::Draft) -> Result<T> {
        let id = Uuid::new_v4().to_string();
        tracing::Span::current().record("record_id", id.as_str());

        let record = T::from_draft(draft, id, Utc::now());
        self.repository.append(record.clone()).await?;

        info!(record_id = %record.id(), "Record created");
        Ok(record.redacted())
    }
}

impl RecordService<Recommendation> {
    /// Built-in suggestions first, then everything clients have posted.
    pub async fn list_with_built_ins(&self) -> Result<Vec<Recommendation>> {
        let mut recommendations = built_in_recommendations(Utc::now());
        recommendations.extend(self.list().await?);
        Ok(recommendations)
    }
}
