use crate::data::collection::Collection;
use crate::domain::records::Record;
use crate::domain::repository::{KeyValueStore, RecordRepository};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Stores one record kind as a collection under `records:<resource>`.
pub struct KeyValueRecordRepository<T, S: KeyValueStore + ?Sized> {
    records: Collection<T, S>,
}

impl<T: Record, S: KeyValueStore + ?Sized> KeyValueRecordRepository<T, S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            records: Collection::new(store, format!("records:{}", T::RESOURCE)),
        }
    }
}

#[async_trait]
impl<T, S> RecordRepository<T> for KeyValueRecordRepository<T, S>
where
    T: Record,
    S: KeyValueStore + ?Sized,
{
    #[instrument(skip(self), fields(resource = T::RESOURCE))]
    async fn list(&self) -> Result<Vec<T>> {
        self.records.all().await
    }

    #[instrument(skip(self, record), fields(resource = T::RESOURCE, record_id = %record.id()))]
    async fn append(&self, record: T) -> Result<()> {
        self.records.push(record).await?;
        debug!("Record appended");
        Ok(())
    }
}
