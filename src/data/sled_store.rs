//! sled-backed key-value store used when a data directory is configured.

use crate::domain::repository::KeyValueStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct SledKeyValueStore {
    db: Db,
}

impl SledKeyValueStore {
    /// Open or create the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .with_context(|| format!("Failed to open sled database at {}", path.as_ref().display()))?;
        info!(path = %path.as_ref().display(), "Opened key-value database");
        Ok(Self { db })
    }
}

#[async_trait]
impl KeyValueStore for SledKeyValueStore {
    #[instrument(skip(self))]
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(value) => {
                let text = String::from_utf8(value.to_vec())
                    .with_context(|| format!("Stored value for {key} is not UTF-8"))?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        self.db.insert(key.as_bytes(), value.into_bytes())?;
        self.db.flush_async().await?;
        debug!(key = key, "Item saved to sled");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, key: &str) -> Result<()> {
        self.db.remove(key.as_bytes())?;
        self.db.flush_async().await?;
        Ok(())
    }
}
