//! A JSON array of `T` stored under one key of a [`KeyValueStore`].

use crate::domain::error::DomainError;
use crate::domain::repository::KeyValueStore;
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace};

pub struct Collection<T, S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    key: String,
    // Serializes read-modify-write cycles on this key.
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> Collection<T, S>
where
    T: Serialize + DeserializeOwned + Send,
    S: KeyValueStore + ?Sized,
{
    pub fn new(store: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Every item in storage order; an absent key reads as empty.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn all(&self) -> Result<Vec<T>> {
        self.read().await
    }

    #[instrument(skip(self, item), fields(key = %self.key))]
    pub async fn push(&self, item: T) -> Result<()> {
        self.modify(|items| {
            items.push(item);
        })
        .await
    }

    /// Runs `f` over the stored items and persists the result.
    pub async fn modify<R, F>(&self, f: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(&mut Vec<T>) -> R + Send,
    {
        trace!(key = %self.key, "Acquiring collection write lock");
        let _guard = self.write_lock.lock().await;
        let mut items = self.read().await?;
        let result = f(&mut items);
        self.write(&items).await?;
        debug!(key = %self.key, count = items.len(), "Collection persisted");
        Ok(result)
    }

    /// Like [`modify`](Self::modify) but only persists when `f` returns `Some`.
    pub async fn try_modify<R, F>(&self, f: F) -> Result<Option<R>>
    where
        R: Send,
        F: FnOnce(&mut Vec<T>) -> Option<R> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read().await?;
        let result = f(&mut items);
        if result.is_some() {
            self.write(&items).await?;
            debug!(key = %self.key, count = items.len(), "Collection persisted");
        }
        Ok(result)
    }

    /// Persists only when `f` succeeds; a domain error leaves storage untouched.
    pub async fn checked_modify<R, F>(&self, f: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(&mut Vec<T>) -> Result<R, DomainError> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read().await?;
        let result = f(&mut items)?;
        self.write(&items).await?;
        debug!(key = %self.key, count = items.len(), "Collection persisted");
        Ok(result)
    }

    async fn read(&self) -> Result<Vec<T>> {
        match self.store.get_item(&self.key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("Corrupt collection stored under {}", self.key)),
            None => Ok(Vec::new()),
        }
    }

    async fn write(&self, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.store.set_item(&self.key, raw).await
    }
}
