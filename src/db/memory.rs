use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    models::{NewReading, StoredReading},
    store::{ReadingStore, StoreError},
};

/// In-process append log implementing `ReadingStore`.
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks;
/// clones see the same rows. Contents are lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryReadingStore {
    inner: Arc<RwLock<Vec<StoredReading>>>,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn insert(&self, reading: &NewReading) -> Result<StoredReading, StoreError> {
        let mut rows = self.inner.write().await;
        let id = rows.len() as i64 + 1;
        let stored = StoredReading::from_new(id, reading.clone());
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<StoredReading>, StoreError> {
        let mut rows = self.inner.read().await.clone();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}
