use std::{num::NonZeroU32, sync::Arc};

use crate::db::{models::StoredReading, ReadingStore, StoreError};

/// Number of readings returned when the caller does not ask for a limit.
pub const DEFAULT_RECENT_LIMIT: NonZeroU32 = match NonZeroU32::new(50) {
    Some(n) => n,
    None => unreachable!(),
};

/// Read-only access to the most recent readings.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn ReadingStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// At most `limit` readings, newest first. An empty store yields an
    /// empty vec.
    pub async fn recent(&self, limit: NonZeroU32) -> Result<Vec<StoredReading>, StoreError> {
        self.store.recent(limit.get()).await
    }
}
