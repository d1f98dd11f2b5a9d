use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

use super::row::{feed_item_to_row, row_to_feed_item, FeedItemRow};
use super::traits::{FeedItemFilters, FeedItemStore};
use crate::domain::FeedItem;
use crate::error::{NormalizeError, Result};

/// In-memory store implementation for development/testing.
///
/// Stores the flattened row shape so the converters are exercised on every
/// read and write, the same round trip a real adapter performs.
pub struct InMemoryFeedItemStore {
    rows: Arc<Mutex<HashMap<(Uuid, Uuid), FeedItemRow>>>,
}

impl Default for InMemoryFeedItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFeedItemStore {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl FeedItemStore for InMemoryFeedItemStore {
    async fn create_feed_item(&self, owner_id: Uuid, item: &FeedItem) -> Result<()> {
        let mut row = feed_item_to_row(item, owner_id);
        row.created_at = Some(Utc::now());

        let mut rows = self.rows.lock().unwrap();
        rows.insert((owner_id, item.id), row);

        debug!("stored feed item {} for owner {}", item.id, owner_id);
        Ok(())
    }

    async fn get_feed_item(&self, owner_id: Uuid, id: Uuid) -> Result<Option<FeedItem>> {
        let rows = self.rows.lock().unwrap();
        match rows.get(&(owner_id, id)) {
            Some(row) => Ok(Some(row_to_feed_item(row)?)),
            None => Ok(None),
        }
    }

    async fn list_feed_items(
        &self,
        owner_id: Uuid,
        filters: &FeedItemFilters,
        limit: usize,
    ) -> Result<Vec<FeedItem>> {
        let rows = self.rows.lock().unwrap();
        let mut items = rows
            .values()
            .filter(|row| row.user_id == owner_id)
            .map(row_to_feed_item)
            .collect::<Result<Vec<_>>>()?;

        items.retain(|item| filters.matches(item));
        items.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
        items.truncate(limit);
        Ok(items)
    }

    async fn update_feed_item(&self, owner_id: Uuid, item: &FeedItem) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let key = (owner_id, item.id);
        let existing = rows.get(&key).ok_or_else(|| {
            NormalizeError::Storage(format!("feed item {} not found for owner {}", item.id, owner_id))
        })?;

        let mut row = feed_item_to_row(item, owner_id);
        row.created_at = existing.created_at;
        rows.insert(key, row);
        Ok(())
    }

    async fn delete_feed_item(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        rows.remove(&(owner_id, id));
        Ok(())
    }
}
