use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ContentType, FeedItem, SourcePlatform};
use crate::error::Result;

/// Filter predicates applied when listing stored feed items.
#[derive(Debug, Clone, Default)]
pub struct FeedItemFilters {
    /// Keep only these platforms; empty means all
    pub source_platforms: Vec<SourcePlatform>,
    /// Keep only these content types; empty means all
    pub content_types: Vec<ContentType>,
    /// Minimum rating score; items without a rating are excluded when set
    pub min_rating: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl FeedItemFilters {
    pub fn matches(&self, item: &FeedItem) -> bool {
        if !self.source_platforms.is_empty()
            && !self.source_platforms.contains(&item.source_platform)
        {
            return false;
        }
        if !self.content_types.is_empty()
            && !self.content_types.contains(&item.display.content_type)
        {
            return false;
        }
        if let Some(min_rating) = self.min_rating {
            match item.metrics.rating_score {
                Some(rating) if rating >= min_rating => {}
                _ => return false,
            }
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            let price = match &item.commerce {
                Some(commerce) => commerce.current_price,
                None => return false,
            };
            if self.min_price.map(|min| price < min).unwrap_or(false) {
                return false;
            }
            if self.max_price.map(|max| price > max).unwrap_or(false) {
                return false;
            }
        }
        true
    }
}

/// Storage contract for normalized feed items, keyed by owner identity.
///
/// Mutation of stored items (ratings, favorites) happens against rows in
/// the adapter, never against the in-memory canonical shape.
#[async_trait]
pub trait FeedItemStore: Send + Sync {
    async fn create_feed_item(&self, owner_id: Uuid, item: &FeedItem) -> Result<()>;
    async fn get_feed_item(&self, owner_id: Uuid, id: Uuid) -> Result<Option<FeedItem>>;
    /// Newest-first by `detected_at`, truncated to `limit`.
    async fn list_feed_items(
        &self,
        owner_id: Uuid,
        filters: &FeedItemFilters,
        limit: usize,
    ) -> Result<Vec<FeedItem>>;
    async fn update_feed_item(&self, owner_id: Uuid, item: &FeedItem) -> Result<()>;
    async fn delete_feed_item(&self, owner_id: Uuid, id: Uuid) -> Result<()>;
}
