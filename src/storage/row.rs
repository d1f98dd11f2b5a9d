//! Flattened row shape for feed items and its lossless converters.
//!
//! Nested sub-records flatten into prefixed columns (`display_*`,
//! `commerce_*`, `metrics_*`); a null `commerce` becomes all-null commerce
//! columns. `row_to_feed_item(feed_item_to_row(item, owner))` returns the
//! original item exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{CommerceData, FeedItem, FeedItemDisplay, SocialMetrics};
use crate::error::{NormalizeError, Result};

/// One feed item as stored, keyed by owner identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub external_id: String,
    pub source_platform: String,
    pub detected_at: DateTime<Utc>,

    pub display_title: String,
    pub display_description: String,
    pub display_main_image_url: String,
    pub display_thumbnail_url: Option<String>,
    pub display_action_url: String,
    pub display_content_type: String,

    pub commerce_currency: Option<String>,
    pub commerce_current_price: Option<f64>,
    pub commerce_original_price: Option<f64>,
    pub commerce_is_on_sale: Option<bool>,
    pub commerce_merchant_name: Option<String>,

    pub metrics_rating_score: Option<f64>,
    pub metrics_review_count: Option<u64>,
    pub metrics_view_count: Option<u64>,
    pub metrics_engagement_score: f64,

    pub tags: Vec<String>,
    pub raw_payload: Option<serde_json::Value>,

    /// Set by the store on insert
    pub created_at: Option<DateTime<Utc>>,
}

/// Flatten a canonical item into its row shape for the given owner.
pub fn feed_item_to_row(item: &FeedItem, user_id: Uuid) -> FeedItemRow {
    let commerce = item.commerce.as_ref();
    FeedItemRow {
        id: item.id,
        user_id,
        external_id: item.external_id.clone(),
        source_platform: item.source_platform.as_str().to_string(),
        detected_at: item.detected_at,

        display_title: item.display.title.clone(),
        display_description: item.display.description.clone(),
        display_main_image_url: item.display.main_image_url.clone(),
        display_thumbnail_url: item.display.thumbnail_url.clone(),
        display_action_url: item.display.action_url.clone(),
        display_content_type: item.display.content_type.as_str().to_string(),

        commerce_currency: commerce.map(|c| c.currency.clone()),
        commerce_current_price: commerce.map(|c| c.current_price),
        commerce_original_price: commerce.and_then(|c| c.original_price),
        commerce_is_on_sale: commerce.map(|c| c.is_on_sale),
        commerce_merchant_name: commerce.map(|c| c.merchant_name.clone()),

        metrics_rating_score: item.metrics.rating_score,
        metrics_review_count: item.metrics.review_count,
        metrics_view_count: item.metrics.view_count,
        metrics_engagement_score: item.metrics.engagement_score,

        tags: item.tags.clone(),
        raw_payload: item
            .raw_payload
            .as_ref()
            .map(|p| serde_json::Value::Object(p.clone())),

        created_at: None,
    }
}

/// Rebuild the canonical item from its row shape.
///
/// Commerce is reconstructed when the row carries a currency and price;
/// rows written through [`feed_item_to_row`] always have either both or
/// neither.
pub fn row_to_feed_item(row: &FeedItemRow) -> Result<FeedItem> {
    let source_platform = serde_json::from_value(json!(row.source_platform))?;
    let content_type = serde_json::from_value(json!(row.display_content_type))?;

    let commerce = match (&row.commerce_currency, row.commerce_current_price) {
        (Some(currency), Some(current_price)) => Some(CommerceData {
            currency: currency.clone(),
            current_price,
            original_price: row.commerce_original_price,
            is_on_sale: row.commerce_is_on_sale.unwrap_or(false),
            merchant_name: row.commerce_merchant_name.clone().unwrap_or_default(),
        }),
        (None, None) => None,
        _ => {
            return Err(NormalizeError::Storage(format!(
                "row {} has partial commerce columns",
                row.id
            )))
        }
    };

    let raw_payload = match &row.raw_payload {
        Some(serde_json::Value::Object(map)) => Some(map.clone()),
        Some(_) => {
            return Err(NormalizeError::Storage(format!(
                "row {} raw_payload is not a mapping",
                row.id
            )))
        }
        None => None,
    };

    Ok(FeedItem {
        id: row.id,
        external_id: row.external_id.clone(),
        source_platform,
        detected_at: row.detected_at,
        display: FeedItemDisplay {
            title: row.display_title.clone(),
            description: row.display_description.clone(),
            main_image_url: row.display_main_image_url.clone(),
            thumbnail_url: row.display_thumbnail_url.clone(),
            action_url: row.display_action_url.clone(),
            content_type,
        },
        commerce,
        metrics: SocialMetrics {
            rating_score: row.metrics_rating_score,
            review_count: row.metrics_review_count,
            view_count: row.metrics_view_count,
            engagement_score: row.metrics_engagement_score,
        },
        tags: row.tags.clone(),
        raw_payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentType, SourcePlatform};

    fn sample_item(commerce: Option<CommerceData>) -> FeedItem {
        FeedItem {
            id: Uuid::new_v4(),
            external_id: "B09XS7JWHH".into(),
            source_platform: SourcePlatform::Marketplace,
            detected_at: "2025-08-15T12:00:00Z".parse().unwrap(),
            display: FeedItemDisplay {
                title: "Sony WH-1000XM5".into(),
                description: "Noise canceling headphones".into(),
                main_image_url: "https://img.example.com/a.jpg".into(),
                thumbnail_url: Some("https://img.example.com/a-thumb.jpg".into()),
                action_url: "https://amazon.com/dp/B09XS7JWHH".into(),
                content_type: ContentType::PhysicalProduct,
            },
            commerce,
            metrics: SocialMetrics {
                rating_score: Some(4.8),
                review_count: Some(10420),
                view_count: None,
                engagement_score: 136.0,
            },
            tags: vec!["electronics".into(), "headphones".into()],
            raw_payload: Some(
                serde_json::json!({ "asin": "B09XS7JWHH" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            ),
        }
    }

    #[test]
    fn round_trip_with_commerce_is_lossless() {
        let item = sample_item(Some(CommerceData {
            currency: "USD".into(),
            current_price: 348.0,
            original_price: Some(399.0),
            is_on_sale: true,
            merchant_name: "Amazon".into(),
        }));
        let row = feed_item_to_row(&item, Uuid::new_v4());
        let back = row_to_feed_item(&row).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn round_trip_without_commerce_is_lossless() {
        let item = sample_item(None);
        let row = feed_item_to_row(&item, Uuid::new_v4());
        assert!(row.commerce_currency.is_none());
        let back = row_to_feed_item(&row).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn partial_commerce_columns_rejected() {
        let item = sample_item(None);
        let mut row = feed_item_to_row(&item, Uuid::new_v4());
        row.commerce_currency = Some("USD".into());
        assert!(row_to_feed_item(&row).is_err());
    }
}
