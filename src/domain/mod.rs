use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The source platform a feed item was observed on.
///
/// This is a closed set: forum and micro-post sources are folded into
/// `Aggregator` (the search/trend bucket). The finer-grained distinction
/// only exists on [`crate::pipeline::detect::PlatformSignal`] and never
/// leaks into the canonical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePlatform {
    Marketplace,
    Aggregator,
    ShortVideo,
    LongVideo,
}

impl SourcePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourcePlatform::Marketplace => "marketplace",
            SourcePlatform::Aggregator => "aggregator",
            SourcePlatform::ShortVideo => "short_video",
            SourcePlatform::LongVideo => "long_video",
        }
    }
}

/// What kind of thing the feed item fundamentally is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// A buyable good with a price attached
    PhysicalProduct,
    /// Video content reviewing or showcasing a product
    VideoReview,
    /// A keyword or topic trending upward, nothing purchasable yet
    SearchTrend,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::PhysicalProduct => "physical_product",
            ContentType::VideoReview => "video_review",
            ContentType::SearchTrend => "search_trend",
        }
    }
}

/// Everything a feed surface needs to render the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItemDisplay {
    pub title: String,
    pub description: String,
    pub main_image_url: String,
    /// Some sources have no separate thumbnail; the main image is reused then
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Deep link back to the source (product page, watch page, post)
    pub action_url: String,
    pub content_type: ContentType,
}

/// Pricing data, present only when the item carries a definite price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommerceData {
    /// ISO 4217 style three-letter code
    pub currency: String,
    pub current_price: f64,
    /// Retained only when strictly greater than `current_price`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub is_on_sale: bool,
    pub merchant_name: String,
}

/// Social signals mapped from the source, plus the computed hotness scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMetrics {
    /// Normalized 0-5 stars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_score: Option<f64>,
    /// Count of reviews, comments or replies depending on source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    /// The per-platform engagement heuristic; always finite and non-negative
    pub engagement_score: f64,
}

/// The canonical normalized record every source payload is converted into.
///
/// Constructed once by a single mapper invocation and validated before it
/// leaves the pipeline; mutation happens downstream against the persisted
/// row, never against this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: Uuid,
    /// The source platform's native identifier (ASIN, video id, post id)
    pub external_id: String,
    pub source_platform: SourcePlatform,
    /// When the raw signal was observed
    pub detected_at: DateTime<Utc>,
    pub display: FeedItemDisplay,
    /// Serialized as JSON null when absent; nullable rather than omitted
    pub commerce: Option<CommerceData>,
    pub metrics: SocialMetrics,
    /// Order-preserving; duplicates permitted
    #[serde(default)]
    pub tags: Vec<String>,
    /// Opaque source payload retained for debugging and audit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_payload: Option<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_platform_serializes_snake_case() {
        let v = serde_json::to_value(SourcePlatform::ShortVideo).unwrap();
        assert_eq!(v, serde_json::json!("short_video"));
    }

    #[test]
    fn commerce_none_serializes_as_null() {
        let item = FeedItem {
            id: Uuid::nil(),
            external_id: "x".into(),
            source_platform: SourcePlatform::Aggregator,
            detected_at: Utc::now(),
            display: FeedItemDisplay {
                title: "t".into(),
                description: "d".into(),
                main_image_url: "https://example.com/a.jpg".into(),
                thumbnail_url: None,
                action_url: "https://example.com".into(),
                content_type: ContentType::SearchTrend,
            },
            commerce: None,
            metrics: SocialMetrics {
                rating_score: None,
                review_count: None,
                view_count: None,
                engagement_score: 0.0,
            },
            tags: vec![],
            raw_payload: None,
        };
        let v = serde_json::to_value(&item).unwrap();
        assert!(v.get("commerce").unwrap().is_null());
        // optional sub-fields are omitted entirely, not serialized as null
        assert!(v["metrics"].get("ratingScore").is_none());
    }

    #[test]
    fn tags_default_to_empty_on_deserialize() {
        let raw = serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "externalId": "x",
            "sourcePlatform": "aggregator",
            "detectedAt": "2025-08-15T12:00:00Z",
            "display": {
                "title": "t",
                "description": "d",
                "mainImageUrl": "https://example.com/a.jpg",
                "actionUrl": "https://example.com",
                "contentType": "search_trend"
            },
            "commerce": null,
            "metrics": { "engagementScore": 1.0 }
        });
        let item: FeedItem = serde_json::from_value(raw).unwrap();
        assert!(item.tags.is_empty());
    }
}
