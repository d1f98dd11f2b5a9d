use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{MapperUtils, SourceMapper};
use crate::constants::DEFAULT_CURRENCY;
use crate::domain::{CommerceData, ContentType, FeedItem, FeedItemDisplay, SocialMetrics};
use crate::pipeline::detect::PlatformSignal;

const FALLBACK_TITLE: &str = "Google Result";
const DEFAULT_MERCHANT: &str = "Google";

/// Priority order matters: the rating path always wins when both rating and
/// review volume exist, then a trend-score passthrough, then search volume.
fn engagement_score(
    rating: Option<f64>,
    review_count: u64,
    trend_score: Option<f64>,
    search_volume: Option<f64>,
) -> f64 {
    if let Some(rating) = rating.filter(|r| *r > 0.0) {
        if review_count > 0 {
            let rating_score = (rating / 5.0) * 100.0;
            let review_score = (review_count as f64 + 1.0).log10() * 10.0;
            return MapperUtils::round_half_up(rating_score + review_score);
        }
    }

    if let Some(trend) = trend_score.filter(|t| *t != 0.0) {
        return MapperUtils::round_half_up(trend);
    }

    if let Some(volume) = search_volume.filter(|v| *v > 0.0) {
        return MapperUtils::round_half_up((volume + 1.0).log10() * 20.0);
    }

    0.0
}

/// Mapper for generic search and shopping/trend results; the detector's
/// default destination.
pub struct SearchMapper;

impl SourceMapper for SearchMapper {
    fn signal(&self) -> PlatformSignal {
        PlatformSignal::Aggregator(crate::pipeline::detect::AggregatorKind::Search)
    }

    fn map(&self, raw: &Value, id: Uuid, detected_at: DateTime<Utc>) -> FeedItem {
        let external_id = MapperUtils::str_field(raw, &["productId", "externalId", "searchQuery"])
            .unwrap_or_default();

        let raw_title = MapperUtils::str_field(raw, &["title", "searchQuery"])
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        let title = MapperUtils::truncate_title(&raw_title);
        let description = MapperUtils::str_field(raw, &["description"]).unwrap_or_default();

        let image_url =
            MapperUtils::str_field(raw, &["imageUrl", "mainImageUrl"]).unwrap_or_default();
        let thumbnail_url =
            MapperUtils::str_field(raw, &["thumbnailUrl"]).unwrap_or_else(|| image_url.clone());
        let action_url =
            MapperUtils::str_field(raw, &["productUrl", "actionUrl"]).unwrap_or_default();

        let price = MapperUtils::num_field(raw, &["price", "currentPrice"]);
        let original_price = MapperUtils::num_field(raw, &["originalPrice"]);
        let currency = MapperUtils::str_field(raw, &["currency"])
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let merchant_name = MapperUtils::str_field(raw, &["merchantName"])
            .unwrap_or_else(|| DEFAULT_MERCHANT.to_string());

        let rating = MapperUtils::num_field(raw, &["rating", "ratingScore"]);
        let review_count = MapperUtils::count_field(raw, &["reviewCount"]);
        let trend_score = MapperUtils::num_field(raw, &["trendScore"]);
        let search_volume = MapperUtils::num_field(raw, &["searchVolume"]);

        // a definite price flips the result from trend to product
        let (content_type, commerce) = match price {
            Some(current_price) => (
                ContentType::PhysicalProduct,
                Some(CommerceData {
                    currency,
                    current_price,
                    original_price: original_price.filter(|o| *o > current_price),
                    is_on_sale: original_price.map(|o| o > current_price).unwrap_or(false),
                    merchant_name,
                }),
            ),
            None => (ContentType::SearchTrend, None),
        };

        FeedItem {
            id,
            external_id,
            source_platform: self.signal().platform_tag(),
            detected_at,
            display: FeedItemDisplay {
                title,
                description,
                main_image_url: image_url,
                thumbnail_url: Some(thumbnail_url).filter(|t| !t.is_empty()),
                action_url,
                content_type,
            },
            commerce,
            metrics: SocialMetrics {
                rating_score: rating,
                review_count: Some(review_count),
                view_count: None,
                engagement_score: engagement_score(rating, review_count, trend_score, search_volume),
            },
            tags: MapperUtils::string_list(raw, "tags"),
            raw_payload: MapperUtils::raw_payload(raw),
        }
    }
}
