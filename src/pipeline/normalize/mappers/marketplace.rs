use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{MapperUtils, SourceMapper};
use crate::constants::DEFAULT_CURRENCY;
use crate::domain::{CommerceData, ContentType, FeedItem, FeedItemDisplay, SocialMetrics};
use crate::pipeline::detect::PlatformSignal;

const FALLBACK_TITLE: &str = "Unknown Product";
const DEFAULT_MERCHANT: &str = "Amazon";

fn listing_url(external_id: &str) -> String {
    format!("https://amazon.com/dp/{external_id}")
}

/// The two payload shapes the marketplace feeds arrive in.
///
/// Rainforest-style payloads carry an object-form price, `ratings_total`
/// and `feature_bullets`; the generic shape uses flat fields. Sniffed once
/// per invocation so the two code paths stay independently auditable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListingShape {
    Rainforest,
    Generic,
}

fn sniff_shape(raw: &Value) -> ListingShape {
    let object_price = raw
        .get("price")
        .and_then(Value::as_object)
        .map(|p| p.contains_key("value"))
        .unwrap_or(false);
    let has_ratings_total = raw.get("ratings_total").map(Value::is_number).unwrap_or(false);
    let has_bullets = raw
        .get("feature_bullets")
        .map(Value::is_array)
        .unwrap_or(false);

    if object_price || has_ratings_total || has_bullets {
        ListingShape::Rainforest
    } else {
        ListingShape::Generic
    }
}

/// Rating and review volume combined into a single hotness scalar.
/// Zero when either signal is missing.
fn engagement_score(rating: Option<f64>, review_count: u64) -> f64 {
    let rating = match rating {
        Some(r) if r > 0.0 => r,
        _ => return 0.0,
    };
    if review_count == 0 {
        return 0.0;
    }
    let rating_score = (rating / 5.0) * 100.0;
    let review_score = (review_count as f64 + 1.0).log10() * 10.0;
    MapperUtils::round_half_up(rating_score + review_score)
}

/// Mapper for marketplace product listings.
pub struct MarketplaceMapper;

impl SourceMapper for MarketplaceMapper {
    fn signal(&self) -> PlatformSignal {
        PlatformSignal::Marketplace
    }

    fn map(&self, raw: &Value, id: Uuid, detected_at: DateTime<Utc>) -> FeedItem {
        let shape = sniff_shape(raw);
        let external_id =
            MapperUtils::str_field(raw, &["asin", "externalId"]).unwrap_or_default();

        let raw_title =
            MapperUtils::str_field(raw, &["title"]).unwrap_or_else(|| FALLBACK_TITLE.to_string());
        let title = MapperUtils::truncate_title(&raw_title);

        let (description, image_url, action_url) = match shape {
            ListingShape::Rainforest => (
                raw.get("feature_bullets")
                    .and_then(Value::as_array)
                    .and_then(|b| b.first())
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                MapperUtils::str_field(raw, &["image"]).unwrap_or_default(),
                MapperUtils::str_field(raw, &["link"])
                    .unwrap_or_else(|| listing_url(&external_id)),
            ),
            ListingShape::Generic => (
                MapperUtils::str_field(raw, &["description"]).unwrap_or_default(),
                MapperUtils::str_field(raw, &["imageUrl", "mainImageUrl"]).unwrap_or_default(),
                MapperUtils::str_field(raw, &["productUrl", "actionUrl"])
                    .unwrap_or_else(|| listing_url(&external_id)),
            ),
        };
        let thumbnail_url =
            MapperUtils::str_field(raw, &["thumbnailUrl"]).unwrap_or_else(|| image_url.clone());

        let (current_price, currency, original_price, review_count, is_on_sale) = match shape {
            ListingShape::Rainforest => {
                let price = raw.get("price").and_then(Value::as_object);
                let current = price
                    .and_then(|p| p.get("value"))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);
                let currency = price
                    .and_then(|p| p.get("currency"))
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_CURRENCY)
                    .to_string();
                // The secondary raw-string price carries the pre-sale amount
                let original = price
                    .and_then(|p| p.get("raw"))
                    .and_then(Value::as_str)
                    .and_then(|s| s.trim().parse::<f64>().ok());
                let reviews = MapperUtils::count_field(raw, &["ratings_total"]);
                // Prime-style eligibility is the sale proxy for this shape;
                // fall back to the price comparison when the flag is absent
                let on_sale = match raw.get("is_prime").and_then(Value::as_bool) {
                    Some(flag) => flag,
                    None => original.map(|o| o > current).unwrap_or(false),
                };
                (current, currency, original, reviews, on_sale)
            }
            ListingShape::Generic => {
                let current = MapperUtils::num_field(raw, &["price", "currentPrice"]).unwrap_or(0.0);
                let currency = MapperUtils::str_field(raw, &["currency"])
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
                let original = MapperUtils::num_field(raw, &["originalPrice"]);
                let reviews = MapperUtils::count_field(raw, &["reviewCount"]);
                let on_sale = original.map(|o| o > current).unwrap_or(false);
                (current, currency, original, reviews, on_sale)
            }
        };

        let rating = MapperUtils::num_field(raw, &["rating", "ratingScore"]);
        let merchant_name = MapperUtils::str_field(raw, &["merchantName"])
            .unwrap_or_else(|| DEFAULT_MERCHANT.to_string());
        let tags = MapperUtils::string_list(raw, "tags");

        let commerce = CommerceData {
            currency,
            current_price,
            // "was more expensive" guarantee: drop the original price
            // entirely unless it beats the current one
            original_price: original_price.filter(|o| *o > current_price),
            is_on_sale,
            merchant_name,
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
                content_type: ContentType::PhysicalProduct,
            },
            commerce: Some(commerce),
            metrics: SocialMetrics {
                rating_score: rating,
                review_count: Some(review_count),
                view_count: None,
                engagement_score: engagement_score(rating, review_count),
            },
            tags,
            raw_payload: MapperUtils::raw_payload(raw),
        }
    }
}
