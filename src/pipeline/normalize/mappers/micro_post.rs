use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{MapperUtils, SourceMapper};
use crate::domain::{ContentType, FeedItem, FeedItemDisplay, SocialMetrics};
use crate::pipeline::detect::PlatformSignal;

const FALLBACK_TITLE: &str = "Twitter Post";

fn status_url(tweet_id: &str) -> String {
    format!("https://twitter.com/i/web/status/{tweet_id}")
}

/// Amplification (retweets, quotes) is the dominant signal for micro-posts.
fn engagement_score(likes: u64, retweets: u64, replies: u64, quotes: u64) -> f64 {
    let like_value = likes as f64 * 0.1;
    let retweet_value = retweets as f64 * 2.0;
    let reply_value = replies as f64 * 0.5;
    let quote_value = quotes as f64 * 3.0;
    MapperUtils::round_half_up(like_value + retweet_value + reply_value + quote_value)
}

/// Mapper for micro-post payloads; emitted under the aggregator tag.
pub struct MicroPostMapper;

impl SourceMapper for MicroPostMapper {
    fn signal(&self) -> PlatformSignal {
        PlatformSignal::Aggregator(crate::pipeline::detect::AggregatorKind::MicroPost)
    }

    fn map(&self, raw: &Value, id: Uuid, detected_at: DateTime<Utc>) -> FeedItem {
        let external_id =
            MapperUtils::str_field(raw, &["tweetId", "externalId"]).unwrap_or_default();
        let url = MapperUtils::str_field(raw, &["tweetUrl", "actionUrl"])
            .unwrap_or_else(|| status_url(&external_id));

        // micro-posts have no separate title; the product name stands in
        let raw_title = MapperUtils::str_field(raw, &["productName"])
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        let title = MapperUtils::truncate_title(&raw_title);
        let description = MapperUtils::str_field(raw, &["text", "description"]).unwrap_or_default();

        let media_url = MapperUtils::str_field(raw, &["mediaUrl"]).unwrap_or_default();
        let thumbnail_url =
            MapperUtils::str_field(raw, &["thumbnailUrl"]).unwrap_or_else(|| media_url.clone());

        let like_count = MapperUtils::count_field(raw, &["likeCount"]);
        let retweet_count = MapperUtils::count_field(raw, &["retweetCount"]);
        let reply_count = MapperUtils::count_field(raw, &["replyCount"]);
        let quote_count = MapperUtils::count_field(raw, &["quoteCount"]);

        let action_url = MapperUtils::str_field(raw, &["productUrl"]).unwrap_or_else(|| url.clone());

        // all hashtags appended after the base tags, order preserved
        let mut tags = MapperUtils::string_list(raw, "tags");
        tags.extend(MapperUtils::string_list(raw, "hashtags"));

        FeedItem {
            id,
            external_id,
            source_platform: self.signal().platform_tag(),
            detected_at,
            display: FeedItemDisplay {
                title,
                description,
                main_image_url: thumbnail_url.clone(),
                thumbnail_url: Some(thumbnail_url).filter(|t| !t.is_empty()),
                action_url,
                content_type: ContentType::SearchTrend,
            },
            commerce: None,
            metrics: SocialMetrics {
                rating_score: None,
                review_count: Some(reply_count),
                view_count: None,
                engagement_score: engagement_score(
                    like_count,
                    retweet_count,
                    reply_count,
                    quote_count,
                ),
            },
            tags,
            raw_payload: MapperUtils::raw_payload(raw),
        }
    }
}
