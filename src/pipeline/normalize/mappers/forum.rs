use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{MapperUtils, SourceMapper};
use crate::domain::{ContentType, FeedItem, FeedItemDisplay, SocialMetrics};
use crate::pipeline::detect::PlatformSignal;

const FALLBACK_TITLE: &str = "Reddit Post";

fn post_url(post_id: &str) -> String {
    // forum post ids arrive path-shaped ("/r/.../comments/...")
    format!("https://reddit.com{post_id}")
}

/// Net vote score dominates; comments are the secondary signal.
fn engagement_score(score: i64, comments: u64) -> f64 {
    let score_value = (score.unsigned_abs() as f64 + 1.0).log10() * 20.0;
    let comment_value = comments as f64 * 2.0;
    MapperUtils::round_half_up(score_value + comment_value)
}

/// Mapper for forum post payloads; emitted under the aggregator tag.
pub struct ForumMapper;

impl SourceMapper for ForumMapper {
    fn signal(&self) -> PlatformSignal {
        PlatformSignal::Aggregator(crate::pipeline::detect::AggregatorKind::Forum)
    }

    fn map(&self, raw: &Value, id: Uuid, detected_at: DateTime<Utc>) -> FeedItem {
        let external_id =
            MapperUtils::str_field(raw, &["postId", "externalId"]).unwrap_or_default();
        let url = MapperUtils::str_field(raw, &["postUrl", "actionUrl"])
            .unwrap_or_else(|| post_url(&external_id));

        let raw_title = MapperUtils::str_field(raw, &["title", "productName"])
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        let title = MapperUtils::truncate_title(&raw_title);
        let description =
            MapperUtils::str_field(raw, &["description", "selftext"]).unwrap_or_default();
        let thumbnail_url = MapperUtils::str_field(raw, &["thumbnailUrl"]).unwrap_or_default();

        let upvotes = MapperUtils::count_field(raw, &["upvotes"]);
        let downvotes = MapperUtils::count_field(raw, &["downvotes"]);
        // an explicit score wins over the derived one
        let score = raw
            .get("score")
            .and_then(Value::as_i64)
            .unwrap_or(upvotes as i64 - downvotes as i64);
        let comment_count = MapperUtils::count_field(raw, &["commentCount"]);

        let action_url = MapperUtils::str_field(raw, &["productUrl"]).unwrap_or_else(|| url.clone());

        // subreddit appended after the base tags, order preserved
        let mut tags = MapperUtils::string_list(raw, "tags");
        if let Some(subreddit) = MapperUtils::str_field(raw, &["subreddit"]) {
            tags.push(subreddit);
        }

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
                review_count: Some(comment_count),
                view_count: None,
                engagement_score: engagement_score(score, comment_count),
            },
            tags,
            raw_payload: MapperUtils::raw_payload(raw),
        }
    }
}
