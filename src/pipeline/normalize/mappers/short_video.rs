use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{MapperUtils, SourceMapper};
use crate::domain::{ContentType, FeedItem, FeedItemDisplay, SocialMetrics};
use crate::pipeline::detect::PlatformSignal;

const FALLBACK_TITLE: &str = "TikTok Video";

fn watch_url(video_id: &str) -> String {
    format!("https://tiktok.com/@video/{video_id}")
}

/// Interactions outweigh raw views for short-form video.
fn engagement_score(views: u64, likes: u64, comments: u64, shares: u64) -> f64 {
    let view_score = (views as f64 + 1.0).log10() * 5.0;
    let like_score = likes as f64 * 0.1;
    let comment_score = comments as f64 * 0.5;
    let share_score = shares as f64 * 2.0;
    MapperUtils::round_half_up(view_score + like_score + comment_score + share_score)
}

/// Mapper for short-form video payloads.
pub struct ShortVideoMapper;

impl SourceMapper for ShortVideoMapper {
    fn signal(&self) -> PlatformSignal {
        PlatformSignal::ShortVideo
    }

    fn map(&self, raw: &Value, id: Uuid, detected_at: DateTime<Utc>) -> FeedItem {
        let external_id =
            MapperUtils::str_field(raw, &["videoId", "externalId"]).unwrap_or_default();
        let video_url = MapperUtils::str_field(raw, &["videoUrl", "actionUrl"])
            .unwrap_or_else(|| watch_url(&external_id));

        let raw_title = MapperUtils::str_field(raw, &["title", "productName"])
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        let title = MapperUtils::truncate_title(&raw_title);
        let description =
            MapperUtils::str_field(raw, &["description", "caption"]).unwrap_or_default();
        let thumbnail_url = MapperUtils::str_field(raw, &["thumbnailUrl"]).unwrap_or_default();

        let view_count = MapperUtils::count_field(raw, &["viewCount"]);
        let like_count = MapperUtils::count_field(raw, &["likeCount"]);
        let comment_count = MapperUtils::count_field(raw, &["commentCount"]);
        let share_count = MapperUtils::count_field(raw, &["shareCount"]);

        let action_url =
            MapperUtils::str_field(raw, &["productUrl"]).unwrap_or_else(|| video_url.clone());

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
                content_type: ContentType::VideoReview,
            },
            // Video payloads never carry commerce data, whatever the input holds
            commerce: None,
            metrics: SocialMetrics {
                rating_score: None,
                review_count: Some(comment_count),
                view_count: Some(view_count),
                engagement_score: engagement_score(
                    view_count,
                    like_count,
                    comment_count,
                    share_count,
                ),
            },
            tags: MapperUtils::string_list(raw, "tags"),
            raw_payload: MapperUtils::raw_payload(raw),
        }
    }
}
