use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    FORUM_URL_MARKER, LONG_VIDEO_HOSTS, MICRO_POST_URL_MARKER, SHORT_VIDEO_HOSTS,
};
use crate::domain::SourcePlatform;
use crate::observability::metrics;

/// Sub-kind for payloads that all land under the `Aggregator` platform tag.
///
/// Forum and micro-post sources share the public tag with generic search
/// results; the distinction exists only to pick a mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregatorKind {
    Forum,
    MicroPost,
    Search,
}

/// The detector's verdict: which mapper should handle a raw payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformSignal {
    Marketplace,
    ShortVideo,
    LongVideo,
    Aggregator(AggregatorKind),
}

impl PlatformSignal {
    /// The public platform tag this signal collapses to.
    pub fn platform_tag(self) -> SourcePlatform {
        match self {
            PlatformSignal::Marketplace => SourcePlatform::Marketplace,
            PlatformSignal::ShortVideo => SourcePlatform::ShortVideo,
            PlatformSignal::LongVideo => SourcePlatform::LongVideo,
            PlatformSignal::Aggregator(_) => SourcePlatform::Aggregator,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlatformSignal::Marketplace => "marketplace",
            PlatformSignal::ShortVideo => "short_video",
            PlatformSignal::LongVideo => "long_video",
            PlatformSignal::Aggregator(AggregatorKind::Forum) => "forum",
            PlatformSignal::Aggregator(AggregatorKind::MicroPost) => "micro_post",
            PlatformSignal::Aggregator(AggregatorKind::Search) => "search",
        }
    }
}

impl fmt::Display for PlatformSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marketplace" => Ok(PlatformSignal::Marketplace),
            "short_video" => Ok(PlatformSignal::ShortVideo),
            "long_video" => Ok(PlatformSignal::LongVideo),
            "forum" => Ok(PlatformSignal::Aggregator(AggregatorKind::Forum)),
            "micro_post" => Ok(PlatformSignal::Aggregator(AggregatorKind::MicroPost)),
            "search" => Ok(PlatformSignal::Aggregator(AggregatorKind::Search)),
            other => Err(format!("unknown platform signal: {other}")),
        }
    }
}

fn url_field_contains(raw: &Value, field: &str, markers: &[&str]) -> bool {
    let url = raw
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_ascii_lowercase();
    markers.iter().any(|m| url.contains(m))
}

/// Decide which mapper should handle a raw payload.
///
/// An explicit hint is authoritative and skips inspection entirely.
/// Otherwise the rules below are tried in order and the first match wins;
/// the ordering is policy, not accident. Detection is total: unknown
/// shapes (including non-object payloads) fall through to the generic
/// search signal rather than failing. A payload is only ever rejected by
/// the post-mapping validator.
pub fn detect(raw: &Value, hint: Option<PlatformSignal>) -> PlatformSignal {
    if let Some(signal) = hint {
        metrics::detect::hint_used();
        return signal;
    }

    let signal = detect_by_shape(raw);
    metrics::detect::detected(signal.as_str());
    signal
}

fn detect_by_shape(raw: &Value) -> PlatformSignal {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => return PlatformSignal::Aggregator(AggregatorKind::Search),
    };

    // 1. Marketplace-native identifier, or an embedded platform marker
    if obj.contains_key("asin")
        || obj.get("sourcePlatform").and_then(Value::as_str) == Some("marketplace")
    {
        return PlatformSignal::Marketplace;
    }

    // 2-3. Video identifier, disambiguated by watch-URL host
    if obj.contains_key("videoId") {
        if url_field_contains(raw, "videoUrl", SHORT_VIDEO_HOSTS) {
            return PlatformSignal::ShortVideo;
        }
        if url_field_contains(raw, "videoUrl", LONG_VIDEO_HOSTS) {
            return PlatformSignal::LongVideo;
        }
    }

    // 4. Forum post identifier or a subreddit-like field
    if obj.contains_key("postId")
        || obj.contains_key("subreddit")
        || url_field_contains(raw, "postUrl", &[FORUM_URL_MARKER])
    {
        return PlatformSignal::Aggregator(AggregatorKind::Forum);
    }

    // 5. Micro-post identifier
    if obj.contains_key("tweetId") || url_field_contains(raw, "tweetUrl", &[MICRO_POST_URL_MARKER])
    {
        return PlatformSignal::Aggregator(AggregatorKind::MicroPost);
    }

    // 6. Default: generic search/trend result
    PlatformSignal::Aggregator(AggregatorKind::Search)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_hint_wins_over_shape() {
        let raw = json!({ "asin": "B000" });
        let signal = detect(&raw, Some(PlatformSignal::LongVideo));
        assert_eq!(signal, PlatformSignal::LongVideo);
    }

    #[test]
    fn marketplace_id_field_detected() {
        let raw = json!({ "asin": "B09XS7JWHH", "title": "Headphones" });
        assert_eq!(detect(&raw, None), PlatformSignal::Marketplace);
    }

    #[test]
    fn marketplace_outranks_video_id() {
        // Rule priority: a payload carrying both identifiers resolves to
        // the marketplace rule because it is checked first.
        let raw = json!({
            "asin": "B09XS7JWHH",
            "videoId": "123",
            "videoUrl": "https://tiktok.com/@user/video/123"
        });
        assert_eq!(detect(&raw, None), PlatformSignal::Marketplace);
    }

    #[test]
    fn short_video_host_detected() {
        let raw = json!({
            "videoId": "7234567890",
            "videoUrl": "https://www.TikTok.com/@user/video/7234567890"
        });
        assert_eq!(detect(&raw, None), PlatformSignal::ShortVideo);
    }

    #[test]
    fn long_video_host_detected() {
        let raw = json!({
            "videoId": "dQw4w9WgXcQ",
            "videoUrl": "https://youtu.be/dQw4w9WgXcQ"
        });
        assert_eq!(detect(&raw, None), PlatformSignal::LongVideo);
    }

    #[test]
    fn video_id_without_known_host_falls_through() {
        let raw = json!({ "videoId": "abc", "videoUrl": "https://vimeo.com/abc" });
        assert_eq!(
            detect(&raw, None),
            PlatformSignal::Aggregator(AggregatorKind::Search)
        );
    }

    #[test]
    fn subreddit_field_detected_as_forum() {
        let raw = json!({ "subreddit": "headphones", "title": "review" });
        assert_eq!(
            detect(&raw, None),
            PlatformSignal::Aggregator(AggregatorKind::Forum)
        );
    }

    #[test]
    fn tweet_id_detected_as_micro_post() {
        let raw = json!({ "tweetId": "1234567890" });
        assert_eq!(
            detect(&raw, None),
            PlatformSignal::Aggregator(AggregatorKind::MicroPost)
        );
    }

    #[test]
    fn unknown_shape_defaults_to_search() {
        assert_eq!(
            detect(&json!({ "anything": true }), None),
            PlatformSignal::Aggregator(AggregatorKind::Search)
        );
        // detection never fails, even for non-object payloads
        assert_eq!(
            detect(&json!(null), None),
            PlatformSignal::Aggregator(AggregatorKind::Search)
        );
    }

    #[test]
    fn aggregator_kinds_share_public_tag() {
        assert_eq!(
            PlatformSignal::Aggregator(AggregatorKind::Forum).platform_tag(),
            SourcePlatform::Aggregator
        );
        assert_eq!(
            PlatformSignal::Aggregator(AggregatorKind::MicroPost).platform_tag(),
            SourcePlatform::Aggregator
        );
        assert_eq!(
            PlatformSignal::Aggregator(AggregatorKind::Search).platform_tag(),
            SourcePlatform::Aggregator
        );
    }
}
