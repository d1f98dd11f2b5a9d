// Base trait and utilities for source-specific mappers
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::FeedItem;
use crate::pipeline::detect::PlatformSignal;

// Individual mapper implementations
pub mod forum;
pub mod long_video;
pub mod marketplace;
pub mod micro_post;
pub mod search;
pub mod short_video;

// Re-export the main components
pub use forum::ForumMapper;
pub use long_video::LongVideoMapper;
pub use marketplace::MarketplaceMapper;
pub use micro_post::MicroPostMapper;
pub use search::SearchMapper;
pub use short_video::ShortVideoMapper;

/// Converts one platform's raw payload into the canonical record shape.
///
/// Mappers are total over their expected input: every missing optional
/// source field resolves to a fallback, so mapping itself never fails.
/// The output is a *candidate* — only the schema validator decides whether
/// it is well-formed.
pub trait SourceMapper: Send + Sync {
    /// The detector signal this mapper handles
    fn signal(&self) -> PlatformSignal;

    /// Map a raw payload into a pre-validation feed item
    fn map(&self, raw: &Value, id: Uuid, detected_at: DateTime<Utc>) -> FeedItem;
}

/// Shared field-extraction helpers used by every mapper.
pub struct MapperUtils;

impl MapperUtils {
    /// Resolve a logical field through an ordered list of fallback keys.
    /// The first key holding a string wins.
    pub fn str_field(raw: &Value, keys: &[&str]) -> Option<String> {
        keys.iter()
            .find_map(|k| raw.get(k).and_then(Value::as_str))
            .map(|s| s.to_string())
    }

    /// First key holding a number, as f64.
    pub fn num_field(raw: &Value, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|k| raw.get(k).and_then(Value::as_f64))
    }

    /// First key holding a number, clamped into a non-negative count.
    /// Missing fields count as zero.
    pub fn count_field(raw: &Value, keys: &[&str]) -> u64 {
        keys.iter()
            .find_map(|k| {
                let v = raw.get(k)?;
                v.as_u64().or_else(|| v.as_f64().map(|f| f.max(0.0) as u64))
            })
            .unwrap_or(0)
    }

    /// A string array field, dropping non-string elements. Missing means empty.
    pub fn string_list(raw: &Value, key: &str) -> Vec<String> {
        raw.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Truncate a title to the display limit, appending the ellipsis marker.
    /// Applies uniformly to every source.
    pub fn truncate_title(title: &str) -> String {
        use crate::constants::{TITLE_ELLIPSIS, TITLE_MAX_LEN};
        if title.chars().count() <= TITLE_MAX_LEN {
            return title.to_string();
        }
        let mut truncated: String = title.chars().take(TITLE_MAX_LEN).collect();
        truncated.push_str(TITLE_ELLIPSIS);
        truncated
    }

    /// Round-half-up to the nearest integer. Engagement totals are always
    /// non-negative, so this matches conventional rounding everywhere the
    /// pipeline uses it.
    pub fn round_half_up(value: f64) -> f64 {
        (value + 0.5).floor()
    }

    /// Clone the payload for the audit trail; non-object payloads keep none.
    pub fn raw_payload(raw: &Value) -> Option<serde_json::Map<String, Value>> {
        raw.as_object().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn str_field_respects_fallback_order() {
        let raw = json!({ "b": "second", "a": "first" });
        assert_eq!(
            MapperUtils::str_field(&raw, &["a", "b"]),
            Some("first".to_string())
        );
        assert_eq!(
            MapperUtils::str_field(&raw, &["missing", "b"]),
            Some("second".to_string())
        );
        assert_eq!(MapperUtils::str_field(&raw, &["missing"]), None);
    }

    #[test]
    fn count_field_defaults_to_zero() {
        let raw = json!({ "views": 1500000 });
        assert_eq!(MapperUtils::count_field(&raw, &["views"]), 1_500_000);
        assert_eq!(MapperUtils::count_field(&raw, &["likes"]), 0);
    }

    #[test]
    fn short_titles_pass_through() {
        assert_eq!(MapperUtils::truncate_title("Headphones"), "Headphones");
    }

    #[test]
    fn long_titles_truncate_with_marker() {
        let title = "x".repeat(85);
        let truncated = MapperUtils::truncate_title(&title);
        assert_eq!(truncated.chars().count(), 83);
        assert!(truncated.ends_with("..."));
        assert!(title.starts_with(truncated.trim_end_matches("...")));
    }

    #[test]
    fn round_half_up_at_boundary() {
        assert_eq!(MapperUtils::round_half_up(136.179), 136.0);
        assert_eq!(MapperUtils::round_half_up(12.5), 13.0);
        assert_eq!(MapperUtils::round_half_up(0.0), 0.0);
    }
}
