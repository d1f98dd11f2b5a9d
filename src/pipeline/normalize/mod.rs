//! The normalization entry point: detect, dispatch, validate.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::FeedItem;
use crate::error::{NormalizeError, Result};
use crate::observability::metrics;
use crate::pipeline::detect::{self, PlatformSignal};
use crate::pipeline::validate;

pub mod mappers;
pub mod registry;

pub use mappers::SourceMapper;
pub use registry::MapperRegistry;

/// Caller-supplied overrides for one normalization call.
///
/// Supplying `id` and `detected_at` makes the call fully deterministic:
/// the same raw payload then yields a byte-identical canonical record.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Record id; freshly generated when absent. Supply it for idempotent
    /// re-normalization.
    pub id: Option<Uuid>,
    /// Observation timestamp; defaults to normalization time.
    pub detected_at: Option<DateTime<Utc>>,
    /// Authoritative platform override; skips payload inspection entirely.
    pub platform_hint: Option<PlatformSignal>,
}

/// The orchestrator composing detector, mappers and validator.
///
/// Pure and synchronous: no I/O, no shared mutable state. The only ambient
/// inputs are the id generator and the clock, both overridable through
/// [`NormalizeOptions`].
pub struct NormalizePipeline {
    registry: MapperRegistry,
}

impl NormalizePipeline {
    pub fn new() -> Self {
        Self {
            registry: MapperRegistry::new(),
        }
    }

    /// Build a pipeline around a caller-assembled registry, e.g. with
    /// custom mappers registered.
    pub fn with_registry(registry: MapperRegistry) -> Self {
        Self { registry }
    }

    /// Normalize a single raw payload into a validated canonical record.
    ///
    /// Steps: resolve id, resolve timestamp, detect platform, dispatch to
    /// the mapper, validate. No partially-valid record is ever returned;
    /// the only failure modes are a non-object payload and the final
    /// schema check.
    pub fn normalize(&self, raw: &Value, options: &NormalizeOptions) -> Result<FeedItem> {
        if !raw.is_object() {
            warn!("rejecting non-object raw payload");
            return Err(NormalizeError::MalformedPayload);
        }

        let id = options.id.unwrap_or_else(Uuid::new_v4);
        let detected_at = options.detected_at.unwrap_or_else(Utc::now);
        let signal = detect::detect(raw, options.platform_hint);

        let mapper = self
            .registry
            .get(signal)
            .ok_or_else(|| NormalizeError::Config(format!("no mapper registered for {signal}")))?;

        debug!(signal = %signal, %id, "dispatching raw payload to mapper");
        let item = mapper.map(raw, id, detected_at);

        match validate::validate_item(&item) {
            Ok(()) => {
                metrics::normalize::record_normalized(item.source_platform.as_str());
                Ok(item)
            }
            Err(err) => {
                metrics::normalize::validation_failed(signal.as_str());
                warn!(signal = %signal, %id, "mapped candidate failed validation: {err}");
                Err(err.into())
            }
        }
    }

    /// Normalize a batch with identical options per element.
    ///
    /// Fail-fast: the first failing element aborts the whole call and no
    /// partial output is produced. Callers wanting log-and-skip semantics
    /// loop over [`Self::normalize`] themselves.
    pub fn normalize_many(&self, raws: &[Value], options: &NormalizeOptions) -> Result<Vec<FeedItem>> {
        let items = raws
            .iter()
            .map(|raw| self.normalize(raw, options))
            .collect::<Result<Vec<_>>>()?;
        metrics::normalize::batch_processed(items.len());
        Ok(items)
    }
}

impl Default for NormalizePipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed_options() -> NormalizeOptions {
        NormalizeOptions {
            id: Some(Uuid::nil()),
            detected_at: Some("2025-08-15T12:00:00Z".parse().unwrap()),
            platform_hint: None,
        }
    }

    #[test]
    fn normalizes_marketplace_payload_end_to_end() {
        let pipeline = NormalizePipeline::new();
        let raw = json!({
            "asin": "B09XS7JWHH",
            "title": "Sony WH-1000XM5",
            "description": "Noise canceling headphones",
            "imageUrl": "https://img.example.com/a.jpg",
            "productUrl": "https://amazon.com/dp/B09XS7JWHH",
            "price": 348.0,
            "rating": 4.8,
            "reviewCount": 10420
        });

        let item = pipeline.normalize(&raw, &fixed_options()).unwrap();
        assert_eq!(
            item.source_platform,
            crate::domain::SourcePlatform::Marketplace
        );
        assert_eq!(item.metrics.engagement_score, 136.0);
    }

    #[test]
    fn non_object_payload_is_a_caller_error() {
        let pipeline = NormalizePipeline::new();
        let err = pipeline.normalize(&json!(42), &fixed_options()).unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedPayload));
    }

    #[test]
    fn hint_overrides_detection() {
        let pipeline = NormalizePipeline::new();
        // marketplace-shaped payload forced through the search mapper
        let raw = json!({
            "asin": "B000",
            "title": "Widget",
            "description": "A widget",
            "imageUrl": "https://img.example.com/w.jpg",
            "productUrl": "https://shop.example.com/w",
            "price": 10.0
        });
        let options = NormalizeOptions {
            platform_hint: Some(PlatformSignal::Aggregator(
                crate::pipeline::detect::AggregatorKind::Search,
            )),
            ..fixed_options()
        };
        let item = pipeline.normalize(&raw, &options).unwrap();
        assert_eq!(
            item.source_platform,
            crate::domain::SourcePlatform::Aggregator
        );
    }

    #[test]
    fn invalid_candidate_surfaces_aggregated_error() {
        let pipeline = NormalizePipeline::new();
        // no image URL anywhere -> mainImageUrl maps to "" and fails
        let raw = json!({ "asin": "B000", "title": "Widget", "description": "d" });
        let err = pipeline.normalize(&raw, &fixed_options()).unwrap_err();
        match err {
            NormalizeError::Validation(e) => assert!(e.names_field("mainImageUrl")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn batch_is_fail_fast_with_no_partial_output() {
        let pipeline = NormalizePipeline::new();
        let valid = json!({
            "asin": "B09XS7JWHH",
            "title": "Sony WH-1000XM5",
            "description": "Noise canceling headphones",
            "imageUrl": "https://img.example.com/a.jpg",
            "productUrl": "https://amazon.com/dp/B09XS7JWHH",
            "price": 348.0
        });
        let invalid = json!({ "asin": "B000" });

        let result = pipeline.normalize_many(&[valid, invalid], &fixed_options());
        assert!(result.is_err());
    }
}
