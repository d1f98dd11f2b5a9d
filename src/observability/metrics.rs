//! Metrics for the normalization pipeline.
//!
//! Emission only: counters and histograms go through the `metrics` facade
//! and show up wherever the embedding process installed a recorder.

/// Enum representing all metric names used in the system.
/// This eliminates magic strings and provides compile-time safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Detector metrics
    DetectHintUsed,
    DetectResolved,

    // Normalize metrics
    NormalizeRecordsProcessed,
    NormalizeValidationFailed,
    NormalizeBatchesProcessed,
    NormalizeBatchSize,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::DetectHintUsed => "trendfeed_detect_hint_used_total",
            MetricName::DetectResolved => "trendfeed_detect_resolved_total",
            MetricName::NormalizeRecordsProcessed => "trendfeed_normalize_records_processed_total",
            MetricName::NormalizeValidationFailed => "trendfeed_normalize_validation_failed_total",
            MetricName::NormalizeBatchesProcessed => "trendfeed_normalize_batches_processed_total",
            MetricName::NormalizeBatchSize => "trendfeed_normalize_batch_size",
        }
    }
}

pub mod detect {
    use super::MetricName;

    /// Record that an explicit platform hint bypassed shape inspection
    pub fn hint_used() {
        ::metrics::counter!(MetricName::DetectHintUsed.as_str()).increment(1);
    }

    /// Record which signal shape inspection resolved to
    pub fn detected(signal: &str) {
        ::metrics::counter!(MetricName::DetectResolved.as_str(), "signal" => signal.to_string())
            .increment(1);
    }
}

pub mod normalize {
    use super::MetricName;

    /// Record that a payload was normalized into a valid canonical record
    pub fn record_normalized(platform: &str) {
        ::metrics::counter!(
            MetricName::NormalizeRecordsProcessed.as_str(),
            "platform" => platform.to_string()
        )
        .increment(1);
    }

    /// Record a candidate rejected by the schema checkpoint
    pub fn validation_failed(signal: &str) {
        ::metrics::counter!(
            MetricName::NormalizeValidationFailed.as_str(),
            "signal" => signal.to_string()
        )
        .increment(1);
    }

    /// Record a completed batch and its size
    pub fn batch_processed(size: usize) {
        ::metrics::counter!(MetricName::NormalizeBatchesProcessed.as_str()).increment(1);
        ::metrics::histogram!(MetricName::NormalizeBatchSize.as_str()).record(size as f64);
    }
}
