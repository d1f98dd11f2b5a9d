pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod storage;

// The operations the core exposes to collaborators
pub use domain::{
    CommerceData, ContentType, FeedItem, FeedItemDisplay, SocialMetrics, SourcePlatform,
};
pub use error::{NormalizeError, Result};
pub use pipeline::detect::{AggregatorKind, PlatformSignal};
pub use pipeline::normalize::{MapperRegistry, NormalizeOptions, NormalizePipeline, SourceMapper};
pub use pipeline::validate::{
    safe_validate_feed_item, validate_feed_item, ValidationError, ValidationOutcome,
};
