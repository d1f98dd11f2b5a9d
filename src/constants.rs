//! Shared constants for the normalization pipeline.

/// Maximum display title length before truncation
pub const TITLE_MAX_LEN: usize = 80;

/// Marker appended to truncated titles
pub const TITLE_ELLIPSIS: &str = "...";

/// Fallback currency when a priced source omits one
pub const DEFAULT_CURRENCY: &str = "USD";

/// Hosts whose watch URLs identify a short-video payload
pub const SHORT_VIDEO_HOSTS: &[&str] = &["tiktok.com"];

/// Hosts whose watch URLs identify a long-video payload
pub const LONG_VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

/// Substring marking a forum post URL
pub const FORUM_URL_MARKER: &str = "reddit";

/// Substring marking a micro-post URL
pub const MICRO_POST_URL_MARKER: &str = "twitter";
