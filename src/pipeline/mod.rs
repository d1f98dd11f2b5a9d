//! The normalization pipeline: platform detection, per-source mapping,
//! and the canonical schema checkpoint.

pub mod detect;
pub mod normalize;
pub mod validate;
