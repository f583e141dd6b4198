//! Per-stage fusion of native evidence and vision detections.

pub mod anchor;
pub mod bands;
pub mod caption;
pub mod consolidate;
pub mod containment;
pub mod dedup;
pub mod normalize;
pub mod structure;
pub mod validate;
