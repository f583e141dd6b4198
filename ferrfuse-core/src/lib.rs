pub mod analysis;
pub mod config;
pub mod consts;
pub mod error;
pub mod fusion;
pub mod input;
pub mod layout;
pub mod pipeline;

// Re-export commonly used types
pub use config::{FusionConfig, FusionConfigBuilder};
pub use error::FusionError;
pub use input::{DetectionSet, DocumentInput, NativeElement, PageInput, RawDetection};
pub use layout::{Page, Region, RegionId, Source, TableShape};
pub use pipeline::{FusedDocument, FusedPage, SkippedPage, fuse_document};
