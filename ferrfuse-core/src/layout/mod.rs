pub mod element;
pub mod page;

pub use element::{MalformedRegion, Region, RegionId, Source, TableShape};
pub use page::Page;
