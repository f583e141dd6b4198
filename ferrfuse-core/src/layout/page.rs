use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, InvalidPageSnafu};
use crate::layout::element::{Region, RegionId};

/// Fused regions of one page, kept in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub regions: Vec<Region>,
}

impl Page {
    /// An empty page. Dimensions must be finite and positive.
    pub fn new(index: usize, width: f32, height: f32) -> Result<Self, FusionError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return InvalidPageSnafu {
                page: index,
                reason: format!("page size {width}x{height} is not positive and finite"),
            }
            .fail();
        }

        Ok(Self {
            index,
            width,
            height,
            regions: Vec::new(),
        })
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// First id not used by any region on the page.
    pub fn next_id(&self) -> RegionId {
        next_region_id(&self.regions)
    }

    /// Sorts regions top to bottom, then left to right, then by id.
    pub fn sort_reading_order(&mut self) {
        sort_reading_order(&mut self.regions);
    }
}

pub fn next_region_id(regions: &[Region]) -> RegionId {
    regions.iter().map(|r| r.id + 1).max().unwrap_or(0)
}

/// Stable reading-order sort: ascending y0, then x0, then id.
pub fn sort_reading_order(regions: &mut [Region]) {
    regions.sort_by(|a, b| {
        a.bbox
            .min
            .y
            .total_cmp(&b.bbox.min.y)
            .then(a.bbox.min.x.total_cmp(&b.bbox.min.x))
            .then(a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{bbox::Bbox, labels::RegionType};

    fn region(id: RegionId, x0: f32, y0: f32) -> Region {
        Region::native(
            id,
            RegionType::Text,
            Bbox::from_xyxy(x0, y0, x0 + 10.0, y0 + 10.0),
            Vec2::new(1000.0, 1000.0),
        )
        .unwrap()
    }

    #[test]
    fn test_page_rejects_bad_size() {
        assert!(Page::new(0, 612.0, 792.0).is_ok());
        assert!(matches!(
            Page::new(3, 0.0, 792.0),
            Err(FusionError::InvalidPage { page: 3, .. })
        ));
        assert!(Page::new(1, f32::NAN, 792.0).is_err());
        assert!(Page::new(2, 612.0, -1.0).is_err());
    }

    #[test]
    fn test_sort_reading_order() {
        let mut page = Page::new(0, 1000.0, 1000.0).unwrap();
        page.regions = vec![
            region(0, 300.0, 50.0),
            region(1, 20.0, 400.0),
            region(2, 20.0, 50.0),
            region(5, 300.0, 50.0),
            region(4, 300.0, 50.0),
        ];
        page.sort_reading_order();
        let ids: Vec<RegionId> = page.regions.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 0, 4, 5, 1]);
        assert_eq!(page.next_id(), 6);
    }
}
