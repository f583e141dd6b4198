use tracing::*;

use crate::layout::Region;

/// Drops text-class regions (Text, Title, Header) that sit inside a container
/// region: more than `threshold` of their area overlaps any region of another
/// class. Remaining regions keep their order.
pub fn filter_contained_text(regions: Vec<Region>, threshold: f32) -> Vec<Region> {
    let containers: Vec<usize> = regions
        .iter()
        .enumerate()
        .filter(|(_, region)| region.label.is_container_class())
        .map(|(idx, _)| idx)
        .collect();

    let keep: Vec<bool> = regions
        .iter()
        .map(|region| {
            if !region.label.is_text_class() {
                return true;
            }
            match containers
                .iter()
                .map(|&idx| &regions[idx])
                .find(|container| region.bbox.containment_ratio(&container.bbox) > threshold)
            {
                Some(container) => {
                    debug!(
                        "Drop {} {} inside {} {}",
                        region.label, region.id, container.label, container.id
                    );
                    false
                }
                None => true,
            }
        })
        .collect();

    regions
        .into_iter()
        .zip(keep)
        .filter_map(|(region, kept)| kept.then_some(region))
        .collect()
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::analysis::{bbox::Bbox, labels::RegionType};

    const PAGE: Vec2 = Vec2::new(1000.0, 1000.0);

    fn region(id: usize, label: RegionType, bbox: [f32; 4]) -> Region {
        Region::detection(id, label, Bbox::from(bbox), 0.9, PAGE).unwrap()
    }

    fn page() -> Vec<Region> {
        vec![
            region(0, RegionType::Table, [100.0, 100.0, 500.0, 400.0]),
            // Fully inside the table
            region(1, RegionType::Text, [120.0, 120.0, 300.0, 140.0]),
            // 20% of its area inside the table
            region(2, RegionType::Title, [460.0, 200.0, 660.0, 220.0]),
            // 5% inside the picture
            region(3, RegionType::Header, [580.0, 600.0, 780.0, 610.0]),
            region(4, RegionType::Picture, [0.0, 500.0, 590.0, 900.0]),
            // Far from everything
            region(5, RegionType::Text, [600.0, 50.0, 900.0, 70.0]),
            // Containers are never removed, even when nested
            region(6, RegionType::Caption, [150.0, 380.0, 300.0, 395.0]),
        ]
    }

    fn ids(regions: &[Region]) -> Vec<usize> {
        regions.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_filter_contained_text() {
        let kept = filter_contained_text(page(), 0.1);
        assert_eq!(ids(&kept), vec![0, 3, 4, 5, 6]);

        let lenient = filter_contained_text(page(), 0.5);
        assert_eq!(ids(&lenient), vec![0, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_raising_threshold_never_removes_more() {
        let thresholds = [0.0, 0.04, 0.05, 0.1, 0.2, 0.5, 0.99, 1.0];
        let mut previous = filter_contained_text(page(), thresholds[0]).len();
        for &threshold in &thresholds[1..] {
            let kept = filter_contained_text(page(), threshold).len();
            assert!(kept >= previous, "threshold {threshold} kept {kept} < {previous}");
            previous = kept;
        }
        // At 1.0 nothing can exceed the threshold
        assert_eq!(previous, page().len());
    }

    #[test]
    fn test_empty() {
        assert!(filter_contained_text(Vec::new(), 0.1).is_empty());
    }
}
