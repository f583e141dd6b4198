use tracing::*;

use crate::analysis::{bbox::Bbox, labels::RegionType};
use crate::config::TextDetectionConfig;
use crate::fusion::consolidate::classify_text;
use crate::layout::Region;

/// Detection-anchored fusion, used when native text is not authoritative.
///
/// Each detection absorbs every native element whose IoU with it exceeds
/// `iou_threshold`: its bbox grows to the union and it takes the absorbed
/// texts, joined top to bottom, left to right. The detection keeps its label
/// and score. Native elements no detection absorbed follow the detections,
/// with text labelled by [`classify_text`].
pub fn merge_into_detections(
    detections: Vec<Region>,
    native: &[Region],
    iou_threshold: f32,
    config: &TextDetectionConfig,
) -> Vec<Region> {
    let mut absorbed = vec![false; native.len()];
    let mut merged = Vec::with_capacity(detections.len() + native.len());

    for mut detection in detections {
        let mut members: Vec<usize> = native
            .iter()
            .enumerate()
            .filter(|(_, element)| detection.bbox.iou(&element.bbox) > iou_threshold)
            .map(|(idx, _)| idx)
            .collect();
        if members.is_empty() {
            merged.push(detection);
            continue;
        }

        members.sort_by(|&a, &b| {
            let (a, b) = (&native[a].bbox, &native[b].bbox);
            a.min.y.total_cmp(&b.min.y).then(a.min.x.total_cmp(&b.min.x))
        });

        detection.bbox = members
            .iter()
            .fold(detection.bbox, |acc: Bbox, &idx| acc.union(&native[idx].bbox));
        let texts: Vec<&str> = members
            .iter()
            .filter_map(|&idx| native[idx].text.as_deref())
            .collect();
        if !texts.is_empty() {
            detection.text = Some(texts.join(" "));
        }

        members.iter().for_each(|&idx| absorbed[idx] = true);
        merged.push(detection);
    }

    let leftover = absorbed.iter().filter(|taken| !**taken).count();
    for (element, _) in native.iter().zip(&absorbed).filter(|(_, taken)| !**taken) {
        let mut region = element.clone();
        if region.label == RegionType::Text {
            let text = region.text.as_deref().unwrap_or_default();
            region.label = classify_text(text, region.font_size, config);
        }
        merged.push(region);
    }

    debug!(
        "Detections absorbed {} native elements, {} left on their own",
        native.len() - leftover,
        leftover
    );
    merged
}
