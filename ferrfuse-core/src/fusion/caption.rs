use serde::{Deserialize, Serialize};
use tracing::*;

use crate::analysis::{assignment::assign_feasible, bbox::Bbox, labels::RegionType};
use crate::layout::{Region, RegionId};

/// A caption attached to the table or picture it describes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptionLink {
    pub caption: RegionId,
    pub target: RegionId,
    /// Vertical gap between the caption's bottom and the target's top
    pub distance: f32,
}

fn is_caption_target(label: &RegionType) -> bool {
    matches!(label, RegionType::Table | RegionType::Picture)
}

/// Pairs captions with tables and pictures one to one.
///
/// The cost of a pair is `|caption.y1 - target.y0|` and pairs at or beyond
/// `window` are not allowed. The assignment first maximizes the number of
/// pairs, then minimizes their total cost. Links follow caption order.
pub fn link_captions(regions: &[Region], window: f32) -> Vec<CaptionLink> {
    let captions: Vec<&Region> = regions
        .iter()
        .filter(|r| r.label == RegionType::Caption)
        .collect();
    let targets: Vec<&Region> = regions
        .iter()
        .filter(|r| is_caption_target(&r.label))
        .collect();
    if captions.is_empty() || targets.is_empty() {
        return Vec::new();
    }

    let costs: Vec<Vec<Option<f64>>> = captions
        .iter()
        .map(|caption| {
            targets
                .iter()
                .map(|target| {
                    let distance = (caption.bbox.max.y - target.bbox.min.y).abs();
                    (distance < window).then_some(distance as f64)
                })
                .collect()
        })
        .collect();

    let links: Vec<CaptionLink> = assign_feasible(&costs)
        .into_iter()
        .map(|(row, col, distance)| CaptionLink {
            caption: captions[row].id,
            target: targets[col].id,
            distance: distance as f32,
        })
        .collect();

    debug!(
        "Linked {} of {} captions to {} targets",
        links.len(),
        captions.len(),
        targets.len()
    );
    links
}

/// Relabels as Text every caption that overlaps a table with IoU above
/// `iou_threshold` while scoring lower than that table. Returns the number
/// of demoted captions.
pub fn demote_overlapping_captions(regions: &mut [Region], iou_threshold: f32) -> usize {
    let tables: Vec<(Bbox, f32)> = regions
        .iter()
        .filter(|r| r.label == RegionType::Table)
        .map(|r| (r.bbox, r.score))
        .collect();

    let mut demoted = 0;
    for region in regions.iter_mut().filter(|r| r.label == RegionType::Caption) {
        let covered = tables
            .iter()
            .any(|(bbox, score)| region.bbox.iou(bbox) > iou_threshold && region.score < *score);
        if covered {
            debug!("Demote caption {} overlapping a table", region.id);
            region.label = RegionType::Text;
            demoted += 1;
        }
    }

    demoted
}
