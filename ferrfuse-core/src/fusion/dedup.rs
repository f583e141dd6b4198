use tracing::*;

use crate::analysis::{bbox::Bbox, labels::RegionType};
use crate::config::FusionConfig;
use crate::layout::Region;

/// When two regions of the same class describe the same object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuppressionRule {
    pub iou_threshold: f32,
    pub center_distance: Option<f32>,
    pub overlap_ratio: Option<f32>,
}

impl SuppressionRule {
    pub fn pictures(config: &FusionConfig) -> Self {
        let picture = &config.dedup.picture;
        Self {
            iou_threshold: picture.iou_threshold,
            center_distance: picture.center_distance,
            overlap_ratio: picture.overlap_ratio,
        }
    }

    pub fn tables(config: &FusionConfig) -> Self {
        Self {
            iou_threshold: config.table_validation.overlap_threshold,
            center_distance: config.dedup.table_center_distance,
            overlap_ratio: config.dedup.table_overlap_ratio,
        }
    }

    /// Any one test is enough.
    pub fn is_duplicate(&self, a: &Bbox, b: &Bbox) -> bool {
        a.iou(b) > self.iou_threshold
            || self
                .center_distance
                .is_some_and(|limit| a.center_distance(b) < limit)
            || self
                .overlap_ratio
                .is_some_and(|limit| a.overlap_ratio(b) > limit)
    }
}

/// Indices of `members` sorted by source precedence, then score descending,
/// then position.
fn priority_order(regions: &[Region], members: &[usize]) -> Vec<usize> {
    let mut order = members.to_vec();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (&regions[a], &regions[b]);
        ra.source
            .cmp(&rb.source)
            .then(rb.score.total_cmp(&ra.score))
            .then(a.cmp(&b))
    });
    order
}

/// Priority suppression over `members`: visiting in priority order, a member
/// is dropped when it duplicates one already accepted.
fn suppress(regions: &[Region], members: &[usize], rule: &SuppressionRule, keep: &mut [bool]) {
    let mut accepted: Vec<usize> = Vec::with_capacity(members.len());
    for idx in priority_order(regions, members) {
        let bbox = &regions[idx].bbox;
        if accepted
            .iter()
            .any(|&kept| rule.is_duplicate(bbox, &regions[kept].bbox))
        {
            keep[idx] = false;
        } else {
            accepted.push(idx);
        }
    }
}

/// Class-aware deduplication of pictures and, when enabled, tables.
///
/// Other labels pass through. Survivors keep their input order.
#[tracing::instrument(skip_all, fields(count = regions.len()))]
pub fn deduplicate(regions: Vec<Region>, config: &FusionConfig) -> Vec<Region> {
    let mut keep = vec![true; regions.len()];

    let of_label = |label: RegionType| -> Vec<usize> {
        regions
            .iter()
            .enumerate()
            .filter(|(_, region)| region.label == label)
            .map(|(idx, _)| idx)
            .collect()
    };

    let pictures = of_label(RegionType::Picture);
    suppress(&regions, &pictures, &SuppressionRule::pictures(config), &mut keep);

    if config.table_validation.remove_overlapping {
        let tables = of_label(RegionType::Table);
        suppress(&regions, &tables, &SuppressionRule::tables(config), &mut keep);
    }

    let before = regions.len();
    let survivors = retain_marked(regions, keep);
    debug!("Deduplication removed {} regions", before - survivors.len());
    survivors
}

/// Score-ordered suppression over `members`: a member is dropped when its IoU
/// with a kept, higher ranked member exceeds `iou_threshold`.
fn suppress_overlaps(
    regions: &[Region],
    members: &[usize],
    iou_threshold: f32,
    keep: &mut [bool],
) {
    let mut order = members.to_vec();
    order.sort_by(|&a, &b| regions[b].score.total_cmp(&regions[a].score).then(a.cmp(&b)));

    for (pos, &current) in order.iter().enumerate() {
        if !keep[current] {
            continue;
        }
        for &other in &order[pos + 1..] {
            if keep[other] && regions[current].bbox.iou(&regions[other].bbox) > iou_threshold {
                keep[other] = false;
            }
        }
    }
}

fn retain_marked(regions: Vec<Region>, keep: Vec<bool>) -> Vec<Region> {
    regions
        .into_iter()
        .zip(keep)
        .filter_map(|(region, kept)| kept.then_some(region))
        .collect()
}

/// Plain non-maximum suppression: by descending score, a region is dropped
/// when its IoU with an already kept region exceeds `iou_threshold`.
/// Survivors keep their input order.
pub fn nms(regions: Vec<Region>, iou_threshold: f32) -> Vec<Region> {
    if regions.len() < 2 {
        return regions;
    }

    let mut keep = vec![true; regions.len()];
    let members: Vec<usize> = (0..regions.len()).collect();
    suppress_overlaps(&regions, &members, iou_threshold, &mut keep);
    retain_marked(regions, keep)
}

/// [`nms`] run separately for each label, so boxes of different classes
/// never suppress each other. Survivors keep their input order.
pub fn nms_by_label(regions: Vec<Region>, iou_threshold: f32) -> Vec<Region> {
    let mut classes: Vec<(&RegionType, Vec<usize>)> = Vec::new();
    for (idx, region) in regions.iter().enumerate() {
        match classes.iter_mut().find(|(label, _)| **label == region.label) {
            Some((_, members)) => members.push(idx),
            None => classes.push((&region.label, vec![idx])),
        }
    }

    let mut keep = vec![true; regions.len()];
    for (_, members) in &classes {
        suppress_overlaps(&regions, members, iou_threshold, &mut keep);
    }
    retain_marked(regions, keep)
}
