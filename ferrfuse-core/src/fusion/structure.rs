//! Table inference from the geometry of native text runs: rows of evenly
//! spaced cells followed by rows whose columns line up with them.

use glam::Vec2;
use tracing::*;

use crate::analysis::bbox::Bbox;
use crate::config::StructureConfig;
use crate::layout::{Region, RegionId, TableShape};

/// Groups text into rows of at least two members, top to bottom.
///
/// A run joins the current row while its top edge is within `tolerance` of
/// the top edge of the row's first run. Members are sorted left to right.
pub fn group_rows<'a>(text: &'a [Region], tolerance: f32) -> Vec<Vec<&'a Region>> {
    let mut sorted: Vec<&Region> = text.iter().collect();
    sorted.sort_by(|a, b| a.bbox.min.y.total_cmp(&b.bbox.min.y));

    let mut rows = Vec::new();
    let mut current: Vec<&Region> = Vec::new();
    let mut row_y = 0.0f32;

    let mut flush = |row: &mut Vec<&'a Region>| {
        if row.len() > 1 {
            row.sort_by(|a, b| a.bbox.min.x.total_cmp(&b.bbox.min.x));
            rows.push(std::mem::take(row));
        } else {
            row.clear();
        }
    };

    for region in sorted {
        if current.is_empty() {
            row_y = region.bbox.min.y;
        } else if (region.bbox.min.y - row_y).abs() > tolerance {
            flush(&mut current);
            row_y = region.bbox.min.y;
        }
        current.push(region);
    }
    flush(&mut current);

    rows
}

/// A row looks tabular when it has at least three cells and at least 60% of
/// the gaps between neighbouring cells are within half the mean gap of it.
pub fn is_table_row(row: &[&Region]) -> bool {
    if row.len() < 3 {
        return false;
    }

    let gaps: Vec<f32> = row
        .windows(2)
        .map(|pair| pair[1].bbox.min.x - pair[0].bbox.max.x)
        .collect();
    let mean = gaps.iter().sum::<f32>() / gaps.len() as f32;
    let consistent = gaps
        .iter()
        .filter(|&&gap| (gap - mean).abs() <= mean * 0.5)
        .count();

    consistent as f32 >= gaps.len() as f32 * 0.6
}

/// A candidate row continues a table when it has at least two cells and at
/// least half of its cells (relative to the shorter row) start within
/// `tolerance` of some reference cell start.
pub fn is_aligned(reference: &[&Region], candidate: &[&Region], tolerance: f32) -> bool {
    if candidate.len() < 2 {
        return false;
    }

    let aligned = candidate
        .iter()
        .filter(|cell| {
            reference
                .iter()
                .any(|anchor| (cell.bbox.min.x - anchor.bbox.min.x).abs() <= tolerance)
        })
        .count();

    aligned as f32 >= reference.len().min(candidate.len()) as f32 * 0.5
}

/// Finds tables in native text. Output tables get ids starting at `first_id`.
#[tracing::instrument(skip_all, fields(count = text.len()))]
pub fn detect_tables(
    text: &[Region],
    page_size: Vec2,
    config: &StructureConfig,
    first_id: RegionId,
) -> Vec<Region> {
    let rows = group_rows(text, config.row_tolerance);
    let mut consumed = vec![false; rows.len()];
    let mut tables = Vec::new();

    for start in 0..rows.len() {
        if consumed[start] || !is_table_row(&rows[start]) {
            continue;
        }

        let reference = &rows[start];
        let mut end = start + 1;
        let last = (start + config.lookahead_rows).min(rows.len() - 1);
        while end <= last && is_aligned(reference, &rows[end], config.alignment_tolerance) {
            end += 1;
        }

        let run = &rows[start..end];
        if run.len() < 2 {
            continue;
        }

        let boxes: Vec<Bbox> = run.iter().flatten().map(|region| region.bbox).collect();
        let Some(bbox) = union_all(&boxes).map(|b| b.expand(config.padding)) else {
            continue;
        };

        if bbox.width() < config.min_width || bbox.height() < config.min_height {
            debug!(
                "Reject structural table at row {}: {}x{} too small",
                start,
                bbox.width(),
                bbox.height()
            );
            continue;
        }
        if !bbox.within_page(page_size.x, page_size.y) {
            debug!("Reject structural table at row {}: outside the page", start);
            continue;
        }

        let shape = TableShape {
            rows: run.len(),
            columns: run.iter().map(Vec::len).max().unwrap_or(0),
        };
        consumed[start..end].iter_mut().for_each(|row| *row = true);
        tables.push(Region::structural_table(
            first_id + tables.len(),
            bbox,
            shape,
            config.score,
        ));
    }

    debug!("Structural analysis found {} tables in {} rows", tables.len(), rows.len());
    tables
}

/// Union of every box in the slice.
pub fn union_all(boxes: &[Bbox]) -> Option<Bbox> {
    boxes.iter().copied().reduce(|acc, bbox| acc.union(&bbox))
}
