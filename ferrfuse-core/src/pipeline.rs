//! Document-level driver: fuses every page on a worker pool, then runs the
//! cross-page band detection and caption linking on the results.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use tracing::*;

use crate::analysis::labels::RegionType;
use crate::config::FusionConfig;
use crate::error::{FusionError, NoPagesProcessedSnafu, ThreadPoolSnafu};
use crate::fusion::{
    anchor::merge_into_detections,
    bands::{Band, PageText, detect_bands},
    caption::{CaptionLink, demote_overlapping_captions, link_captions},
    consolidate::consolidate_text,
    containment::filter_contained_text,
    dedup::{deduplicate, nms_by_label},
    normalize::normalize_page,
    structure::detect_tables,
    validate::TableValidator,
};
use crate::input::{DocumentInput, PageInput};
use crate::layout::{Page, Region, Source};

/// Fused layout of one page.
///
/// Running headers and footers found across pages are added as
/// `Page-Header`/`Page-Footer` regions next to the text blocks they repeat,
/// so their text appears twice: once as a text block, once in the band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedPage {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub regions: Vec<Region>,
    pub links: Vec<CaptionLink>,
}

/// A page that could not be fused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPage {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusedDocument {
    pub pages: Vec<FusedPage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedPage>,
}

impl FusedDocument {
    pub fn region_count(&self) -> usize {
        self.pages.iter().map(|page| page.regions.len()).sum()
    }
}

/// A fused page together with the native text the band detector needs.
struct PageOutcome {
    page: Page,
    native_text: Vec<Region>,
}

/// Runs every per-page stage, in order, on one page.
#[tracing::instrument(skip_all, fields(page = input.index))]
fn fuse_page(input: &PageInput, config: &FusionConfig) -> Result<PageOutcome, FusionError> {
    let start = Instant::now();
    let mut normalized = normalize_page(input, config)?;
    let size = normalized.page.size();

    let text_config = &config.text_detection;
    let sets = std::mem::take(&mut normalized.detections);
    let ensemble = sets.len() >= 2;
    let mut detections: Vec<Region> = sets.into_iter().flat_map(|set| set.regions).collect();

    if text_config.prioritize_native_text {
        let before = detections.len();
        detections.retain(|region| !region.label.is_native_text_role());
        if detections.len() < before {
            debug!(
                "Discard {} text detections, native text is authoritative",
                before - detections.len()
            );
        }
    }

    if ensemble {
        let before = detections.len();
        detections = nms_by_label(detections, config.ensemble_iou_threshold);
        debug!("Ensemble NMS kept {} of {} detections", detections.len(), before);
    }

    let regions = if text_config.prioritize_native_text {
        let mut regions = consolidate_text(&normalized.native_text, size, text_config);
        regions.extend(normalized.native_images.iter().cloned());
        regions.extend(detections);
        regions
    } else {
        let native: Vec<Region> = normalized
            .native_text
            .iter()
            .chain(&normalized.native_images)
            .cloned()
            .collect();
        merge_into_detections(detections, &native, config.iou_threshold, text_config)
    };

    let table_config = &config.table_validation;
    let (mut tables, mut regions): (Vec<Region>, Vec<Region>) = regions
        .into_iter()
        .partition(|region| region.label == RegionType::Table);
    if table_config.structure_analysis {
        tables.extend(detect_tables(
            &normalized.native_text,
            size,
            &config.structure,
            normalized.next_id,
        ));
    }
    regions.extend(TableValidator::new(table_config).retain_valid(tables, &normalized.native_text));

    let mut regions = deduplicate(regions, config);
    if config.caption.demote_overlapping {
        demote_overlapping_captions(&mut regions, config.caption.demote_iou);
    }
    let regions = filter_contained_text(regions, text_config.containment_threshold);

    let mut page = normalized.page;
    page.regions = regions;
    page.sort_reading_order();

    debug!(
        "Page {} fused into {} regions in {:?}",
        page.index,
        page.regions.len(),
        start.elapsed()
    );
    Ok(PageOutcome {
        page,
        native_text: normalized.native_text,
    })
}

fn fuse_pages(pages: &[PageInput], config: &FusionConfig) -> Vec<Result<PageOutcome, FusionError>> {
    pages.par_iter().map(|page| fuse_page(page, config)).collect()
}

/// Adds every band member to the page it was found on.
fn inject_bands(outcomes: &mut [PageOutcome], bands: Vec<Band>) {
    for band in bands {
        for member in band.members {
            let page = &mut outcomes[member.page].page;
            let id = page.next_id();
            page.regions.push(Region {
                id,
                label: band.label.clone(),
                bbox: member.bbox,
                score: 1.0,
                source: Source::NativeDocument,
                text: member.text,
                font_size: None,
                table: None,
            });
        }
    }

    outcomes
        .iter_mut()
        .for_each(|outcome| outcome.page.sort_reading_order());
}

/// Fuses a whole document.
///
/// Pages are independent until the band detector, which needs the native text
/// of every page. A page with invalid dimensions is skipped and reported in
/// [`FusedDocument::skipped`]; the run fails only when no page succeeds.
#[tracing::instrument(skip_all, fields(pages = input.pages.len()))]
pub fn fuse_document(
    input: &DocumentInput,
    config: &FusionConfig,
) -> Result<FusedDocument, FusionError> {
    config.validate()?;

    if input.pages.is_empty() {
        info!("Empty document, nothing to fuse");
        return Ok(FusedDocument::default());
    }

    let start = Instant::now();
    let results = match config.workers {
        Some(workers) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .context(ThreadPoolSnafu)?;
            pool.install(|| fuse_pages(&input.pages, config))
        }
        None => fuse_pages(&input.pages, config),
    };

    let mut outcomes = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (page, result) in input.pages.iter().zip(results) {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                error!("Failed to fuse page {}: {}", page.index, e);
                skipped.push(SkippedPage {
                    index: page.index,
                    reason: e.to_string(),
                });
            }
        }
    }

    ensure!(
        !outcomes.is_empty(),
        NoPagesProcessedSnafu {
            total: input.pages.len()
        }
    );

    // Members refer to pages by their position in `outcomes`
    let bands = {
        let texts: Vec<PageText> = outcomes
            .iter()
            .enumerate()
            .map(|(position, outcome)| PageText {
                page: position,
                height: outcome.page.height,
                text: &outcome.native_text,
            })
            .collect();
        detect_bands(&texts, &config.bands)
    };
    let band_count = bands.len();
    inject_bands(&mut outcomes, bands);

    let pages: Vec<FusedPage> = outcomes
        .into_iter()
        .map(|PageOutcome { page, .. }| {
            let links = if config.caption.link {
                link_captions(&page.regions, config.caption_window)
            } else {
                Vec::new()
            };
            FusedPage {
                index: page.index,
                width: page.width,
                height: page.height,
                regions: page.regions,
                links,
            }
        })
        .collect();

    let document = FusedDocument { pages, skipped };
    info!(
        "Fused {} pages ({} skipped) into {} regions with {} bands in {:?}",
        document.pages.len(),
        document.skipped.len(),
        document.region_count(),
        band_count,
        start.elapsed()
    );
    Ok(document)
}
