use std::sync::LazyLock;

use plsfix::fix_text;
use regex::Regex;
use tracing::*;

use crate::analysis::labels::{RegionType, normalize_label};
use crate::config::FusionConfig;
use crate::error::FusionError;
use crate::input::{NativeKind, PageInput};
use crate::layout::{Page, Region, RegionId};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Detections of one model that answered for the page.
#[derive(Debug, Clone)]
pub struct ModelDetections {
    pub model: String,
    pub regions: Vec<Region>,
}

/// Validated evidence of one page, split by source.
#[derive(Debug, Clone)]
pub struct NormalizedPage {
    /// Page geometry, no regions yet
    pub page: Page,
    pub native_text: Vec<Region>,
    pub native_images: Vec<Region>,
    pub detections: Vec<ModelDetections>,
    /// First id not handed out yet
    pub next_id: RegionId,
}

impl NormalizedPage {
    pub fn take_id(&mut self) -> RegionId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Cleans a native text run: optional unicode repair, control characters
/// removed, whitespace runs collapsed to one space, ends trimmed.
pub fn clean_text(raw: &str, repair: bool) -> String {
    let fixed = if repair {
        fix_text(raw, None)
    } else {
        raw.to_string()
    };
    let visible: String = fixed
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    WHITESPACE.replace_all(&visible, " ").trim().to_string()
}

/// Turns the raw evidence of one page into validated regions.
///
/// Malformed boxes and scores are dropped with a warning, boxes spilling over
/// the page edge are clamped, and a failed collaborator counts as an empty
/// source. Only invalid page dimensions make the page fail.
#[tracing::instrument(skip_all, fields(page = input.index))]
pub fn normalize_page(
    input: &PageInput,
    config: &FusionConfig,
) -> Result<NormalizedPage, FusionError> {
    let page = Page::new(input.index, input.width, input.height)?;
    let size = page.size();

    let mut normalized = NormalizedPage {
        page,
        native_text: Vec::new(),
        native_images: Vec::new(),
        detections: Vec::new(),
        next_id: 0,
    };

    if let Some(error) = &input.native_error {
        warn!("Native structure unavailable, using no native evidence: {}", error);
    } else {
        for (idx, element) in input.native.iter().enumerate() {
            match element.kind {
                NativeKind::Text => {
                    let text = element
                        .text
                        .as_deref()
                        .map(|raw| clean_text(raw, config.text_detection.clean_text))
                        .unwrap_or_default();
                    if text.is_empty() {
                        debug!("Skip blank native text element {}", idx);
                        continue;
                    }

                    match Region::native(normalized.next_id, RegionType::Text, element.bbox, size) {
                        Ok(region) => {
                            normalized.take_id();
                            normalized
                                .native_text
                                .push(region.with_text(Some(text), element.font_size));
                        }
                        Err(reason) => warn!("Drop native text element {}: {}", idx, reason),
                    }
                }
                NativeKind::Image => {
                    match Region::native(
                        normalized.next_id,
                        RegionType::Picture,
                        element.bbox,
                        size,
                    ) {
                        Ok(region) => {
                            normalized.take_id();
                            normalized.native_images.push(region);
                        }
                        Err(reason) => warn!("Drop native image element {}: {}", idx, reason),
                    }
                }
            }
        }
    }

    for set in &input.detections {
        if let Some(error) = &set.error {
            warn!("Detector `{}` failed, using no detections: {}", set.model, error);
            continue;
        }

        let mut regions = Vec::with_capacity(set.detections.len());
        for (idx, raw) in set.detections.iter().enumerate() {
            let label = normalize_label(&raw.label);
            match Region::detection(normalized.next_id, label, raw.bbox, raw.score, size) {
                Ok(region) => {
                    normalized.take_id();
                    regions.push(region);
                }
                Err(reason) => warn!(
                    "Drop detection {} `{}` of `{}`: {}",
                    idx, raw.label, set.model, reason
                ),
            }
        }
        normalized.detections.push(ModelDetections {
            model: set.model.clone(),
            regions,
        });
    }

    debug!(
        "Normalized {} native text, {} native images, {} detection sets",
        normalized.native_text.len(),
        normalized.native_images.len(),
        normalized.detections.len()
    );

    Ok(normalized)
}
