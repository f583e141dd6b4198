use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::consts::*;
use crate::error::{FusionError, InvalidConfigSnafu, JsonSnafu, ReadInputSnafu};

/// Configuration for the fusion pipeline.
///
/// Every section falls back to its defaults, so a config file only needs the
/// values it changes. Call [`FusionConfig::validate`] once before running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
#[builder(default)]
pub struct FusionConfig {
    /// IoU above which a vision detection absorbs a native element when
    /// native text is not prioritized
    pub iou_threshold: f32,
    /// Max pixel distance between caption bottom and target top
    pub caption_window: f32,
    /// IoU for the plain NMS that merges detections of several models
    pub ensemble_iou_threshold: f32,
    /// Number of page workers, rayon's default when unset
    #[builder(setter(strip_option))]
    pub workers: Option<usize>,
    pub table_validation: TableValidationConfig,
    pub text_detection: TextDetectionConfig,
    pub structure: StructureConfig,
    pub dedup: DedupConfig,
    pub bands: BandConfig,
    pub caption: CaptionConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            iou_threshold: IOU_THRESHOLD,
            caption_window: CAPTION_WINDOW,
            ensemble_iou_threshold: ENSEMBLE_IOU_THRESHOLD,
            workers: None,
            table_validation: TableValidationConfig::default(),
            text_detection: TextDetectionConfig::default(),
            structure: StructureConfig::default(),
            dedup: DedupConfig::default(),
            bands: BandConfig::default(),
            caption: CaptionConfig::default(),
        }
    }
}

/// Acceptance rules for tables reported by vision models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableValidationConfig {
    pub min_area: f32,
    pub min_aspect_ratio: f32,
    pub max_aspect_ratio: f32,
    pub min_confidence: f32,
    pub min_width: f32,
    pub min_height: f32,
    /// Native text elements that must lie fully inside the candidate
    pub min_text_elements: usize,
    /// IoU above which two tables are duplicates
    pub overlap_threshold: f32,
    /// Deduplicate overlapping tables
    pub remove_overlapping: bool,
    /// Infer tables from aligned native text
    pub structure_analysis: bool,
}

impl Default for TableValidationConfig {
    fn default() -> Self {
        Self {
            min_area: TABLE_MIN_AREA,
            min_aspect_ratio: TABLE_MIN_ASPECT_RATIO,
            max_aspect_ratio: TABLE_MAX_ASPECT_RATIO,
            min_confidence: TABLE_MIN_CONFIDENCE,
            min_width: TABLE_MIN_WIDTH,
            min_height: TABLE_MIN_HEIGHT,
            min_text_elements: TABLE_MIN_TEXT_ELEMENTS,
            overlap_threshold: TABLE_OVERLAP_THRESHOLD,
            remove_overlapping: true,
            structure_analysis: true,
        }
    }
}

/// How neighbouring text blocks are grouped before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Each unused block collects its direct neighbours only
    #[default]
    Anchor,
    /// Connected components of the neighbour relation
    Transitive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDetectionConfig {
    /// Native text is authoritative; text-like vision detections are dropped
    pub prioritize_native_text: bool,
    pub merge_nearby_text: bool,
    /// Max gap in pixels on both axes for blocks to merge
    pub text_merge_threshold: f32,
    /// Margin added around each text block, 0 disables
    pub expand_text_boxes: f32,
    /// Text with a larger share of its area inside a container is dropped
    pub containment_threshold: f32,
    pub merge_strategy: MergeStrategy,
    pub title_font_size: f32,
    pub header_font_size: f32,
    pub title_max_words: usize,
    pub header_max_words: usize,
    /// Repair mojibake and broken unicode in native text
    pub clean_text: bool,
}

impl Default for TextDetectionConfig {
    fn default() -> Self {
        Self {
            prioritize_native_text: true,
            merge_nearby_text: true,
            text_merge_threshold: TEXT_MERGE_THRESHOLD,
            expand_text_boxes: EXPAND_TEXT_BOXES,
            containment_threshold: CONTAINMENT_THRESHOLD,
            merge_strategy: MergeStrategy::default(),
            title_font_size: TITLE_FONT_SIZE,
            header_font_size: HEADER_FONT_SIZE,
            title_max_words: TITLE_MAX_WORDS,
            header_max_words: HEADER_MAX_WORDS,
            clean_text: true,
        }
    }
}

/// Structural table inference from text alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    pub row_tolerance: f32,
    pub alignment_tolerance: f32,
    pub padding: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub lookahead_rows: usize,
    pub score: f32,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            row_tolerance: STRUCTURE_ROW_TOLERANCE,
            alignment_tolerance: STRUCTURE_ALIGNMENT_TOLERANCE,
            padding: STRUCTURE_PADDING,
            min_width: STRUCTURE_MIN_WIDTH,
            min_height: STRUCTURE_MIN_HEIGHT,
            lookahead_rows: STRUCTURE_LOOKAHEAD_ROWS,
            score: STRUCTURE_SCORE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PictureDedupConfig {
    pub iou_threshold: f32,
    pub center_distance: Option<f32>,
    pub overlap_ratio: Option<f32>,
}

impl Default for PictureDedupConfig {
    fn default() -> Self {
        Self {
            iou_threshold: PICTURE_IOU_THRESHOLD,
            center_distance: Some(PICTURE_CENTER_DISTANCE),
            overlap_ratio: Some(PICTURE_OVERLAP_RATIO),
        }
    }
}

/// Duplicate rules per class. The table IoU lives in
/// [`TableValidationConfig::overlap_threshold`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub picture: PictureDedupConfig,
    pub table_center_distance: Option<f32>,
    pub table_overlap_ratio: Option<f32>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            picture: PictureDedupConfig::default(),
            table_center_distance: None,
            table_overlap_ratio: Some(TABLE_OVERLAP_RATIO),
        }
    }
}

/// Split between page headers and page footers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandCutoff {
    /// Fraction of the mean page height of the band members
    PageFraction(f32),
    /// Fixed y coordinate in pixels
    Absolute(f32),
}

impl Default for BandCutoff {
    fn default() -> Self {
        BandCutoff::PageFraction(BAND_PAGE_FRACTION)
    }
}

/// Repeated header/footer detection across pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub enabled: bool,
    /// Mean TF-IDF cosine similarity a cluster must exceed
    pub sim_threshold: f32,
    /// Clustering radius over text y-midpoints, in pixels
    pub var_threshold: f32,
    pub min_samples: usize,
    pub cutoff: BandCutoff,
    /// Only text in the top or bottom fraction of a page is a candidate
    pub margin_fraction: Option<f32>,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sim_threshold: BAND_SIM_THRESHOLD,
            var_threshold: BAND_VAR_THRESHOLD,
            min_samples: BAND_MIN_SAMPLES,
            cutoff: BandCutoff::default(),
            margin_fraction: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Emit caption to table/picture links
    pub link: bool,
    /// Relabel captions that sit on a higher scoring table as text
    pub demote_overlapping: bool,
    pub demote_iou: f32,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            link: true,
            demote_overlapping: true,
            demote_iou: CAPTION_DEMOTE_IOU,
        }
    }
}

fn unit(field: &str, value: f32) -> Result<(), FusionError> {
    if !(0.0..=1.0).contains(&value) {
        return InvalidConfigSnafu {
            field,
            reason: format!("{value} is not in [0, 1]"),
        }
        .fail();
    }
    Ok(())
}

fn pixels(field: &str, value: f32) -> Result<(), FusionError> {
    if !(value.is_finite() && value >= 0.0) {
        return InvalidConfigSnafu {
            field,
            reason: format!("{value} is not a finite non-negative number"),
        }
        .fail();
    }
    Ok(())
}

fn fraction(field: &str, value: f32) -> Result<(), FusionError> {
    if !(value > 0.0 && value <= 1.0) {
        return InvalidConfigSnafu {
            field,
            reason: format!("{value} is not in (0, 1]"),
        }
        .fail();
    }
    Ok(())
}

fn at_least_one(field: &str, value: usize) -> Result<(), FusionError> {
    if value == 0 {
        return InvalidConfigSnafu {
            field,
            reason: "must be at least 1",
        }
        .fail();
    }
    Ok(())
}

impl FusionConfig {
    /// Loads a JSON config file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FusionError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).context(ReadInputSnafu {
            path: path.display().to_string(),
        })?;
        let config: Self = serde_json::from_str(&raw).context(JsonSnafu { stage: "config" })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every threshold once. Ratios and probabilities must be in
    /// `[0, 1]`, pixel quantities finite and non-negative.
    pub fn validate(&self) -> Result<(), FusionError> {
        unit("iou_threshold", self.iou_threshold)?;
        pixels("caption_window", self.caption_window)?;
        unit("ensemble_iou_threshold", self.ensemble_iou_threshold)?;
        if let Some(workers) = self.workers {
            at_least_one("workers", workers)?;
        }

        let table = &self.table_validation;
        pixels("table_validation.min_area", table.min_area)?;
        pixels("table_validation.min_aspect_ratio", table.min_aspect_ratio)?;
        pixels("table_validation.max_aspect_ratio", table.max_aspect_ratio)?;
        if table.min_aspect_ratio > table.max_aspect_ratio {
            return InvalidConfigSnafu {
                field: "table_validation.min_aspect_ratio",
                reason: format!(
                    "{} exceeds max_aspect_ratio {}",
                    table.min_aspect_ratio, table.max_aspect_ratio
                ),
            }
            .fail();
        }
        unit("table_validation.min_confidence", table.min_confidence)?;
        pixels("table_validation.min_width", table.min_width)?;
        pixels("table_validation.min_height", table.min_height)?;
        unit("table_validation.overlap_threshold", table.overlap_threshold)?;

        let text = &self.text_detection;
        pixels("text_detection.text_merge_threshold", text.text_merge_threshold)?;
        pixels("text_detection.expand_text_boxes", text.expand_text_boxes)?;
        unit("text_detection.containment_threshold", text.containment_threshold)?;
        pixels("text_detection.title_font_size", text.title_font_size)?;
        pixels("text_detection.header_font_size", text.header_font_size)?;

        let structure = &self.structure;
        pixels("structure.row_tolerance", structure.row_tolerance)?;
        pixels("structure.alignment_tolerance", structure.alignment_tolerance)?;
        pixels("structure.padding", structure.padding)?;
        pixels("structure.min_width", structure.min_width)?;
        pixels("structure.min_height", structure.min_height)?;
        at_least_one("structure.lookahead_rows", structure.lookahead_rows)?;
        unit("structure.score", structure.score)?;

        let dedup = &self.dedup;
        unit("dedup.picture.iou_threshold", dedup.picture.iou_threshold)?;
        if let Some(distance) = dedup.picture.center_distance {
            pixels("dedup.picture.center_distance", distance)?;
        }
        if let Some(ratio) = dedup.picture.overlap_ratio {
            unit("dedup.picture.overlap_ratio", ratio)?;
        }
        if let Some(distance) = dedup.table_center_distance {
            pixels("dedup.table_center_distance", distance)?;
        }
        if let Some(ratio) = dedup.table_overlap_ratio {
            unit("dedup.table_overlap_ratio", ratio)?;
        }

        let bands = &self.bands;
        unit("bands.sim_threshold", bands.sim_threshold)?;
        pixels("bands.var_threshold", bands.var_threshold)?;
        at_least_one("bands.min_samples", bands.min_samples)?;
        match bands.cutoff {
            BandCutoff::PageFraction(f) => fraction("bands.cutoff.page_fraction", f)?,
            BandCutoff::Absolute(px) => pixels("bands.cutoff.absolute", px)?,
        }
        if let Some(margin) = bands.margin_fraction {
            fraction("bands.margin_fraction", margin)?;
        }

        unit("caption.demote_iou", self.caption.demote_iou)?;

        Ok(())
    }
}
