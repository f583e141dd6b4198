//! Default thresholds. Every value here is only the default for a field of
//! [`FusionConfig`](crate::config::FusionConfig); stages always read the config.

/// IoU above which a vision detection absorbs a native element when native
/// text is not prioritized.
pub const IOU_THRESHOLD: f32 = 0.3;

/// Maximum vertical distance in pixels between a caption's bottom edge and a
/// target's top edge for the pair to be linkable.
pub const CAPTION_WINDOW: f32 = 100.0;

/// IoU above which plain NMS suppresses the lower scoring detection when
/// several models report on one page.
pub const ENSEMBLE_IOU_THRESHOLD: f32 = 0.3;

/// Minimum area in square pixels of a detected table.
///
/// Small detections labelled as tables are usually a single line of aligned
/// text or a legend box rather than tabular content.
pub const TABLE_MIN_AREA: f32 = 75_000.0;

/// Accepted range of table aspect ratios (width / height).
pub const TABLE_MIN_ASPECT_RATIO: f32 = 0.5;
pub const TABLE_MAX_ASPECT_RATIO: f32 = 3.5;

/// Minimum detector confidence for a table candidate.
pub const TABLE_MIN_CONFIDENCE: f32 = 0.85;

pub const TABLE_MIN_WIDTH: f32 = 200.0;
pub const TABLE_MIN_HEIGHT: f32 = 100.0;

/// Minimum number of native text elements fully inside a table candidate.
pub const TABLE_MIN_TEXT_ELEMENTS: usize = 6;

/// IoU above which two tables are considered the same table.
pub const TABLE_OVERLAP_THRESHOLD: f32 = 0.3;

/// Maximum gap in pixels on both axes for two text blocks to be merged.
pub const TEXT_MERGE_THRESHOLD: f32 = 5.0;

/// Margin in pixels added around every consolidated text block.
pub const EXPAND_TEXT_BOXES: f32 = 3.0;

/// A text region with more than this fraction of its area inside a
/// container region (table, picture, ...) is dropped.
pub const CONTAINMENT_THRESHOLD: f32 = 0.1;

/// Font size thresholds for the title/header classifier.
pub const TITLE_FONT_SIZE: f32 = 20.0;
pub const HEADER_FONT_SIZE: f32 = 14.0;

/// Word count limits for the title/header classifier.
pub const TITLE_MAX_WORDS: usize = 10;
pub const HEADER_MAX_WORDS: usize = 15;

/// Vertical tolerance in pixels for two text elements to share a row.
pub const STRUCTURE_ROW_TOLERANCE: f32 = 10.0;

/// Horizontal tolerance in pixels for a column start to count as aligned.
pub const STRUCTURE_ALIGNMENT_TOLERANCE: f32 = 20.0;

/// Padding in pixels around a structurally inferred table.
pub const STRUCTURE_PADDING: f32 = 10.0;

pub const STRUCTURE_MIN_WIDTH: f32 = 100.0;
pub const STRUCTURE_MIN_HEIGHT: f32 = 50.0;

/// Number of rows after a qualifying row scanned for aligned columns.
pub const STRUCTURE_LOOKAHEAD_ROWS: usize = 10;

/// Confidence assigned to structurally inferred tables.
pub const STRUCTURE_SCORE: f32 = 0.8;

/// Picture deduplication thresholds.
pub const PICTURE_IOU_THRESHOLD: f32 = 0.2;
pub const PICTURE_CENTER_DISTANCE: f32 = 75.0;
pub const PICTURE_OVERLAP_RATIO: f32 = 0.3;

/// Overlap ratio (intersection over the smaller area) above which two tables
/// are duplicates.
pub const TABLE_OVERLAP_RATIO: f32 = 0.3;

/// Mean TF-IDF cosine similarity a cluster must exceed to be a header/footer band.
pub const BAND_SIM_THRESHOLD: f32 = 0.8;

/// DBSCAN neighbourhood radius in pixels over text y-midpoints.
pub const BAND_VAR_THRESHOLD: f32 = 20.0;

/// DBSCAN core point size, the point itself included.
pub const BAND_MIN_SAMPLES: usize = 2;

/// Fraction of the page height separating headers from footers.
pub const BAND_PAGE_FRACTION: f32 = 0.5;

/// IoU above which a lower scoring caption overlapping a table becomes text.
pub const CAPTION_DEMOTE_IOU: f32 = 0.3;
