use std::fmt;

use tracing::*;

use crate::config::TableValidationConfig;
use crate::layout::{Region, Source};

/// First failed check of a table candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableRejection {
    Area { area: f32, min: f32 },
    AspectRatio { ratio: f32, min: f32, max: f32 },
    Confidence { score: f32, min: f32 },
    Size { width: f32, height: f32 },
    TextElements { found: usize, min: usize },
}

impl fmt::Display for TableRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRejection::Area { area, min } => write!(f, "area {area} below {min}"),
            TableRejection::AspectRatio { ratio, min, max } => {
                write!(f, "aspect ratio {ratio} outside [{min}, {max}]")
            }
            TableRejection::Confidence { score, min } => write!(f, "score {score} below {min}"),
            TableRejection::Size { width, height } => write!(f, "size {width}x{height} too small"),
            TableRejection::TextElements { found, min } => {
                write!(f, "{found} text elements inside, {min} required")
            }
        }
    }
}

/// Ordered acceptance checks for tables reported by vision models.
pub struct TableValidator<'a> {
    config: &'a TableValidationConfig,
}

impl<'a> TableValidator<'a> {
    pub fn new(config: &'a TableValidationConfig) -> Self {
        Self { config }
    }

    /// Runs the checks in order and reports the first failure.
    ///
    /// `native_text` is the page's native text before consolidation; a text
    /// element counts when all four of its edges lie inside the candidate.
    pub fn check(&self, candidate: &Region, native_text: &[Region]) -> Result<(), TableRejection> {
        let config = self.config;
        let bbox = &candidate.bbox;
        let (width, height) = (bbox.width(), bbox.height());

        let area = bbox.area();
        if area < config.min_area {
            return Err(TableRejection::Area {
                area,
                min: config.min_area,
            });
        }

        let ratio = width / height;
        if ratio < config.min_aspect_ratio || ratio > config.max_aspect_ratio {
            return Err(TableRejection::AspectRatio {
                ratio,
                min: config.min_aspect_ratio,
                max: config.max_aspect_ratio,
            });
        }

        if candidate.score < config.min_confidence {
            return Err(TableRejection::Confidence {
                score: candidate.score,
                min: config.min_confidence,
            });
        }

        if width < config.min_width || height < config.min_height {
            return Err(TableRejection::Size { width, height });
        }

        let found = native_text
            .iter()
            .filter(|text| bbox.contains(&text.bbox))
            .count();
        if found < config.min_text_elements {
            return Err(TableRejection::TextElements {
                found,
                min: config.min_text_elements,
            });
        }

        Ok(())
    }

    /// Keeps the vision tables that pass [`TableValidator::check`]. Tables
    /// from other sources pass through untouched.
    pub fn retain_valid(&self, tables: Vec<Region>, native_text: &[Region]) -> Vec<Region> {
        tables
            .into_iter()
            .filter(|table| {
                if table.source != Source::VisionModel {
                    return true;
                }
                match self.check(table, native_text) {
                    Ok(()) => true,
                    Err(reason) => {
                        debug!("Reject table {}: {}", table.id, reason);
                        false
                    }
                }
            })
            .collect()
    }
}
