use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::analysis::{bbox::Bbox, labels::RegionType};

/// Per-page region identifier.
pub type RegionId = usize;

/// Where a region came from. The derived ordering is the deduplication
/// precedence: native metadata beats structural inference beats vision models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    NativeDocument,
    StructuralAnalysis,
    VisionModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShape {
    pub rows: usize,
    pub columns: usize,
}

/// Why raw evidence could not become a [`Region`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MalformedRegion {
    NonFiniteBbox,
    Degenerate { width: f32, height: f32 },
    OutsidePage,
    NonFiniteScore,
}

impl fmt::Display for MalformedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedRegion::NonFiniteBbox => write!(f, "bbox has non-finite coordinates"),
            MalformedRegion::Degenerate { width, height } => {
                write!(f, "bbox is inverted or empty ({width}x{height})")
            }
            MalformedRegion::OutsidePage => write!(f, "bbox lies outside the page"),
            MalformedRegion::NonFiniteScore => write!(f, "score is not finite"),
        }
    }
}

/// A typed rectangle on one page, the unit every fusion stage works on.
///
/// The bbox is always well formed and inside the page: regions are only built
/// from raw evidence through [`Region::native`] and [`Region::detection`],
/// which validate it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub label: RegionType,
    pub bbox: Bbox,
    pub score: f32,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(flatten)]
    pub table: Option<TableShape>,
}

impl Region {
    /// A region from the document's own structure. Score is 1.0.
    pub fn native(
        id: RegionId,
        label: RegionType,
        bbox: Bbox,
        page_size: Vec2,
    ) -> Result<Self, MalformedRegion> {
        Ok(Self {
            id,
            label,
            bbox: fit_to_page(bbox, page_size)?,
            score: 1.0,
            source: Source::NativeDocument,
            text: None,
            font_size: None,
            table: None,
        })
    }

    /// A region reported by a vision model. The score is clamped to `[0, 1]`.
    pub fn detection(
        id: RegionId,
        label: RegionType,
        bbox: Bbox,
        score: f32,
        page_size: Vec2,
    ) -> Result<Self, MalformedRegion> {
        if !score.is_finite() {
            return Err(MalformedRegion::NonFiniteScore);
        }

        Ok(Self {
            id,
            label,
            bbox: fit_to_page(bbox, page_size)?,
            score: score.clamp(0.0, 1.0),
            source: Source::VisionModel,
            text: None,
            font_size: None,
            table: None,
        })
    }

    /// A table inferred from text alignment. `bbox` must already lie on the page.
    pub fn structural_table(id: RegionId, bbox: Bbox, shape: TableShape, score: f32) -> Self {
        Self {
            id,
            label: RegionType::Table,
            bbox,
            score,
            source: Source::StructuralAnalysis,
            text: None,
            font_size: None,
            table: Some(shape),
        }
    }

    pub fn with_text(mut self, text: Option<String>, font_size: Option<f32>) -> Self {
        self.text = text;
        self.font_size = font_size.filter(|size| size.is_finite() && *size > 0.0);
        self
    }
}

/// Validates a raw bbox and clamps it to `[0, width] × [0, height]`.
///
/// A box that still has positive area after clamping is kept; a box that
/// loses all its area was entirely outside the page.
pub fn fit_to_page(bbox: Bbox, page_size: Vec2) -> Result<Bbox, MalformedRegion> {
    if !(bbox.min.is_finite() && bbox.max.is_finite()) {
        return Err(MalformedRegion::NonFiniteBbox);
    }
    if !bbox.is_well_formed() {
        return Err(MalformedRegion::Degenerate {
            width: bbox.width(),
            height: bbox.height(),
        });
    }

    let clamped = bbox.clamp(Vec2::ZERO, page_size);
    if clamped.is_well_formed() {
        Ok(clamped)
    } else {
        Err(MalformedRegion::OutsidePage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: Vec2 = Vec2::new(600.0, 800.0);

    #[test]
    fn test_fit_to_page() {
        let inside = Bbox::from_xyxy(10.0, 10.0, 50.0, 50.0);
        assert_eq!(fit_to_page(inside, PAGE), Ok(inside));

        // Partially outside is clamped
        let spill = Bbox::from_xyxy(-20.0, 780.0, 40.0, 830.0);
        assert_eq!(
            fit_to_page(spill, PAGE),
            Ok(Bbox::from_xyxy(0.0, 780.0, 40.0, 800.0))
        );

        assert_eq!(
            fit_to_page(Bbox::from_xyxy(700.0, 10.0, 750.0, 50.0), PAGE),
            Err(MalformedRegion::OutsidePage)
        );
        assert_eq!(
            fit_to_page(Bbox::from_xyxy(0.0, f32::NAN, 10.0, 10.0), PAGE),
            Err(MalformedRegion::NonFiniteBbox)
        );
        assert!(matches!(
            fit_to_page(Bbox::from_xyxy(50.0, 10.0, 40.0, 20.0), PAGE),
            Err(MalformedRegion::Degenerate { .. })
        ));
    }

    #[test]
    fn test_detection_score_handling() {
        let bbox = Bbox::from_xyxy(0.0, 0.0, 10.0, 10.0);
        let high = Region::detection(0, RegionType::Table, bbox, 1.7, PAGE).unwrap();
        assert_eq!(high.score, 1.0);
        let low = Region::detection(1, RegionType::Table, bbox, -0.2, PAGE).unwrap();
        assert_eq!(low.score, 0.0);
        assert_eq!(
            Region::detection(2, RegionType::Table, bbox, f32::NAN, PAGE),
            Err(MalformedRegion::NonFiniteScore)
        );
    }

    #[test]
    fn test_region_serialization() {
        let region = Region::structural_table(
            4,
            Bbox::from_xyxy(10.0, 20.0, 210.0, 120.0),
            TableShape { rows: 3, columns: 4 },
            0.8,
        );
        let value = serde_json::to_value(&region).unwrap();
        assert_eq!(value["id"], 4);
        assert_eq!(value["label"], "Table");
        assert_eq!(value["source"], "structural_analysis");
        assert_eq!(value["rows"], 3);
        assert_eq!(value["columns"], 4);
        assert!(value.get("text").is_none());

        let text = Region::native(
            0,
            RegionType::Text,
            Bbox::from_xyxy(0.0, 0.0, 5.0, 5.0),
            PAGE,
        )
        .unwrap()
        .with_text(Some("hello".into()), Some(f32::NAN));
        let value = serde_json::to_value(&text).unwrap();
        assert_eq!(value["text"], "hello");
        assert!(value.get("font_size").is_none());
        assert!(value.get("rows").is_none());
    }
}
